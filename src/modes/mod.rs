pub mod play;
pub mod train;

pub use play::PlayMode;
pub use train::{EpisodeSummary, TrainConfig, TrainMode};
