use std::time::{Duration, Instant};

use crate::game::Snake;

/// Records kept by the play HUD across games
///
/// The clock measures how long the lead has survived; it stops when the lead
/// dies and starts over with the next game.
pub struct GameMetrics {
    started: Instant,
    /// Survival time of a finished game, while waiting for a restart
    stopped_at: Option<Duration>,
    high_score: u32,
    longest_worm: usize,
    games_finished: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stopped_at: None,
            high_score: 0,
            longest_worm: 0,
            games_finished: 0,
        }
    }

    pub fn on_game_start(&mut self) {
        self.started = Instant::now();
        self.stopped_at = None;
    }

    /// Stop the clock and fold the lead's final body into the records
    pub fn on_lead_death(&mut self, lead: &Snake) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.started.elapsed());
        }
        self.games_finished += 1;
        self.high_score = self.high_score.max(lead.score());
        self.longest_worm = self.longest_worm.max(lead.len());
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped_at.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn longest_worm(&self) -> usize {
        self.longest_worm
    }

    pub fn games_finished(&self) -> u32 {
        self.games_finished
    }

    pub fn format_time(&self) -> String {
        format_clock(self.elapsed())
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// `mm:ss`, minutes uncapped
fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
