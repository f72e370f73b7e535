//! Control policies for worms
//!
//! Every policy answers the same question once per tick: which way should the
//! worm head next? Movement, collisions and growth live once in
//! [`Snake`](crate::game::Snake); a [`Controller`] only picks the direction.

pub mod human;
pub mod scripted;

pub use human::HumanPilot;
pub use scripted::ScriptedPilot;

use crate::game::{Direction, Snake, StepOutcome, World};
use crate::rl::QLearningPilot;

/// A way of choosing a worm's next direction
pub trait Policy {
    /// Pick the heading for the coming move
    ///
    /// `rivals` holds every other worm of the roster, dead or alive.
    fn choose_direction(&mut self, snake: &Snake, world: &World, rivals: &[&Snake]) -> Direction;

    /// Called after the move with its outcome
    fn observe(&mut self, _snake: &Snake, _world: &World, _rivals: &[&Snake], _outcome: StepOutcome) {
    }

    /// Called when the worm starts a new life
    fn on_reset(&mut self) {}
}

/// The policy attached to a worm
pub enum Controller {
    Human(HumanPilot),
    Scripted(ScriptedPilot),
    Learning(Box<QLearningPilot>),
}

impl Controller {
    pub fn name(&self) -> &'static str {
        match self {
            Controller::Human(_) => "human",
            Controller::Scripted(_) => "scripted",
            Controller::Learning(_) => "q-learning",
        }
    }

    pub fn as_human_mut(&mut self) -> Option<&mut HumanPilot> {
        match self {
            Controller::Human(pilot) => Some(pilot),
            _ => None,
        }
    }

    pub fn as_learning(&self) -> Option<&QLearningPilot> {
        match self {
            Controller::Learning(pilot) => Some(&**pilot),
            _ => None,
        }
    }

    pub fn as_learning_mut(&mut self) -> Option<&mut QLearningPilot> {
        match self {
            Controller::Learning(pilot) => Some(&mut **pilot),
            _ => None,
        }
    }

    fn policy_mut(&mut self) -> &mut dyn Policy {
        match self {
            Controller::Human(pilot) => pilot,
            Controller::Scripted(pilot) => pilot,
            Controller::Learning(pilot) => &mut **pilot,
        }
    }
}

impl Policy for Controller {
    fn choose_direction(&mut self, snake: &Snake, world: &World, rivals: &[&Snake]) -> Direction {
        self.policy_mut().choose_direction(snake, world, rivals)
    }

    fn observe(&mut self, snake: &Snake, world: &World, rivals: &[&Snake], outcome: StepOutcome) {
        self.policy_mut().observe(snake, world, rivals, outcome);
    }

    fn on_reset(&mut self) {
        self.policy_mut().on_reset();
    }
}
