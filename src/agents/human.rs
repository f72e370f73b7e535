use super::Policy;
use crate::game::{Direction, Snake, World};

/// Policy fed by the keyboard
///
/// Holds the last key pressed since the previous tick. A request to reverse
/// is dropped, like the snake's own direction setter.
#[derive(Debug, Default)]
pub struct HumanPilot {
    pending: Option<Direction>,
}

impl HumanPilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a direction for the next tick, replacing any earlier request
    pub fn steer(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }
}

impl Policy for HumanPilot {
    fn choose_direction(&mut self, snake: &Snake, _world: &World, _rivals: &[&Snake]) -> Direction {
        let current = snake.direction();
        match self.pending.take() {
            Some(direction) if !current.is_opposite(direction) => direction,
            _ => current,
        }
    }

    fn on_reset(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Position};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn world() -> World {
        World::new(&GameConfig::small(), SmallRng::seed_from_u64(0))
    }

    #[test]
    fn test_keeps_heading_without_input() {
        let world = world();
        let snake = Snake::new(Position::new(3, 3), Direction::Right);
        let mut pilot = HumanPilot::new();
        assert_eq!(pilot.choose_direction(&snake, &world, &[]), Direction::Right);
    }

    #[test]
    fn test_applies_pending_turn_once() {
        let world = world();
        let snake = Snake::new(Position::new(3, 3), Direction::Right);
        let mut pilot = HumanPilot::new();

        pilot.steer(Direction::Up);
        assert_eq!(pilot.choose_direction(&snake, &world, &[]), Direction::Up);
        assert_eq!(pilot.pending(), None);
    }

    #[test]
    fn test_ignores_reversal() {
        let world = world();
        let snake = Snake::new(Position::new(3, 3), Direction::Right);
        let mut pilot = HumanPilot::new();

        pilot.steer(Direction::Left);
        assert_eq!(pilot.choose_direction(&snake, &world, &[]), Direction::Right);
    }

    #[test]
    fn test_reset_drops_pending_input() {
        let mut pilot = HumanPilot::new();
        pilot.steer(Direction::Down);
        pilot.on_reset();
        assert_eq!(pilot.pending(), None);
    }
}
