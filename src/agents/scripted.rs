use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

use super::Policy;
use crate::game::{Direction, Snake, World};

/// Chance of leaving a safe straight line when no pellet pulls the worm
pub const DEFAULT_WANDER_PROBABILITY: f64 = 0.2;

/// Greedy pellet chaser with collision avoidance
///
/// Looks one cell ahead: never reverses, never steps into a wall or a body if
/// another move exists, and otherwise heads for the nearest pellet, trying the
/// horizontal axis first.
pub struct ScriptedPilot {
    rng: SmallRng,
    wander_probability: f64,
}

impl ScriptedPilot {
    pub fn new(rng: SmallRng) -> Self {
        Self::with_wander_probability(rng, DEFAULT_WANDER_PROBABILITY)
    }

    pub fn with_wander_probability(rng: SmallRng, wander_probability: f64) -> Self {
        Self {
            rng,
            wander_probability: wander_probability.clamp(0.0, 1.0),
        }
    }

    pub fn wander_probability(&self) -> f64 {
        self.wander_probability
    }

    /// Moves that neither reverse nor hit anything on the next cell
    pub fn safe_moves(snake: &Snake, world: &World, rivals: &[&Snake]) -> Vec<Direction> {
        let head = snake.head();
        let reverse = snake.direction().opposite();
        Direction::ALL
            .into_iter()
            .filter(|&direction| direction != reverse)
            .filter(|&direction| {
                snake
                    .collision_at(head.moved_in_direction(direction), world, rivals)
                    .is_none()
            })
            .collect()
    }
}

impl Policy for ScriptedPilot {
    fn choose_direction(&mut self, snake: &Snake, world: &World, rivals: &[&Snake]) -> Direction {
        let current = snake.direction();
        let safe = Self::safe_moves(snake, world, rivals);
        if safe.is_empty() {
            return current;
        }

        let head = snake.head();
        if let Some(target) = world.nearest_pellet(head, None) {
            let horizontal = match target.position.x.cmp(&head.x) {
                Ordering::Greater => Some(Direction::Right),
                Ordering::Less => Some(Direction::Left),
                Ordering::Equal => None,
            };
            let vertical = match target.position.y.cmp(&head.y) {
                Ordering::Greater => Some(Direction::Down),
                Ordering::Less => Some(Direction::Up),
                Ordering::Equal => None,
            };

            if let Some(preferred) = [horizontal, vertical]
                .into_iter()
                .flatten()
                .find(|direction| safe.contains(direction))
            {
                return preferred;
            }
        }

        if !safe.contains(&current) {
            return *safe.choose(&mut self.rng).unwrap_or(&current);
        }

        if safe.len() > 1 && self.rng.gen_bool(self.wander_probability) {
            let others: Vec<Direction> = safe.into_iter().filter(|&d| d != current).collect();
            return *others.choose(&mut self.rng).unwrap_or(&current);
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Position};
    use rand::SeedableRng;

    fn empty_world() -> World {
        let mut config = GameConfig::new(10, 10);
        config.initial_pellet_count = 0;
        World::new(&config, SmallRng::seed_from_u64(11))
    }

    fn pilot(wander: f64) -> ScriptedPilot {
        ScriptedPilot::with_wander_probability(SmallRng::seed_from_u64(5), wander)
    }

    #[test]
    fn test_safe_moves_exclude_reverse_and_walls() {
        let world = empty_world();
        let snake = Snake::new(Position::new(0, 0), Direction::Down);
        let safe = ScriptedPilot::safe_moves(&snake, &world, &[]);
        assert_eq!(safe, vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn test_prefers_horizontal_move_toward_pellet() {
        let mut world = empty_world();
        world.place_pellet(Position::new(8, 2), 0);
        let snake = Snake::new(Position::new(4, 5), Direction::Up);

        assert_eq!(
            pilot(0.0).choose_direction(&snake, &world, &[]),
            Direction::Right
        );
    }

    #[test]
    fn test_falls_back_to_vertical_when_horizontal_blocked() {
        let mut world = empty_world();
        world.place_pellet(Position::new(8, 8), 0);
        let snake = Snake::new(Position::new(4, 5), Direction::Down);
        let blocker = Snake::new(Position::new(5, 5), Direction::Up);

        assert_eq!(
            pilot(0.0).choose_direction(&snake, &world, &[&blocker]),
            Direction::Down
        );
    }

    #[test]
    fn test_keeps_heading_without_safe_moves() {
        let world = empty_world();
        // Corner, facing the wall, with its own body below
        let snake = Snake::from_cells(
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(1, 0),
            ],
            Direction::Up,
        );
        assert!(ScriptedPilot::safe_moves(&snake, &world, &[]).is_empty());
        assert_eq!(pilot(1.0).choose_direction(&snake, &world, &[]), Direction::Up);
    }

    #[test]
    fn test_goes_straight_without_pellets() {
        let world = empty_world();
        let snake = Snake::new(Position::new(4, 4), Direction::Right);
        let mut pilot = pilot(0.0);
        for _ in 0..10 {
            assert_eq!(pilot.choose_direction(&snake, &world, &[]), Direction::Right);
        }
    }

    #[test]
    fn test_always_wanders_at_full_probability() {
        let world = empty_world();
        let snake = Snake::new(Position::new(4, 4), Direction::Right);
        let mut pilot = pilot(1.0);
        for _ in 0..10 {
            let direction = pilot.choose_direction(&snake, &world, &[]);
            assert!(direction == Direction::Up || direction == Direction::Down);
        }
    }

    #[test]
    fn test_turns_away_when_straight_is_blocked() {
        let world = empty_world();
        let snake = Snake::new(Position::new(9, 4), Direction::Right);
        let direction = pilot(0.0).choose_direction(&snake, &world, &[]);
        assert!(direction == Direction::Up || direction == Direction::Down);
    }

    #[test]
    fn test_ignores_dead_rivals() {
        let mut world = empty_world();
        world.place_pellet(Position::new(8, 4), 0);
        let mut rival = Snake::new(Position::new(5, 4), Direction::Up);
        rival.die(&mut world);
        let snake = Snake::new(Position::new(4, 4), Direction::Right);

        assert_eq!(
            pilot(0.0).choose_direction(&snake, &world, &[&rival]),
            Direction::Right
        );
    }
}
