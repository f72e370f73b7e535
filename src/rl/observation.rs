use std::cmp::Ordering;

use crate::game::{CollisionType, Direction, Snake, World};

/// What lies on the cell next to the head in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Danger {
    Clear = 0,
    Wall = 1,
    OwnBody = 2,
    Rival = 3,
}

impl Danger {
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Danger::Clear),
            1 => Some(Danger::Wall),
            2 => Some(Danger::OwnBody),
            3 => Some(Danger::Rival),
            _ => None,
        }
    }
}

impl From<Option<CollisionType>> for Danger {
    fn from(collision: Option<CollisionType>) -> Self {
        match collision {
            None => Danger::Clear,
            Some(CollisionType::Wall) => Danger::Wall,
            Some(CollisionType::SelfCollision) => Danger::OwnBody,
            Some(CollisionType::Rival) => Danger::Rival,
        }
    }
}

/// Compact perception used as the Q-table key
///
/// Sign of the offset to the nearest visible pellet on each axis, plus one
/// danger code per direction in canonical order (up, down, right, left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscreteState {
    codes: [i8; 6],
}

impl DiscreteState {
    pub fn new(food_dx: i8, food_dy: i8, dangers: [Danger; 4]) -> Self {
        Self {
            codes: [
                food_dx.signum(),
                food_dy.signum(),
                dangers[0].code(),
                dangers[1].code(),
                dangers[2].code(),
                dangers[3].code(),
            ],
        }
    }

    /// Rebuild a state from its six codes, rejecting out-of-range values
    pub fn from_codes(codes: [i8; 6]) -> Option<Self> {
        if !(-1..=1).contains(&codes[0]) || !(-1..=1).contains(&codes[1]) {
            return None;
        }
        let mut dangers = [Danger::Clear; 4];
        for (danger, &code) in dangers.iter_mut().zip(&codes[2..]) {
            *danger = Danger::from_code(code)?;
        }
        Some(Self::new(codes[0], codes[1], dangers))
    }

    pub fn codes(&self) -> [i8; 6] {
        self.codes
    }

    pub fn food_direction(&self) -> (i8, i8) {
        (self.codes[0], self.codes[1])
    }

    pub fn danger(&self, direction: Direction) -> Danger {
        // codes are validated on construction
        Danger::from_code(self.codes[2 + direction.index()]).unwrap_or(Danger::Clear)
    }
}

fn sign(ordering: Ordering) -> i8 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Reduce the worm's surroundings to a `DiscreteState`
///
/// Pellets farther than `vision_radius` (Manhattan) are invisible; with none
/// visible the food direction is (0, 0).
pub fn discretize(snake: &Snake, world: &World, rivals: &[&Snake], vision_radius: u32) -> DiscreteState {
    let head = snake.head();

    let (food_dx, food_dy) = world
        .nearest_pellet(head, Some(vision_radius))
        .map(|pellet| {
            (
                sign(pellet.position.x.cmp(&head.x)),
                sign(pellet.position.y.cmp(&head.y)),
            )
        })
        .unwrap_or((0, 0));

    let dangers = Direction::ALL.map(|direction| {
        Danger::from(snake.collision_at(head.moved_in_direction(direction), world, rivals))
    });

    DiscreteState::new(food_dx, food_dy, dangers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Position};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn empty_world() -> World {
        let mut config = GameConfig::new(10, 10);
        config.initial_pellet_count = 0;
        World::new(&config, SmallRng::seed_from_u64(4))
    }

    #[test]
    fn test_open_field_without_food() {
        let world = empty_world();
        let snake = Snake::new(Position::new(5, 5), Direction::Right);
        let state = discretize(&snake, &world, &[], 15);
        assert_eq!(state.codes(), [0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_food_direction_signs() {
        let mut world = empty_world();
        world.place_pellet(Position::new(2, 8), 0);
        let snake = Snake::new(Position::new(5, 5), Direction::Right);
        let state = discretize(&snake, &world, &[], 15);
        assert_eq!(state.food_direction(), (-1, 1));
    }

    #[test]
    fn test_food_outside_radius_is_invisible() {
        let mut world = empty_world();
        world.place_pellet(Position::new(9, 9), 0);
        let snake = Snake::new(Position::new(0, 0), Direction::Right);
        assert_eq!(discretize(&snake, &world, &[], 17).food_direction(), (0, 0));
        assert_eq!(discretize(&snake, &world, &[], 18).food_direction(), (1, 1));
    }

    #[test]
    fn test_danger_codes() {
        let world = empty_world();
        // head in the top-left corner, body going down
        let snake = Snake::from_cells(
            vec![Position::new(0, 0), Position::new(0, 1)],
            Direction::Up,
        );
        let rival = Snake::new(Position::new(1, 0), Direction::Down);
        let state = discretize(&snake, &world, &[&rival], 15);

        assert_eq!(state.danger(Direction::Up), Danger::Wall);
        assert_eq!(state.danger(Direction::Down), Danger::OwnBody);
        assert_eq!(state.danger(Direction::Right), Danger::Rival);
        assert_eq!(state.danger(Direction::Left), Danger::Wall);
        assert_eq!(state.codes(), [0, 0, 1, 2, 3, 1]);
    }

    #[test]
    fn test_from_codes_rejects_garbage() {
        assert!(DiscreteState::from_codes([0, 1, 0, 0, 0, 0]).is_some());
        assert!(DiscreteState::from_codes([2, 0, 0, 0, 0, 0]).is_none());
        assert!(DiscreteState::from_codes([0, 0, 0, 4, 0, 0]).is_none());
    }
}
