use rand::Rng;
use tracing::debug;

use super::action::Direction;
use super::error::GameError;
use super::state::{CollisionType, Position};
use super::world::World;
use crate::agents::{Controller, Policy};

/// RGB color a worm is drawn with
pub type Color = (u8, u8, u8);

/// What happened to a worm during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The worm was already dead and did not move
    Idle,
    /// The worm moved one cell
    Moved {
        /// Score gained from pellets on the new head cell
        score_gained: u32,
    },
    /// The worm died trying to move
    Died(CollisionType),
}

/// The body of a worm and everything the movement rules need
///
/// `cells[0]` is the head. While alive, `cells` never holds the same cell
/// twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    cells: Vec<Position>,
    direction: Direction,
    growth_pending: u32,
    score: u32,
    alive: bool,
    /// Pellets eaten during the current life
    appetite: u32,
    color: Color,
}

impl Snake {
    /// Single-cell worm at `head`
    pub fn new(head: Position, direction: Direction) -> Self {
        Self::from_cells(vec![head], direction)
    }

    /// Worm with an explicit body, head first
    pub fn from_cells(cells: Vec<Position>, direction: Direction) -> Self {
        Self {
            cells,
            direction,
            growth_pending: 0,
            score: 0,
            alive: true,
            appetite: 0,
            color: (255, 255, 255),
        }
    }

    /// Start a new life on `start`, heading east
    pub fn reset(&mut self, start: Position, color: Color) {
        self.cells = vec![start];
        self.direction = Direction::Right;
        self.growth_pending = 0;
        self.score = 0;
        self.alive = true;
        self.appetite = 0;
        self.color = color;
    }

    pub fn head(&self) -> Position {
        self.cells[0]
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn appetite(&self) -> u32 {
        self.appetite
    }

    pub fn growth_pending(&self) -> u32 {
        self.growth_pending
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Check if the worm covers `pos`, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// Set the heading without any checks
    ///
    /// Reversals are allowed here; running back into the neck is caught by
    /// the body collision check.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// What moving onto `pos` would hit, if anything
    ///
    /// Checked in order wall, own body, other living worm; the first match
    /// wins.
    pub fn collision_at(
        &self,
        pos: Position,
        world: &World,
        rivals: &[&Snake],
    ) -> Option<CollisionType> {
        if !world.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        if rivals
            .iter()
            .any(|rival| rival.is_alive() && rival.occupies(pos))
        {
            return Some(CollisionType::Rival);
        }

        None
    }

    /// Move one cell in the current direction
    ///
    /// Dies on collision. Otherwise the new head eats whatever lies there and
    /// the tail is kept while growth is pending.
    pub fn advance(&mut self, world: &mut World, rivals: &[&Snake]) -> StepOutcome {
        if !self.alive {
            return StepOutcome::Idle;
        }

        let new_head = self.head().moved_in_direction(self.direction);

        if let Some(collision) = self.collision_at(new_head, world, rivals) {
            self.die(world);
            debug!(
                ?collision,
                length = self.len(),
                appetite = self.appetite,
                score = self.score,
                "worm died"
            );
            return StepOutcome::Died(collision);
        }

        self.cells.insert(0, new_head);

        let (score_gained, growth) = world.eat_pellets_at(new_head, &self.cells);
        if score_gained > 0 {
            self.score += score_gained;
            self.growth_pending += growth;
            self.appetite += 1;
        }

        if self.growth_pending > 0 {
            self.growth_pending -= 1;
        } else {
            self.cells.pop();
        }

        StepOutcome::Moved { score_gained }
    }

    /// Terminal transition: mark dead and leave pellets along the body
    pub fn die(&mut self, world: &mut World) {
        if !self.alive {
            return;
        }
        self.alive = false;
        world.spawn_pellets_from_death(&self.cells, self.appetite);
    }
}

/// A worm: body plus the policy steering it
pub struct Worm {
    snake: Snake,
    controller: Controller,
}

impl Worm {
    /// New worm placed on (0, 0); call `reset` before the first tick
    pub fn new(controller: Controller) -> Self {
        Self {
            snake: Snake::new(Position::new(0, 0), Direction::Right),
            controller,
        }
    }

    pub fn with_snake(snake: Snake, controller: Controller) -> Self {
        Self { snake, controller }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Start a new life on a random free cell away from `occupied`
    pub fn reset(&mut self, world: &mut World, occupied: &[Position]) -> Result<(), GameError> {
        let start = world.random_free_cell(occupied)?;
        let rng = world.rng();
        let color = (
            rng.gen_range(50..=200),
            rng.gen_range(50..=200),
            rng.gen_range(50..=200),
        );
        self.snake.reset(start, color);
        self.controller.on_reset();
        Ok(())
    }

    /// One tick: let the policy pick a heading, then move
    pub fn step(&mut self, world: &mut World, rivals: &[&Snake]) -> StepOutcome {
        if !self.snake.is_alive() {
            return StepOutcome::Idle;
        }

        let direction = self.controller.choose_direction(&self.snake, world, rivals);
        self.snake.set_direction(direction);
        let outcome = self.snake.advance(world, rivals);
        self.controller
            .observe(&self.snake, world, rivals, outcome);
        outcome
    }
}
