use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::GameConfig;
use super::error::GameError;
use super::state::{Pellet, PelletKind, Position};

/// Random draws attempted before falling back to a full scan of free cells
const MAX_RANDOM_ATTEMPTS: usize = 1024;

/// The arena: grid bounds plus the pellet economy
///
/// The world is the sole owner of pellet storage. Worms only reach it through
/// `eat_pellets_at` and `spawn_pellets_from_death`, which keep the
/// one-pellet-per-cell invariant.
pub struct World {
    columns: usize,
    rows: usize,
    initial_pellet_count: usize,
    pellet_types: Vec<PelletKind>,
    /// Pellets in spawn order
    pellets: Vec<Pellet>,
    /// Cells holding a pellet, mirrors `pellets`
    occupied: HashSet<Position>,
    rng: SmallRng,
}

impl World {
    pub fn new(config: &GameConfig, rng: SmallRng) -> Self {
        Self {
            columns: config.columns,
            rows: config.rows,
            initial_pellet_count: config.initial_pellet_count,
            pellet_types: config.pellet_types.clone(),
            pellets: Vec::with_capacity(config.initial_pellet_count),
            occupied: HashSet::with_capacity(config.initial_pellet_count),
            rng,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn pellets(&self) -> &[Pellet] {
        &self.pellets
    }

    pub fn pellet_types(&self) -> &[PelletKind] {
        &self.pellet_types
    }

    pub fn pellet_kind(&self, pellet: &Pellet) -> PelletKind {
        self.pellet_types[pellet.type_index]
    }

    pub fn has_pellet_at(&self, position: Position) -> bool {
        self.occupied.contains(&position)
    }

    /// Shared random stream for spawn positions and worm colors
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.columns as i32 && pos.y >= 0 && pos.y < self.rows as i32
    }

    /// Uniformly random cell of the grid
    pub fn random_cell(&mut self) -> Position {
        let x = self.rng.gen_range(0..self.columns) as i32;
        let y = self.rng.gen_range(0..self.rows) as i32;
        Position::new(x, y)
    }

    /// Nearest pellet to `from` by Manhattan distance
    ///
    /// Ties go to the pellet spawned first. With `radius`, pellets farther
    /// than that distance are ignored.
    pub fn nearest_pellet(&self, from: Position, radius: Option<u32>) -> Option<&Pellet> {
        let mut best: Option<(&Pellet, u32)> = None;
        for pellet in &self.pellets {
            let distance = from.manhattan(pellet.position);
            if radius.is_some_and(|r| distance > r) {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((pellet, distance));
            }
        }
        best.map(|(pellet, _)| pellet)
    }

    /// Remove every pellet from the grid
    pub fn clear_pellets(&mut self) {
        self.pellets.clear();
        self.occupied.clear();
    }

    /// Clear the field and spawn the configured number of pellets
    pub fn reset(&mut self, forbidden_cells: &[Position]) -> Result<(), GameError> {
        self.clear_pellets();
        for _ in 0..self.initial_pellet_count {
            self.spawn_pellet(forbidden_cells)?;
        }
        Ok(())
    }

    /// Place one pellet of a random kind on a random free cell
    pub fn spawn_pellet(&mut self, forbidden_cells: &[Position]) -> Result<Position, GameError> {
        let position = self.random_free_cell(forbidden_cells)?;
        let type_index = self.rng.gen_range(0..self.pellet_types.len());
        self.insert(Pellet::new(position, type_index));
        Ok(position)
    }

    /// Put a pellet of the given kind on a specific cell
    ///
    /// Returns false when the cell is outside the grid, already holds a
    /// pellet, or the kind is unknown.
    pub fn place_pellet(&mut self, position: Position, type_index: usize) -> bool {
        if !self.is_in_bounds(position)
            || self.has_pellet_at(position)
            || type_index >= self.pellet_types.len()
        {
            return false;
        }
        self.insert(Pellet::new(position, type_index));
        true
    }

    /// Eat every pellet on `position`, replacing each one elsewhere
    ///
    /// Returns the summed `(score, growth)` of what was eaten, `(0, 0)` when
    /// the cell was empty. Replacements avoid `snake_cells`.
    pub fn eat_pellets_at(&mut self, position: Position, snake_cells: &[Position]) -> (u32, u32) {
        if !self.occupied.contains(&position) {
            return (0, 0);
        }

        let mut score = 0;
        let mut growth = 0;
        let mut eaten = 0;
        let pellet_types = &self.pellet_types;
        self.pellets.retain(|pellet| {
            if pellet.position != position {
                return true;
            }
            let kind = pellet_types[pellet.type_index];
            score += kind.score;
            growth += kind.growth;
            eaten += 1;
            false
        });
        self.occupied.remove(&position);

        for _ in 0..eaten {
            if let Err(err) = self.spawn_pellet(snake_cells) {
                warn!(%err, "could not replace eaten pellet");
                break;
            }
        }

        (score, growth)
    }

    /// Scatter pellets along a dead worm's body
    ///
    /// One pellet every `max(1, len / (appetite + 1))` cells, skipping cells
    /// that already hold one. Returns how many pellets were added.
    pub fn spawn_pellets_from_death(&mut self, dead_cells: &[Position], appetite: u32) -> usize {
        if dead_cells.is_empty() {
            return 0;
        }

        let stride = (dead_cells.len() / (appetite as usize + 1)).max(1);
        let mut spawned = 0;
        for &cell in dead_cells.iter().step_by(stride) {
            if self.has_pellet_at(cell) {
                continue;
            }
            let type_index = self.rng.gen_range(0..self.pellet_types.len());
            self.insert(Pellet::new(cell, type_index));
            spawned += 1;
        }

        debug!(
            cells = dead_cells.len(),
            appetite, stride, spawned, "scattered death pellets"
        );
        spawned
    }

    fn insert(&mut self, pellet: Pellet) {
        self.occupied.insert(pellet.position);
        self.pellets.push(pellet);
    }

    /// Random cell holding neither a pellet nor one of `forbidden_cells`
    pub fn random_free_cell(&mut self, forbidden_cells: &[Position]) -> Result<Position, GameError> {
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let cell = self.random_cell();
            if !forbidden_cells.contains(&cell) && !self.occupied.contains(&cell) {
                return Ok(cell);
            }
        }

        // Crowded grid: pick uniformly among the cells that are actually free
        let forbidden: HashSet<Position> = forbidden_cells.iter().copied().collect();
        let free: Vec<Position> = (0..self.rows as i32)
            .flat_map(|y| (0..self.columns as i32).map(move |x| Position::new(x, y)))
            .filter(|cell| !forbidden.contains(cell) && !self.occupied.contains(cell))
            .collect();

        free.choose(&mut self.rng)
            .copied()
            .ok_or(GameError::WorldFull {
                columns: self.columns,
                rows: self.rows,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn world(columns: usize, rows: usize, pellets: usize) -> World {
        let mut config = GameConfig::new(columns, rows);
        config.initial_pellet_count = pellets;
        World::new(&config, SmallRng::seed_from_u64(7))
    }

    fn assert_unique(world: &World) {
        let cells: HashSet<Position> = world.pellets().iter().map(|p| p.position).collect();
        assert_eq!(cells.len(), world.pellets().len());
    }

    #[test]
    fn test_reset_spawns_configured_count() {
        let mut world = world(10, 10, 30);
        let forbidden = vec![Position::new(0, 0), Position::new(1, 0)];
        world.reset(&forbidden).unwrap();

        assert_eq!(world.pellets().len(), 30);
        assert_unique(&world);
        for pellet in world.pellets() {
            assert!(world.is_in_bounds(pellet.position));
            assert!(!forbidden.contains(&pellet.position));
            assert!(pellet.type_index < world.pellet_types().len());
        }
    }

    #[test]
    fn test_reset_clears_previous_pellets() {
        let mut world = world(10, 10, 5);
        world.reset(&[]).unwrap();
        world.place_pellet(Position::new(9, 9), 0);
        world.reset(&[]).unwrap();
        assert_eq!(world.pellets().len(), 5);
    }

    #[test]
    fn test_clear_pellets_frees_every_cell() {
        let mut world = world(3, 3, 8);
        world.reset(&[Position::new(0, 0)]).unwrap();
        assert!(world.random_free_cell(&[Position::new(0, 0)]).is_err());

        world.clear_pellets();
        assert!(world.pellets().is_empty());
        assert!(!world.has_pellet_at(Position::new(2, 2)));
        assert!(world.random_free_cell(&[Position::new(0, 0)]).is_ok());
    }

    #[test]
    fn test_crowded_grid_fills_every_free_cell() {
        let mut world = world(3, 3, 0);
        let forbidden = vec![Position::new(1, 1)];
        for _ in 0..8 {
            world.spawn_pellet(&forbidden).unwrap();
        }
        assert_unique(&world);
        assert!(!world.has_pellet_at(Position::new(1, 1)));

        assert_eq!(
            world.spawn_pellet(&forbidden),
            Err(GameError::WorldFull {
                columns: 3,
                rows: 3
            })
        );
    }

    #[test]
    fn test_eat_conserves_pellet_count() {
        let mut world = world(12, 12, 10);
        world.reset(&[]).unwrap();
        let target = world.pellets()[3];
        let kind = world.pellet_kind(&target);
        let snake = vec![target.position, Position::new(0, 0)];

        let (score, growth) = world.eat_pellets_at(target.position, &snake);

        assert_eq!((score, growth), (kind.score, kind.growth));
        assert_eq!(world.pellets().len(), 10);
        assert_unique(&world);
        for pellet in world.pellets() {
            assert!(!snake.contains(&pellet.position));
        }
    }

    #[test]
    fn test_eat_on_empty_cell_is_noop() {
        let mut world = world(10, 10, 0);
        world.place_pellet(Position::new(2, 2), 1);

        assert_eq!(world.eat_pellets_at(Position::new(3, 3), &[]), (0, 0));
        assert_eq!(world.pellets(), &[Pellet::new(Position::new(2, 2), 1)]);
    }

    #[test]
    fn test_place_pellet_rejects_taken_cells() {
        let mut world = world(5, 5, 0);
        assert!(world.place_pellet(Position::new(1, 1), 0));
        assert!(!world.place_pellet(Position::new(1, 1), 2));
        assert!(!world.place_pellet(Position::new(5, 1), 0));
        assert!(!world.place_pellet(Position::new(2, 2), 3));
        assert_eq!(world.pellets().len(), 1);
    }

    #[test]
    fn test_death_pellets_follow_appetite_stride() {
        let mut world = world(20, 20, 0);
        let body: Vec<Position> = (0..10).map(|x| Position::new(x, 4)).collect();

        // 10 cells, appetite 1 -> stride 5 -> cells 0 and 5
        assert_eq!(world.spawn_pellets_from_death(&body, 1), 2);
        assert!(world.has_pellet_at(Position::new(0, 4)));
        assert!(world.has_pellet_at(Position::new(5, 4)));

        // appetite 9 -> stride 1, two cells already taken
        assert_eq!(world.spawn_pellets_from_death(&body, 9), 8);
        assert_eq!(world.pellets().len(), 10);
        assert_unique(&world);
    }

    #[test]
    fn test_death_pellets_without_appetite() {
        let mut world = world(20, 20, 0);
        let body: Vec<Position> = (0..4).map(|y| Position::new(3, y)).collect();
        assert_eq!(world.spawn_pellets_from_death(&body, 0), 1);
        assert!(world.has_pellet_at(Position::new(3, 0)));
        assert_eq!(world.spawn_pellets_from_death(&[], 3), 0);
    }

    #[test]
    fn test_nearest_pellet_with_radius_and_ties() {
        let mut world = world(20, 20, 0);
        world.place_pellet(Position::new(8, 5), 0);
        world.place_pellet(Position::new(5, 8), 1);
        world.place_pellet(Position::new(15, 15), 2);
        let head = Position::new(5, 5);

        // both first pellets are 3 away, the earlier one wins
        let nearest = world.nearest_pellet(head, None).unwrap();
        assert_eq!(nearest.position, Position::new(8, 5));

        assert!(world.nearest_pellet(head, Some(2)).is_none());
        assert!(world.nearest_pellet(head, Some(3)).is_some());
    }
}
