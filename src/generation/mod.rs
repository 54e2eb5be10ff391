//! # Generation Module
//!
//! Procedural content generation for dungeon levels, open-world chunks, and the
//! monsters and items that populate them.
//!
//! Generators are deterministic for a given [`GenerationConfig`] and random
//! number generator, so a seed fully reproduces a world.

pub mod dungeon;
pub mod encounters;
pub mod items;
pub mod overworld;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;
pub use overworld::*;

use crate::{config, BurrowError, BurrowResult, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the grid size, room bounds and retry budget of the dungeon
/// generator as well as obstacle density in the open world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Grid width in tiles
    pub width: i32,
    /// Grid height in tiles
    pub height: i32,
    /// Room placement attempts per level
    pub max_rooms: u32,
    /// Smallest room edge, border included
    pub room_min_size: i32,
    /// Largest room edge, border included
    pub room_max_size: i32,
    /// Whole-level attempts before generation gives up
    pub max_generation_attempts: u32,
    /// Whether room floors get scattered decorative glyphs
    pub decorate_floor: bool,
    /// Noise value above which open-world cells grow trees (-1.0 to 1.0)
    pub obstacle_threshold: f64,
    /// Frequency of the open-world noise field
    pub noise_scale: f64,
}

impl GenerationConfig {
    /// Creates the default dungeon configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.seed, 12345);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::MAP_WIDTH,
            height: config::MAP_HEIGHT,
            max_rooms: config::MAX_ROOMS,
            room_min_size: config::ROOM_MIN_SIZE,
            room_max_size: config::ROOM_MAX_SIZE,
            max_generation_attempts: 10,
            decorate_floor: true,
            obstacle_threshold: 0.35,
            noise_scale: 0.11,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 40,
            height: 30,
            max_rooms: 12,
            room_min_size: 4,
            room_max_size: 8,
            max_generation_attempts: 10,
            decorate_floor: false,
            obstacle_threshold: 0.35,
            noise_scale: 0.11,
        }
    }

    /// Creates a configuration for open-world chunks.
    pub fn overworld(seed: u64) -> Self {
        Self {
            obstacle_threshold: 0.3,
            noise_scale: 0.08,
            ..Self::new(seed)
        }
    }

    /// Rejects bounds that can never produce a level on this grid.
    pub fn validate(&self) -> BurrowResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(BurrowError::InvalidConfig(format!(
                "Grid {}x{} is too small",
                self.width, self.height
            )));
        }
        if self.room_min_size < 3 {
            return Err(BurrowError::InvalidConfig(format!(
                "Minimum room size {} leaves no interior",
                self.room_min_size
            )));
        }
        if self.room_min_size > self.room_max_size {
            return Err(BurrowError::InvalidConfig(format!(
                "Minimum room size {} exceeds maximum {}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size + 2 > self.width || self.room_max_size + 2 > self.height {
            return Err(BurrowError::InvalidConfig(format!(
                "Rooms up to {} do not fit a {}x{} grid",
                self.room_max_size, self.width, self.height
            )));
        }
        if self.max_rooms == 0 || self.max_generation_attempts == 0 {
            return Err(BurrowError::InvalidConfig(
                "Room and attempt budgets must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Which family of spawn tables applies to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Biome {
    Dungeon,
    Overworld,
}

/// Axis-aligned rectangle of a room, border included.
///
/// `x2`/`y2` are `x1 + width`/`y1 + height`; the carved interior is the open
/// range between the two corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from its top-left corner and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Position, Room};
    ///
    /// let room = Room::new(5, 5, 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains(Position::new(7, 7)));
    /// assert!(!room.contains(Position::new(5, 5)));
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Inclusive-bound overlap test; rooms that share an edge intersect.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Whether `pos` lies in the carved interior.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x > self.x1 && pos.x < self.x2 && pos.y > self.y1 && pos.y < self.y2
    }

    /// Every interior cell, row by row.
    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        ((self.y1 + 1)..self.y2)
            .flat_map(move |y| ((self.x1 + 1)..self.x2).map(move |x| Position::new(x, y)))
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, allowing for a consistent
/// interface across dungeon levels and open-world chunks.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BurrowResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> BurrowResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}
