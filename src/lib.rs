//! # Burrow
//!
//! Simulation core for a turn-based, grid-based exploration game.
//!
//! ## Architecture Overview
//!
//! The crate owns the rules and nothing else. Rendering, key polling, menus and
//! save-file encoding are external collaborators that talk to the core through a
//! narrow surface:
//!
//! - **Game State**: a single [`GameState`] context holds the active region, the
//!   player's inventory, the message log and the visibility map. Every mutation
//!   flows through it, one tick at a time.
//! - **Entity Model**: entities compose optional capabilities (fighter, item,
//!   equipment, AI) instead of forming a type hierarchy. Cross references are
//!   [`EntityId`]s resolved through the owning [`EntityTable`].
//! - **Generation**: rooms-and-tunnels dungeons and noise-scattered open-world
//!   chunks, both populated from weighted spawn tables.
//! - **Input**: commands arrive as [`PlayerCommand`] values; targeting prompts are
//!   answered by an [`InputSource`] implementation.
//!
//! All state is plain serde data, so any save format can round-trip it.

pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Burrow simulation.
#[derive(thiserror::Error, Debug)]
pub enum BurrowError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A generation attempt could not place any room
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Generation bounds can never fit the requested grid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The inventory has no free slot
    #[error("Inventory full: {0}")]
    InventoryFull(String),

    /// A targeting prompt produced an unusable target
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Persisted state is missing or corrupt
    #[error("Load failure: {0}")]
    LoadFailure(String),
}

/// Result type used throughout the Burrow codebase.
pub type BurrowResult<T> = Result<T, BurrowError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const MAP_WIDTH: i32 = 80;

    /// Default map height in tiles
    pub const MAP_HEIGHT: i32 = 43;

    /// Smallest room edge, border included
    pub const ROOM_MIN_SIZE: i32 = 6;

    /// Largest room edge, border included
    pub const ROOM_MAX_SIZE: i32 = 10;

    /// Room placement attempts per level
    pub const MAX_ROOMS: u32 = 30;

    /// Default sight radius of the player
    pub const TORCH_RADIUS: i32 = 10;

    /// Messages kept in the log before the oldest is dropped
    pub const MESSAGE_LOG_CAPACITY: usize = 100;

    /// Hit points restored by a healing potion
    pub const HEAL_AMOUNT: i32 = 40;

    /// Damage dealt by a lightning bolt
    pub const LIGHTNING_DAMAGE: i32 = 40;

    /// Reach of a lightning bolt
    pub const LIGHTNING_RANGE: f64 = 5.0;

    /// Reach of a confusion scroll
    pub const CONFUSE_RANGE: f64 = 8.0;

    /// Turns a confused monster stumbles around
    pub const CONFUSE_NUM_TURNS: u32 = 10;

    /// Blast radius of a fireball
    pub const FIREBALL_RADIUS: f64 = 3.0;

    /// Damage dealt by a fireball
    pub const FIREBALL_DAMAGE: i32 = 25;

    /// Experience needed for the first level up
    pub const LEVEL_UP_BASE: i32 = 200;

    /// Extra experience needed per level
    pub const LEVEL_UP_FACTOR: i32 = 150;

    /// Distance under which skittish creatures bolt
    pub const SKITTISH_RANGE: f64 = 5.0;

    /// Slots in a fresh player's pack
    pub const PLAYER_INVENTORY_CAPACITY: i32 = 26;

    /// Longest A* path a monster will follow before stepping directly
    pub const MAX_PATH_LENGTH: usize = 25;
}
