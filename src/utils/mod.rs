//! # Utilities Module
//!
//! Utility functions for weighted random selection and pathfinding.

pub mod pathfinding;
pub mod random;

pub use self::pathfinding::*;
pub use random::*;
