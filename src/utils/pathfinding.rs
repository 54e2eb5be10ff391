//! # Pathfinding Algorithms
//!
//! Pathfinding utilities for AI movement and generation checks, built on the
//! `pathfinding` crate.

use crate::Position;
use pathfinding::prelude::{astar, bfs_reach};
use std::collections::HashSet;

/// First step of the shortest eight-way path from `from` to `to`.
///
/// `passable` decides which intermediate cells may be entered; the goal itself
/// is always accepted so a path can end on an occupied cell. Returns `None`
/// when no path exists or the path is longer than `max_length` steps.
pub fn next_step<F>(from: Position, to: Position, max_length: usize, passable: F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    let (path, cost) = astar(
        &from,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&next| next == to || passable(next))
                .map(|next| (next, 1usize))
                .collect::<Vec<_>>()
        },
        |&pos| pos.chebyshev_distance(to) as usize,
        |&pos| pos == to,
    )?;

    if cost > max_length {
        return None;
    }
    path.get(1).copied()
}

/// Every cell reachable from `start` by cardinal steps through passable cells.
pub fn reachable<F>(start: Position, passable: F) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    bfs_reach(start, |&pos| {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| passable(next))
            .collect::<Vec<_>>()
    })
    .collect()
}
