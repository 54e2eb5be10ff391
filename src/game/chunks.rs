//! # Chunk Manager
//!
//! The open world is a sparse plane of equally sized regions addressed by
//! longitude and latitude. Each chunk is generated the first time the player
//! walks into it and cached when they walk out, so coming back restores the
//! exact grid and entities that were left behind.
//!
//! The chunk the player is standing in lives in [`GameState::region`]; the
//! cache only ever holds the others.

use crate::{
    BurrowError, BurrowResult, ChunkCoord, Color, GameState, Generator, OverworldGenerator,
    Position, Region, TurnOutcome, WorldMode,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the active chunk sits in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldTransform {
    pub longitude: i32,
    pub latitude: i32,
    pub distance_from_origin: u32,
}

impl WorldTransform {
    pub fn at(coordinates: ChunkCoord) -> Self {
        Self {
            longitude: coordinates.longitude,
            latitude: coordinates.latitude,
            distance_from_origin: coordinates.distance_from_origin(),
        }
    }

    pub fn coordinates(&self) -> ChunkCoord {
        ChunkCoord::new(self.longitude, self.latitude)
    }
}

/// Cache of visited chunks plus the active chunk's transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkManager {
    #[serde(with = "chunk_cache")]
    cache: HashMap<ChunkCoord, Region>,
    pub transform: WorldTransform,
}

impl ChunkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the cached chunk at `coordinates`.
    pub fn take(&mut self, coordinates: ChunkCoord) -> Option<Region> {
        self.cache.remove(&coordinates)
    }

    /// Caches a region under its own coordinates, replacing any older copy.
    pub fn store(&mut self, region: Region) {
        self.cache.insert(region.coordinates, region);
    }

    pub fn is_cached(&self, coordinates: ChunkCoord) -> bool {
        self.cache.contains_key(&coordinates)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn get(&self, coordinates: ChunkCoord) -> Option<&Region> {
        self.cache.get(&coordinates)
    }
}

/// Chunk coordinates are not valid JSON object keys, so the cache is written
/// as a list of `[coordinates, region]` pairs.
mod chunk_cache {
    use crate::{ChunkCoord, Region};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S>(cache: &HashMap<ChunkCoord, Region>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(cache.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<ChunkCoord, Region>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(ChunkCoord, Region)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// Chunk offset and arrival cell for a step that lands on `target`, just off
/// a `width` x `height` grid.
///
/// East and west shift longitude. Leaving over the top edge (y < 0) is north
/// and raises latitude; the bottom edge lowers it. The player reappears on the
/// opposite edge.
pub fn edge_crossing(target: Position, width: i32, height: i32) -> (Position, Position) {
    let (dlon, x) = if target.x < 0 {
        (-1, width - 1)
    } else if target.x >= width {
        (1, 0)
    } else {
        (0, target.x)
    };
    let (dlat, y) = if target.y < 0 {
        (1, height - 1)
    } else if target.y >= height {
        (-1, 0)
    } else {
        (0, target.y)
    };
    (Position::new(dlon, dlat), Position::new(x, y))
}

impl GameState {
    /// Moves the player into the neighbouring chunk that `target` falls in.
    ///
    /// The chunk is loaded from the cache or generated, and the chunk left
    /// behind is cached. If something stands on the arrival cell the move is
    /// refused and no turn passes.
    pub(crate) fn cross_chunk_edge(&mut self, target: Position) -> BurrowResult<TurnOutcome> {
        let (width, height) = (self.region.grid.width(), self.region.grid.height());
        let (shift, arrival) = edge_crossing(target, width, height);
        let here = self.region.coordinates;
        let destination = ChunkCoord::new(here.longitude + shift.x, here.latitude + shift.y);

        let cached = match &mut self.world {
            WorldMode::Overworld(chunks) => chunks.take(destination),
            WorldMode::Dungeon { .. } => return Ok(TurnOutcome::NotTaken),
        };
        let fresh = cached.is_none();
        let next = match cached {
            Some(region) => region,
            None => OverworldGenerator::new(destination).generate(&self.generation, &mut self.rng)?,
        };

        if next.is_blocked(arrival) {
            self.chunks_mut()?.store(next);
            self.log.add("Something blocks your way.", Color::WHITE);
            debug!(
                "Arrival ({}, {}) in chunk ({}, {}) is blocked",
                arrival.x, arrival.y, destination.longitude, destination.latitude
            );
            return Ok(TurnOutcome::NotTaken);
        }

        let previous = self.swap_region(next, arrival)?;
        let chunks = self.chunks_mut()?;
        chunks.store(previous);
        chunks.transform = WorldTransform::at(destination);
        if fresh {
            self.statistics.chunks_visited += 1;
        }

        info!(
            "Entered chunk ({}, {}), {} from origin",
            destination.longitude,
            destination.latitude,
            destination.distance_from_origin()
        );
        Ok(TurnOutcome::Taken)
    }

    fn chunks_mut(&mut self) -> BurrowResult<&mut ChunkManager> {
        match &mut self.world {
            WorldMode::Overworld(chunks) => Ok(chunks),
            WorldMode::Dungeon { .. } => Err(BurrowError::InvalidState(
                "The dungeon has no chunks".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AiBehavior, DeathKind, Direction, Entity, EntityId, Fighter, GameConfig};

    fn overworld(seed: u64) -> GameState {
        GameState::new(&GameConfig::overworld(seed)).unwrap()
    }

    fn place_player(state: &mut GameState, pos: Position) {
        let player = state.player_id;
        state.entity_mut(player).unwrap().position = pos;
    }

    fn snapshot(state: &GameState) -> Vec<(EntityId, Position)> {
        state
            .region
            .entities
            .iter()
            .filter(|entity| entity.id != state.player_id)
            .map(|entity| (entity.id, entity.position))
            .collect()
    }

    fn snapshot_region(region: &Region) -> Vec<(EntityId, Position)> {
        region
            .entities
            .iter()
            .map(|entity| (entity.id, entity.position))
            .collect()
    }

    #[test]
    fn test_edge_crossing_axes() {
        let (w, h) = (80, 43);
        assert_eq!(
            edge_crossing(Position::new(80, 7), w, h),
            (Position::new(1, 0), Position::new(0, 7))
        );
        assert_eq!(
            edge_crossing(Position::new(-1, 7), w, h),
            (Position::new(-1, 0), Position::new(79, 7))
        );
        assert_eq!(
            edge_crossing(Position::new(12, -1), w, h),
            (Position::new(0, 1), Position::new(12, 42))
        );
        assert_eq!(
            edge_crossing(Position::new(12, 43), w, h),
            (Position::new(0, -1), Position::new(12, 0))
        );
        assert_eq!(
            edge_crossing(Position::new(80, 43), w, h),
            (Position::new(1, -1), Position::new(0, 0))
        );
    }

    #[test]
    fn test_chunk_round_trip_restores_state() {
        let mut state = overworld(21);
        let width = state.region.grid.width();
        let row = state.region.spawn.y;
        place_player(&mut state, Position::new(width - 1, row));

        let grid_before = state.region.grid.clone();
        let entities_before = snapshot(&state);

        let outcome = state.player_move_or_attack(Direction::East.to_delta()).unwrap();
        assert_eq!(outcome, TurnOutcome::Taken);
        assert_eq!(state.region.coordinates, ChunkCoord::new(1, 0));
        assert_eq!(state.player_position().unwrap(), Position::new(0, row));
        assert_eq!(state.location(), crate::Location::Distance(1));
        assert!(state.fov_dirty);

        let outcome = state.player_move_or_attack(Direction::West.to_delta()).unwrap();
        assert_eq!(outcome, TurnOutcome::Taken);
        assert_eq!(state.region.coordinates, ChunkCoord::origin());
        assert_eq!(state.player_position().unwrap(), Position::new(width - 1, row));
        assert_eq!(state.region.grid, grid_before);
        assert_eq!(snapshot(&state), entities_before);
        assert_eq!(state.statistics.chunks_visited, 2);

        match &state.world {
            WorldMode::Overworld(chunks) => {
                assert!(chunks.is_cached(ChunkCoord::new(1, 0)));
                assert!(!chunks.is_cached(ChunkCoord::origin()));
                assert_eq!(chunks.transform.distance_from_origin, 0);
            }
            WorldMode::Dungeon { .. } => panic!("expected the open world"),
        }
    }

    #[test]
    fn test_north_raises_latitude() {
        let mut state = overworld(8);
        place_player(&mut state, Position::new(10, 0));
        state.player_move_or_attack(Direction::North.to_delta()).unwrap();
        assert_eq!(state.region.coordinates, ChunkCoord::new(0, 1));
        let height = state.region.grid.height();
        assert_eq!(state.player_position().unwrap(), Position::new(10, height - 1));
    }

    #[test]
    fn test_blocked_arrival_is_refused() {
        let mut state = overworld(4);
        let width = state.region.grid.width();
        place_player(&mut state, Position::new(width - 1, 5));
        state.player_move_or_attack(Direction::East.to_delta()).unwrap();
        state.player_move_or_attack(Direction::West.to_delta()).unwrap();

        if let WorldMode::Overworld(chunks) = &mut state.world {
            let mut east = chunks.take(ChunkCoord::new(1, 0)).unwrap();
            east.entities.insert(
                Entity::new(Position::new(0, 5), 'o', "orc", Color::DESATURATED_GREEN, true)
                    .with_fighter(Fighter::new(10, 0, 3, 35, DeathKind::Monster))
                    .with_ai(AiBehavior::Basic),
            );
            chunks.store(east);
        }

        let outcome = state.player_move_or_attack(Direction::East.to_delta()).unwrap();
        assert_eq!(outcome, TurnOutcome::NotTaken);
        assert_eq!(state.region.coordinates, ChunkCoord::origin());
        assert_eq!(state.player_position().unwrap(), Position::new(width - 1, 5));
        assert!(state.log.contains("Something blocks your way."));
    }

    #[test]
    fn test_cache_survives_serialization() {
        let mut state = overworld(13);
        let width = state.region.grid.width();
        place_player(&mut state, Position::new(width - 1, 3));
        state.player_move_or_attack(Direction::East.to_delta()).unwrap();

        let left_behind = match &state.world {
            WorldMode::Overworld(chunks) => snapshot_region(chunks.get(ChunkCoord::origin()).unwrap()),
            WorldMode::Dungeon { .. } => panic!("expected the open world"),
        };

        let restored = GameState::deserialize(&state.serialize().unwrap()).unwrap();
        match restored.world {
            WorldMode::Overworld(chunks) => {
                assert_eq!(chunks.cached_count(), 1);
                let origin = chunks.get(ChunkCoord::origin()).unwrap();
                assert_eq!(snapshot_region(origin), left_behind);
                assert_eq!(chunks.transform.coordinates(), ChunkCoord::new(1, 0));
            }
            WorldMode::Dungeon { .. } => panic!("expected the open world"),
        }
    }
}
