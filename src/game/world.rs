//! # World Representation
//!
//! Tiles, the fixed-size grid they live in, and the region that owns a grid
//! together with the entities standing on it.

use crate::{BurrowError, BurrowResult, EntityId, EntityTable, Position, Room};
use serde::{Deserialize, Serialize};

/// A single terrain cell.
///
/// `explored` only ever goes from false to true; there is no way to clear it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Whether movement into the cell is impossible
    pub blocked: bool,
    /// Whether the cell stops line of sight
    pub blocks_sight: bool,
    /// Glyph drawn for the cell
    pub glyph: char,
    explored: bool,
}

impl Tile {
    /// Creates a tile whose sight blocking follows `blocked`.
    pub fn new(blocked: bool, glyph: char) -> Self {
        Self::with_sight(blocked, blocked, glyph)
    }

    /// Creates a tile with sight blocking set independently of movement.
    pub fn with_sight(blocked: bool, blocks_sight: bool, glyph: char) -> Self {
        Self {
            blocked,
            blocks_sight,
            glyph,
            explored: false,
        }
    }

    /// Solid rock.
    pub fn wall() -> Self {
        Self::new(true, '#')
    }

    /// Plain walkable floor.
    pub fn floor() -> Self {
        Self::new(false, '.')
    }

    /// Whether the cell has ever been seen.
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Marks the cell as seen. Permanent.
    pub fn mark_explored(&mut self) {
        self.explored = true;
    }
}

/// Fixed `width × height` array of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with copies of `tile`.
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![tile; (width * height) as usize],
        }
    }

    /// Creates a grid of solid walls, the starting point for carving.
    pub fn walls(width: i32, height: i32) -> Self {
        Self::filled(width, height, Tile::wall())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Checks whether a position lies on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// Replaces the terrain at `pos`, keeping its explored memory.
    pub fn set(&mut self, pos: Position, tile: Tile) -> BurrowResult<()> {
        let index = self.index(pos).ok_or_else(|| {
            BurrowError::InvalidAction(format!("Position {:?} is outside the grid", pos))
        })?;
        let was_explored = self.tiles[index].explored;
        self.tiles[index] = tile;
        self.tiles[index].explored |= was_explored;
        Ok(())
    }

    /// Movement blocking; everything off the grid counts as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get(pos).map(|tile| tile.blocked).unwrap_or(true)
    }

    /// Sight blocking; everything off the grid counts as opaque.
    pub fn blocks_sight(&self, pos: Position) -> bool {
        self.get(pos).map(|tile| tile.blocks_sight).unwrap_or(true)
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Iterates every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

/// Lateral address of a region in the open world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub longitude: i32,
    pub latitude: i32,
}

impl ChunkCoord {
    pub fn new(longitude: i32, latitude: i32) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// The chunk a new open-world game starts in.
    pub fn origin() -> Self {
        Self::default()
    }

    /// `|longitude| + |latitude|`, the open world's difficulty metric.
    pub fn distance_from_origin(self) -> u32 {
        self.longitude.unsigned_abs() + self.latitude.unsigned_abs()
    }
}

/// One self-contained generated area: a dungeon level or an open-world chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Where the region sits in the open world (origin for dungeon levels)
    pub coordinates: ChunkCoord,
    /// Terrain
    pub grid: Grid,
    /// Every entity positioned on the grid, in iteration order
    pub entities: EntityTable,
    /// Recommended arrival point for the player
    pub spawn: Position,
    /// The level exit, if this region has one
    pub exit: Option<EntityId>,
    /// Rooms accepted during generation, in acceptance order
    pub rooms: Vec<Room>,
}

impl Region {
    /// Creates an empty region around a grid.
    pub fn new(coordinates: ChunkCoord, grid: Grid, spawn: Position) -> Self {
        Self {
            coordinates,
            grid,
            entities: EntityTable::new(),
            spawn,
            exit: None,
            rooms: Vec::new(),
        }
    }

    /// Blocked by terrain or by a blocking entity.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.grid.is_blocked(pos) || self.entities.blocker_at(pos).is_some()
    }

    /// Position of the level exit, if any.
    pub fn exit_position(&self) -> Option<Position> {
        self.exit
            .and_then(|id| self.entities.get(id))
            .map(|entity| entity.position)
    }
}
