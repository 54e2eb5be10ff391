//! # Dungeon Generation
//!
//! Rooms-and-tunnels level generation.
//!
//! Rooms are placed by rejection sampling, each new room is joined to the one
//! accepted before it by an L-shaped tunnel, and the last room receives the
//! stairs down. A level that places no rooms, or whose rooms are not all
//! reachable from the spawn point, is thrown away and generated again.

use crate::{
    populate, reachable, Biome, BurrowError, BurrowResult, ChunkCoord, Color, Entity,
    GenerationConfig, Generator, Grid, Position, RandomTable, Region, Room, Tile,
};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Rooms-and-tunnels generator for one dungeon level.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    /// Depth of the level, used as the spawn table metric
    pub depth: u32,
}

impl DungeonGenerator {
    /// Creates a generator for the level at `depth`.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{create_rng, DungeonGenerator, GenerationConfig, Generator};
    ///
    /// let config = GenerationConfig::for_testing(7);
    /// let mut rng = create_rng(&config);
    /// let region = DungeonGenerator::new(1).generate(&config, &mut rng).unwrap();
    /// assert!(!region.rooms.is_empty());
    /// assert!(region.exit.is_some());
    /// ```
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// One generation attempt.
    fn attempt(&self, config: &GenerationConfig, rng: &mut StdRng) -> BurrowResult<Region> {
        let mut region = Region::new(
            ChunkCoord::default(),
            Grid::walls(config.width, config.height),
            Position::origin(),
        );
        let decor = floor_decorations();

        for _ in 0..config.max_rooms {
            let w = rng.gen_range(config.room_min_size..=config.room_max_size);
            let h = rng.gen_range(config.room_min_size..=config.room_max_size);
            let x = rng.gen_range(0..=config.width - w - 1);
            let y = rng.gen_range(0..=config.height - h - 1);
            let room = Room::new(x, y, w, h);

            if region.rooms.iter().any(|other| room.intersects(other)) {
                continue;
            }

            carve_room(&mut region.grid, &room, config.decorate_floor.then_some(&decor), rng)?;

            let center = room.center();
            match region.rooms.last() {
                None => region.spawn = center,
                Some(previous) => {
                    let prev = previous.center();
                    if rng.gen_bool(0.5) {
                        carve_h_tunnel(&mut region.grid, prev.x, center.x, prev.y)?;
                        carve_v_tunnel(&mut region.grid, prev.y, center.y, center.x)?;
                    } else {
                        carve_v_tunnel(&mut region.grid, prev.y, center.y, prev.x)?;
                        carve_h_tunnel(&mut region.grid, prev.x, center.x, center.y)?;
                    }
                }
            }

            let spawn = region.spawn;
            populate(&mut region, &room, self.depth, Biome::Dungeon, Some(spawn), rng);
            region.rooms.push(room);
        }

        let last = region.rooms.last().copied().ok_or_else(|| {
            BurrowError::GenerationFailed(format!(
                "No room fit after {} placement attempts",
                config.max_rooms
            ))
        })?;

        let stairs = Entity::new(last.center(), '>', "stairs", Color::WHITE, false).always_visible();
        region.exit = Some(region.entities.insert_back(stairs));

        self.validate(&region, config)?;
        Ok(region)
    }
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Generator<Region> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BurrowResult<Region> {
        config.validate()?;

        let mut last_error = None;
        for attempt in 1..=config.max_generation_attempts {
            match self.attempt(config, rng) {
                Ok(region) => {
                    debug!(
                        "{} built depth {} with {} rooms and {} entities (attempt {})",
                        self.generator_type(),
                        self.depth,
                        region.rooms.len(),
                        region.entities.len(),
                        attempt
                    );
                    return Ok(region);
                }
                Err(err @ BurrowError::GenerationFailed(_)) => {
                    warn!("Generation attempt {} failed: {}", attempt, err);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BurrowError::GenerationFailed("No generation attempt was made".to_string())
        }))
    }

    /// Every room center must be reachable from the spawn point.
    fn validate(&self, region: &Region, _config: &GenerationConfig) -> BurrowResult<()> {
        if region.rooms.is_empty() {
            return Err(BurrowError::GenerationFailed(
                "Level has no rooms".to_string(),
            ));
        }

        let reached = reachable(region.spawn, |pos| !region.grid.is_blocked(pos));
        for (index, room) in region.rooms.iter().enumerate() {
            if !reached.contains(&room.center()) {
                return Err(BurrowError::GenerationFailed(format!(
                    "Room {} is not connected to the spawn point",
                    index
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

/// Weighted floor glyphs for room interiors.
fn floor_decorations() -> RandomTable<char> {
    RandomTable::new()
        .add('.', 80)
        .add(',', 10)
        .add('`', 6)
        .add('\'', 4)
}

/// Opens the interior of a room, leaving its border solid.
fn carve_room(
    grid: &mut Grid,
    room: &Room,
    decor: Option<&RandomTable<char>>,
    rng: &mut StdRng,
) -> BurrowResult<()> {
    for pos in room.interior() {
        let glyph = match decor {
            Some(table) => table.choose(rng).copied().unwrap_or('.'),
            None => '.',
        };
        grid.set(pos, Tile::new(false, glyph))?;
    }
    Ok(())
}

fn carve_h_tunnel(grid: &mut Grid, x1: i32, x2: i32, y: i32) -> BurrowResult<()> {
    for x in x1.min(x2)..=x1.max(x2) {
        grid.set(Position::new(x, y), Tile::floor())?;
    }
    Ok(())
}

fn carve_v_tunnel(grid: &mut Grid, y1: i32, y2: i32, x: i32) -> BurrowResult<()> {
    for y in y1.min(y2)..=y1.max(y2) {
        grid.set(Position::new(x, y), Tile::floor())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_rng;

    #[test]
    fn test_generation_with_small_level() {
        let config = GenerationConfig::for_testing(12345);
        let mut rng = create_rng(&config);
        let region = DungeonGenerator::new(1).generate(&config, &mut rng).unwrap();

        assert_eq!(region.grid.width(), config.width);
        assert_eq!(region.grid.height(), config.height);
        assert_eq!(region.spawn, region.rooms[0].center());
        assert!(!region.grid.is_blocked(region.spawn));
    }

    #[test]
    fn test_stairs_in_last_room_beneath_everything() {
        let config = GenerationConfig::for_testing(2024);
        let mut rng = create_rng(&config);
        let region = DungeonGenerator::new(3).generate(&config, &mut rng).unwrap();

        let exit = region.exit.unwrap();
        let stairs = region.entities.get(exit).unwrap();
        assert_eq!(stairs.glyph, '>');
        assert!(stairs.always_visible);
        assert!(!stairs.blocks);
        assert_eq!(Some(stairs.position), region.rooms.last().map(|r| r.center()));
        assert_eq!(region.entities.ids()[0], exit);
    }

    #[test]
    fn test_no_monster_on_spawn() {
        for seed in 0..20 {
            let config = GenerationConfig::for_testing(seed);
            let mut rng = create_rng(&config);
            let region = DungeonGenerator::new(6).generate(&config, &mut rng).unwrap();
            assert!(region.entities.blocker_at(region.spawn).is_none());
        }
    }

    #[test]
    fn test_tunnel_carving() {
        let mut grid = Grid::walls(20, 20);
        carve_h_tunnel(&mut grid, 15, 5, 5).unwrap();
        carve_v_tunnel(&mut grid, 5, 15, 5).unwrap();
        for x in 5..=15 {
            assert!(!grid.is_blocked(Position::new(x, 5)));
        }
        for y in 5..=15 {
            assert!(!grid.is_blocked(Position::new(5, y)));
        }
        assert!(grid.is_blocked(Position::new(6, 6)));
    }

    #[test]
    fn test_invalid_config_is_not_retried() {
        let config = GenerationConfig {
            room_max_size: 100,
            ..GenerationConfig::for_testing(1)
        };
        let mut rng = create_rng(&config);
        let result = DungeonGenerator::new(1).generate(&config, &mut rng);
        assert!(matches!(result, Err(BurrowError::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_rejects_disconnected_rooms() {
        let config = GenerationConfig::for_testing(1);
        let mut region = Region::new(
            ChunkCoord::default(),
            Grid::walls(config.width, config.height),
            Position::new(3, 3),
        );
        let mut rng = create_rng(&config);
        let first = Room::new(1, 1, 5, 5);
        let second = Room::new(20, 10, 5, 5);
        carve_room(&mut region.grid, &first, None, &mut rng).unwrap();
        carve_room(&mut region.grid, &second, None, &mut rng).unwrap();
        region.rooms = vec![first, second];

        let generator = DungeonGenerator::new(1);
        assert!(generator.validate(&region, &config).is_err());

        let (a, b) = (first.center(), second.center());
        carve_h_tunnel(&mut region.grid, a.x, b.x, a.y).unwrap();
        carve_v_tunnel(&mut region.grid, a.y, b.y, b.x).unwrap();
        assert!(generator.validate(&region, &config).is_ok());
    }
}
