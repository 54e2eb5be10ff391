//! # Open-World Generation
//!
//! Open chunks dotted with trees and boulders. Obstacles come from Perlin noise
//! sampled at absolute world coordinates, so neighbouring chunks line up along
//! their shared edge. The outermost ring of every chunk stays walkable, which
//! keeps every edge crossable.

use crate::{
    populate, reachable, Biome, BurrowError, BurrowResult, ChunkCoord, GenerationConfig,
    Generator, Grid, Position, Region, Room, Tile,
};
use log::debug;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;

/// Glyph of a tree: blocks movement and sight.
pub const TREE_GLYPH: char = '♣';

/// Glyph of a boulder: blocks movement, can be seen past.
pub const BOULDER_GLYPH: char = '0';

/// Generator for the chunk at one world coordinate.
#[derive(Debug, Clone)]
pub struct OverworldGenerator {
    pub coordinates: ChunkCoord,
}

impl OverworldGenerator {
    pub fn new(coordinates: ChunkCoord) -> Self {
        Self { coordinates }
    }

    /// Absolute world position of a local cell. North is up, so latitude
    /// grows towards smaller y.
    fn world_position(&self, config: &GenerationConfig, pos: Position) -> (f64, f64) {
        let wx = self.coordinates.longitude as f64 * config.width as f64 + pos.x as f64;
        let wy = -(self.coordinates.latitude as f64) * config.height as f64 + pos.y as f64;
        (wx, wy)
    }

    fn terrain(&self, config: &GenerationConfig) -> Grid {
        let trees = Perlin::new(config.seed as u32);
        let rocks = Perlin::new(config.seed.wrapping_add(1) as u32);
        let mut grid = Grid::filled(config.width, config.height, Tile::floor());

        for y in 1..config.height - 1 {
            for x in 1..config.width - 1 {
                let pos = Position::new(x, y);
                let (wx, wy) = self.world_position(config, pos);
                let sample = [wx * config.noise_scale, wy * config.noise_scale];

                let tile = if trees.get(sample) > config.obstacle_threshold {
                    Tile::new(true, TREE_GLYPH)
                } else if rocks.get(sample) > config.obstacle_threshold + 0.25 {
                    Tile::with_sight(true, false, BOULDER_GLYPH)
                } else {
                    continue;
                };
                if let Some(cell) = grid.get_mut(pos) {
                    *cell = tile;
                }
            }
        }
        grid
    }
}

fn on_border(grid: &Grid, pos: Position) -> bool {
    pos.x == 0 || pos.y == 0 || pos.x == grid.width() - 1 || pos.y == grid.height() - 1
}

/// Clears a straight trail from `start` to the nearest edge when the
/// obstacles around it would otherwise seal it in.
fn open_trail_to_border(grid: &mut Grid, start: Position) -> BurrowResult<()> {
    let reached = reachable(start, |pos| !grid.is_blocked(pos));
    if reached.iter().any(|&pos| on_border(grid, pos)) {
        return Ok(());
    }

    let (w, h) = (grid.width(), grid.height());
    let edges = [
        (start.y, Position::new(0, -1)),
        (h - 1 - start.y, Position::new(0, 1)),
        (start.x, Position::new(-1, 0)),
        (w - 1 - start.x, Position::new(1, 0)),
    ];
    let (steps, delta) = edges
        .into_iter()
        .min_by_key(|&(steps, _)| steps)
        .unwrap_or((0, Position::origin()));

    debug!(
        "Spawn ({}, {}) is enclosed, clearing {} cells to the edge",
        start.x, start.y, steps
    );
    let mut pos = start;
    for _ in 0..steps {
        pos = pos + delta;
        grid.set(pos, Tile::floor())?;
    }
    Ok(())
}

impl Generator<Region> for OverworldGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BurrowResult<Region> {
        config.validate()?;

        let mut grid = self.terrain(config);
        let spawn = Position::new(config.width / 2, config.height / 2);
        grid.set(spawn, Tile::floor())?;
        open_trail_to_border(&mut grid, spawn)?;

        let mut region = Region::new(self.coordinates, grid, spawn);
        let area = Room::new(0, 0, config.width - 1, config.height - 1);
        populate(
            &mut region,
            &area,
            self.coordinates.distance_from_origin(),
            Biome::Overworld,
            Some(spawn),
            rng,
        );

        self.validate(&region, config)?;
        debug!(
            "{} built chunk ({}, {}) with {} entities",
            self.generator_type(),
            self.coordinates.longitude,
            self.coordinates.latitude,
            region.entities.len()
        );
        Ok(region)
    }

    /// The border ring must be walkable terrain and reachable from the spawn.
    fn validate(&self, region: &Region, _config: &GenerationConfig) -> BurrowResult<()> {
        let grid = &region.grid;
        let border_blocked = grid
            .positions()
            .filter(|&pos| on_border(grid, pos))
            .any(|pos| grid.is_blocked(pos));
        if border_blocked {
            return Err(BurrowError::GenerationFailed(format!(
                "Chunk ({}, {}) has a blocked edge",
                self.coordinates.longitude, self.coordinates.latitude
            )));
        }

        let reached = reachable(region.spawn, |pos| !grid.is_blocked(pos));
        if !reached.contains(&Position::origin()) {
            return Err(BurrowError::GenerationFailed(format!(
                "Spawn in chunk ({}, {}) is cut off from the edges",
                self.coordinates.longitude, self.coordinates.latitude
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "OverworldGenerator"
    }
}
