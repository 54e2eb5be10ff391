//! # Game State Module
//!
//! Central game state management and the turn scheduler.
//!
//! [`GameState`] is the one context object every operation receives. It owns
//! the active region, the player's inventory, the message log and the
//! visibility map, and [`GameState::play_turn`] is the only entry point that
//! advances simulated time.

use crate::{
    config, new_player, starting_kit, BurrowError, BurrowResult, ChunkCoord,
    ChunkManager, Color, DungeonGenerator, Entity, EntityId, GenerationConfig, Generator,
    InputSource, Inventory, LevelUpChoice, MessageLog, OverworldGenerator, PlayerCommand,
    Position, Region, TurnOutcome, VisibilityMap,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Whether the simulation still accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// Terminal: no player or AI actions are processed any more
    Dead,
}

/// Which kind of world a new game takes place in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Dungeon,
    Overworld,
}

/// The world around the active region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldMode {
    /// Sequential levels; only the current one exists
    Dungeon { depth: u32 },
    /// Laterally addressed chunks with a cache of visited ones
    Overworld(ChunkManager),
}

/// Everything needed to start a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: GameMode,
    pub generation: GenerationConfig,
    pub fov_radius: i32,
    pub player_name: String,
}

impl GameConfig {
    /// A dungeon game with default generation settings.
    pub fn dungeon(seed: u64) -> Self {
        Self {
            mode: GameMode::Dungeon,
            generation: GenerationConfig::new(seed),
            fov_radius: config::TORCH_RADIUS,
            player_name: "player".to_string(),
        }
    }

    /// An open-world game with default generation settings.
    pub fn overworld(seed: u64) -> Self {
        Self {
            mode: GameMode::Overworld,
            generation: GenerationConfig::overworld(seed),
            ..Self::dungeon(seed)
        }
    }
}

/// Progress counters for the end-of-game summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub monsters_slain: u32,
    pub steps_taken: u32,
    pub items_used: u32,
    pub deepest_level: u32,
    pub chunks_visited: u32,
}

/// Where the player is, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Depth(u32),
    Distance(u32),
}

/// Summary stats handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub hp: i32,
    pub max_hp: i32,
    pub xp: i32,
    pub level: i32,
    pub location: Location,
    pub turn: u64,
    pub status: GameStatus,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match self.location {
            Location::Depth(depth) => format!("depth {}", depth),
            Location::Distance(distance) => format!("{} chunks from home", distance),
        };
        write!(
            f,
            "HP {}/{}  XP {}  Level {}  {}  Turn {}",
            self.hp, self.max_hp, self.xp, self.level, location, self.turn
        )?;
        if self.status == GameStatus::Dead {
            write!(f, "  (dead)")?;
        }
        Ok(())
    }
}

/// The character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub level: i32,
    pub xp: i32,
    pub next_level_xp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
    pub inventory_capacity: i32,
}

/// What the renderer needs to know about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub glyph: char,
    pub blocked: bool,
    pub visible: bool,
    pub explored: bool,
}

fn unseeded_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Central game state containing all game data.
///
/// All mutation happens through methods on this type, one tick at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The region the player is standing in
    pub region: Region,
    /// Dungeon depth or open-world chunk cache
    pub world: WorldMode,
    /// The player entity, stored in `region.entities`
    pub player_id: EntityId,
    pub inventory: Inventory,
    pub log: MessageLog,
    pub status: GameStatus,
    pub visibility: VisibilityMap,
    pub fov_radius: i32,
    /// Set whenever the player moves or the region changes
    pub fov_dirty: bool,
    pub generation: GenerationConfig,
    pub player_level: i32,
    pub turn_number: u64,
    pub rng_seed: u64,
    pub statistics: GameStatistics,
    #[serde(skip, default = "unseeded_rng")]
    pub(crate) rng: StdRng,
}

impl GameState {
    /// Starts a new game.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{GameConfig, GameState, GameStatus};
    ///
    /// let state = GameState::new(&GameConfig::dungeon(12345)).unwrap();
    /// assert_eq!(state.turn_number, 0);
    /// assert_eq!(state.status, GameStatus::Playing);
    /// assert_eq!(state.inventory.len(), 1);
    /// ```
    pub fn new(config: &GameConfig) -> BurrowResult<Self> {
        let seed = config.generation.seed;
        let mut rng = StdRng::seed_from_u64(seed);

        let (region, world) = match config.mode {
            GameMode::Dungeon => (
                DungeonGenerator::new(1).generate(&config.generation, &mut rng)?,
                WorldMode::Dungeon { depth: 1 },
            ),
            GameMode::Overworld => (
                OverworldGenerator::new(ChunkCoord::default())
                    .generate(&config.generation, &mut rng)?,
                WorldMode::Overworld(ChunkManager::new()),
            ),
        };

        let mut player = new_player(region.spawn);
        player.name = config.player_name.clone();

        let mut state = Self::from_parts(region, player, world, config.generation.clone())?;
        state.rng = rng;
        state.fov_radius = config.fov_radius;

        for kind in starting_kit() {
            let index = state.inventory.push(kind.spawn(state.region.spawn));
            state.inventory.equip(index);
        }

        let welcome = match config.mode {
            GameMode::Dungeon => {
                "Welcome stranger! Prepare to perish in the Tombs of the Ancient Kings."
            }
            GameMode::Overworld => "Welcome stranger! The wilds stretch out in every direction.",
        };
        state.log.add(welcome, Color::RED);
        state.fov_dirty = true;
        state.refresh_fov();

        info!("New {:?} game started with seed {}", config.mode, seed);
        Ok(state)
    }

    /// Assembles a state around an existing region, placing `player` in it.
    pub fn from_parts(
        mut region: Region,
        player: Entity,
        world: WorldMode,
        generation: GenerationConfig,
    ) -> BurrowResult<Self> {
        if player.fighter.is_none() {
            return Err(BurrowError::InvalidState(
                "The player must be able to fight".to_string(),
            ));
        }
        let seed = generation.seed;
        let visibility = VisibilityMap::for_grid(&region.grid);
        let player_id = region.entities.insert(player);
        let depth = match world {
            WorldMode::Dungeon { depth } => depth,
            WorldMode::Overworld(_) => 0,
        };

        let mut state = Self {
            region,
            world,
            player_id,
            inventory: Inventory::new(),
            log: MessageLog::default(),
            status: GameStatus::Playing,
            visibility,
            fov_radius: config::TORCH_RADIUS,
            fov_dirty: true,
            generation,
            player_level: 1,
            turn_number: 0,
            rng_seed: seed,
            statistics: GameStatistics {
                deepest_level: depth,
                chunks_visited: 1,
                ..GameStatistics::default()
            },
            rng: StdRng::seed_from_u64(seed),
        };
        state.refresh_fov();
        Ok(state)
    }

    pub fn entity(&self, id: EntityId) -> BurrowResult<&Entity> {
        self.region
            .entities
            .get(id)
            .ok_or_else(|| BurrowError::InvalidState(format!("Unknown entity {}", id)))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> BurrowResult<&mut Entity> {
        self.region
            .entities
            .get_mut(id)
            .ok_or_else(|| BurrowError::InvalidState(format!("Unknown entity {}", id)))
    }

    pub fn player(&self) -> BurrowResult<&Entity> {
        self.entity(self.player_id)
    }

    pub fn player_position(&self) -> BurrowResult<Position> {
        Ok(self.player()?.position)
    }

    /// Depth in the dungeon or distance from the origin chunk; drives spawn tables.
    pub fn location(&self) -> Location {
        match &self.world {
            WorldMode::Dungeon { depth } => Location::Depth(*depth),
            WorldMode::Overworld(chunks) => {
                Location::Distance(chunks.transform.distance_from_origin)
            }
        }
    }

    /// Runs one tick: the player's command, then every AI if that took a turn.
    ///
    /// Commands that consume no turn skip the AI phase entirely. Once the
    /// player is dead nothing runs and every call reports game over.
    pub fn play_turn(
        &mut self,
        command: PlayerCommand,
        input: &mut dyn InputSource,
    ) -> BurrowResult<TurnOutcome> {
        if self.status == GameStatus::Dead {
            return Ok(TurnOutcome::GameOver);
        }

        let outcome = self.handle_command(command, input)?;
        self.refresh_fov();

        if outcome == TurnOutcome::Taken {
            self.turn_number += 1;
            self.run_ai()?;
            self.refresh_fov();
        }

        if self.status == GameStatus::Dead {
            info!("Game over after {} turns", self.turn_number);
            return Ok(TurnOutcome::GameOver);
        }

        self.check_level_up(input)?;
        Ok(outcome)
    }

    /// Recomputes the field of view if the player moved since the last sweep.
    pub fn refresh_fov(&mut self) {
        if !self.fov_dirty {
            return;
        }
        let Ok(origin) = self.player_position() else {
            return;
        };
        self.visibility
            .recompute(&mut self.region.grid, origin, self.fov_radius);
        self.fov_dirty = false;
        debug!(
            "FOV recomputed at ({}, {}): {} cells visible",
            origin.x,
            origin.y,
            self.visibility.visible_count()
        );
    }

    /// Experience needed for the next level.
    pub fn level_up_xp(&self) -> i32 {
        config::LEVEL_UP_BASE + self.player_level * config::LEVEL_UP_FACTOR
    }

    /// Promotes the player while their experience allows it.
    pub fn check_level_up(&mut self, input: &mut dyn InputSource) -> BurrowResult<()> {
        loop {
            let threshold = self.level_up_xp();
            let player_id = self.player_id;
            let Some(fighter) = self.entity_mut(player_id)?.fighter.as_mut() else {
                return Ok(());
            };
            if fighter.xp < threshold {
                return Ok(());
            }
            fighter.xp -= threshold;
            self.player_level += 1;
            self.log.add(
                format!(
                    "Your battle skills grow stronger! You reached level {}!",
                    self.player_level
                ),
                Color::YELLOW,
            );

            let choice = input.choose_level_up(self);
            if let Some(fighter) = self.entity_mut(player_id)?.fighter.as_mut() {
                match choice {
                    LevelUpChoice::Constitution => {
                        fighter.base_max_hp += 20;
                        fighter.hp += 20;
                    }
                    LevelUpChoice::Strength => fighter.base_power += 1,
                    LevelUpChoice::Agility => fighter.base_defense += 1,
                }
            }
            info!("Player reached level {} ({:?})", self.player_level, choice);
        }
    }

    /// Summary stats for the status line.
    pub fn summary(&self) -> BurrowResult<Summary> {
        let player = self.player()?;
        let (hp, xp) = player
            .fighter
            .as_ref()
            .map(|f| (f.hp, f.xp))
            .unwrap_or((0, 0));
        Ok(Summary {
            hp,
            max_hp: self.effective_max_hp(self.player_id)?,
            xp,
            level: self.player_level,
            location: self.location(),
            turn: self.turn_number,
            status: self.status,
        })
    }

    /// The character sheet, with every stat already including equipment.
    pub fn character_info(&self) -> BurrowResult<CharacterInfo> {
        let id = self.player_id;
        Ok(CharacterInfo {
            level: self.player_level,
            xp: self.player()?.fighter.as_ref().map(|f| f.xp).unwrap_or(0),
            next_level_xp: self.level_up_xp(),
            max_hp: self.effective_max_hp(id)?,
            power: self.effective_power(id)?,
            defense: self.effective_defense(id)?,
            inventory_capacity: self.effective_inventory_capacity(id)?,
        })
    }

    /// Read-only view of one cell, or `None` off the grid.
    pub fn cell_view(&self, pos: Position) -> Option<CellView> {
        let tile = self.region.grid.get(pos)?;
        Some(CellView {
            glyph: tile.glyph,
            blocked: tile.blocked,
            visible: self.visibility.is_visible(pos),
            explored: tile.is_explored(),
        })
    }

    /// Entities the renderer should draw, bottom layer first: everything in
    /// view plus always-visible entities on explored cells.
    pub fn drawable_entities(&self) -> impl Iterator<Item = &Entity> {
        self.region.entities.iter().filter(move |entity| {
            self.visibility.is_visible(entity.position)
                || (entity.always_visible
                    && self
                        .region
                        .grid
                        .get(entity.position)
                        .map(|tile| tile.is_explored())
                        .unwrap_or(false))
        })
    }

    /// Moves the player into `next` at `arrival`, returning the region left behind.
    pub(crate) fn swap_region(&mut self, mut next: Region, arrival: Position) -> BurrowResult<Region> {
        let mut player = self.region.entities.remove(self.player_id).ok_or_else(|| {
            BurrowError::InvalidState("The player is missing from the region".to_string())
        })?;
        player.position = arrival;
        next.entities.insert(player);

        let previous = std::mem::replace(&mut self.region, next);
        self.visibility = VisibilityMap::for_grid(&self.region.grid);
        self.fov_dirty = true;
        Ok(previous)
    }

    /// Plain-data encoding of the whole state.
    pub fn serialize(&self) -> BurrowResult<String> {
        serde_json::to_string_pretty(self).map_err(BurrowError::from)
    }

    /// Rebuilds a state from [`GameState::serialize`] output.
    pub fn deserialize(data: &str) -> BurrowResult<Self> {
        let mut state: GameState = serde_json::from_str(data)
            .map_err(|err| BurrowError::LoadFailure(format!("Corrupt save: {}", err)))?;
        if !state.region.entities.contains(state.player_id) {
            return Err(BurrowError::LoadFailure(
                "Save does not contain the player".to_string(),
            ));
        }
        state.rng = StdRng::seed_from_u64(state.rng_seed.wrapping_add(state.turn_number));
        state.fov_dirty = true;
        state.refresh_fov();
        Ok(state)
    }

    pub fn save_to_path(&self, path: &Path) -> BurrowResult<()> {
        std::fs::write(path, self.serialize()?)?;
        info!("Game saved to {}", path.display());
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> BurrowResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| {
            BurrowError::LoadFailure(format!("Cannot read {}: {}", path.display(), err))
        })?;
        Self::deserialize(&data)
    }

    /// Loads a save, or `None` when there is no usable one.
    pub fn load_or_none(path: &Path) -> Option<Self> {
        match Self::load_from_path(path) {
            Ok(state) => Some(state),
            Err(err) => {
                warn!("No save available: {}", err);
                None
            }
        }
    }
}
