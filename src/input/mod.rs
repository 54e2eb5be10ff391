//! # Input Module
//!
//! The input collaborator contract.
//!
//! Commands reach the simulation as [`PlayerCommand`] values. When an action
//! needs more information mid-turn (a target tile, a monster, an inventory
//! entry, a level-up stat) it asks an [`InputSource`] and blocks until the
//! answer arrives. A cancelled prompt unwinds to the calling action.

pub mod commands;

pub use commands::*;

use crate::{Direction, EntityId, GameState, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Why an inventory entry is being chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryPurpose {
    Use,
    Drop,
}

/// Stat raised on reaching a new level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// +20 max hp
    Constitution,
    /// +1 attack
    Strength,
    /// +1 defense
    Agility,
}

/// Answers the prompts an action raises while it runs.
pub trait InputSource {
    /// Pick a tile, optionally within `max_range` of the player.
    fn target_tile(&mut self, state: &GameState, max_range: Option<f64>) -> TargetReply<Position>;

    /// Pick an entity, optionally within `max_range` of the player.
    fn target_entity(&mut self, state: &GameState, max_range: Option<f64>)
        -> TargetReply<EntityId>;

    /// Pick an inventory index, or `None` to close the menu.
    fn choose_item(&mut self, state: &GameState, purpose: InventoryPurpose) -> Option<usize>;

    /// Pick the stat to raise. There is no way to decline.
    fn choose_level_up(&mut self, state: &GameState) -> LevelUpChoice;
}

/// Input source fed from queues of prepared answers.
///
/// Each prompt pops the next queued command; a command that does not answer
/// that kind of prompt, or an empty queue, counts as a cancel.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    replies: VecDeque<PlayerCommand>,
    level_ups: VecDeque<LevelUpChoice>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a prompt answer.
    pub fn reply(mut self, command: PlayerCommand) -> Self {
        self.replies.push_back(command);
        self
    }

    /// Queues a level-up choice. Without one, Constitution is chosen.
    pub fn level_up(mut self, choice: LevelUpChoice) -> Self {
        self.level_ups.push_back(choice);
        self
    }

    /// Answers not consumed yet.
    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl InputSource for ScriptedInput {
    fn target_tile(&mut self, _state: &GameState, _max_range: Option<f64>) -> TargetReply<Position> {
        match self.replies.pop_front() {
            Some(PlayerCommand::TargetTile(reply)) => reply,
            _ => TargetReply::Cancel,
        }
    }

    fn target_entity(
        &mut self,
        _state: &GameState,
        _max_range: Option<f64>,
    ) -> TargetReply<EntityId> {
        match self.replies.pop_front() {
            Some(PlayerCommand::TargetEntity(reply)) => reply,
            _ => TargetReply::Cancel,
        }
    }

    fn choose_item(&mut self, _state: &GameState, purpose: InventoryPurpose) -> Option<usize> {
        match (purpose, self.replies.pop_front()) {
            (InventoryPurpose::Use, Some(PlayerCommand::UseItem(index))) => Some(index),
            (InventoryPurpose::Drop, Some(PlayerCommand::DropItem(index))) => Some(index),
            _ => None,
        }
    }

    fn choose_level_up(&mut self, _state: &GameState) -> LevelUpChoice {
        self.level_ups
            .pop_front()
            .unwrap_or(LevelUpChoice::Constitution)
    }
}

/// Seeded input source that plays on its own, for headless runs.
///
/// It walks randomly, picks up whatever it stands on, takes stairs when it
/// finds them, and aims every prompt at the closest visible monster.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: StdRng,
}

impl AutoPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Chooses the next command for the current state.
    pub fn next_command(&mut self, state: &GameState) -> PlayerCommand {
        let Ok(player) = state.player() else {
            return PlayerCommand::ShowCharacterInfo;
        };
        let here = player.position;

        if state.region.exit_position() == Some(here) {
            return PlayerCommand::DescendIfOnExit;
        }
        if state.region.entities.item_at(here).is_some() {
            return PlayerCommand::PickUp;
        }

        let hurt = player
            .fighter
            .as_ref()
            .map(|f| f.hp * 2 < f.base_max_hp)
            .unwrap_or(false);
        if (hurt || self.rng.gen_bool(0.05)) && !state.inventory.is_empty() {
            return PlayerCommand::OpenInventoryToUse;
        }

        let directions = Direction::all();
        let direction = directions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::North);
        PlayerCommand::Move(direction)
    }
}

impl InputSource for AutoPlayer {
    fn target_tile(&mut self, state: &GameState, max_range: Option<f64>) -> TargetReply<Position> {
        let range = max_range.unwrap_or(f64::MAX);
        state
            .closest_visible_monster(range)
            .and_then(|id| state.region.entities.get(id))
            .map(|entity| TargetReply::Selected(entity.position))
            .unwrap_or(TargetReply::Cancel)
    }

    fn target_entity(
        &mut self,
        state: &GameState,
        max_range: Option<f64>,
    ) -> TargetReply<EntityId> {
        let range = max_range.unwrap_or(f64::MAX);
        state
            .closest_visible_monster(range)
            .map(TargetReply::Selected)
            .unwrap_or(TargetReply::Cancel)
    }

    fn choose_item(&mut self, state: &GameState, _purpose: InventoryPurpose) -> Option<usize> {
        if state.inventory.is_empty() {
            None
        } else {
            Some(self.rng.gen_range(0..state.inventory.len()))
        }
    }

    fn choose_level_up(&mut self, _state: &GameState) -> LevelUpChoice {
        [
            LevelUpChoice::Constitution,
            LevelUpChoice::Strength,
            LevelUpChoice::Agility,
        ]
        .choose(&mut self.rng)
        .copied()
        .unwrap_or(LevelUpChoice::Constitution)
    }
}
