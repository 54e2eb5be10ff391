//! # Player Actions
//!
//! Everything a player command can do: moving and attacking, picking up,
//! using and dropping items, and taking the stairs.
//!
//! Each action reports whether it consumed a turn. Item effects report
//! [`ActionOutcome::Cancelled`] when a prompt is dismissed or a target is
//! rejected; the item then stays in the inventory and no turn passes.

use crate::{
    AiBehavior, BurrowError, BurrowResult, Color, DungeonGenerator, EntityId, EquipEvent,
    GameState, Generator, InputSource, InventoryPurpose, ItemEffect, PlayerCommand, Position,
    TargetReply, WorldMode,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Whether a tick consumed the player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Taken,
    NotTaken,
    GameOver,
}

/// How an item effect ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Completed,
    Cancelled,
}

impl From<ActionOutcome> for TurnOutcome {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Completed => TurnOutcome::Taken,
            ActionOutcome::Cancelled => TurnOutcome::NotTaken,
        }
    }
}

impl GameState {
    /// Dispatches one command. Does not run the AI phase.
    pub(crate) fn handle_command(
        &mut self,
        command: PlayerCommand,
        input: &mut dyn InputSource,
    ) -> BurrowResult<TurnOutcome> {
        match command {
            PlayerCommand::Move(direction) => self.player_move_or_attack(direction.to_delta()),
            PlayerCommand::PickUp => self.pick_up(),
            PlayerCommand::OpenInventoryToUse => {
                match input.choose_item(self, InventoryPurpose::Use) {
                    Some(index) => self.use_item(index, input),
                    None => Ok(TurnOutcome::NotTaken),
                }
            }
            PlayerCommand::OpenInventoryToDrop => {
                match input.choose_item(self, InventoryPurpose::Drop) {
                    Some(index) => self.drop_item(index),
                    None => Ok(TurnOutcome::NotTaken),
                }
            }
            PlayerCommand::UseItem(index) => self.use_item(index, input),
            PlayerCommand::DropItem(index) => self.drop_item(index),
            PlayerCommand::DescendIfOnExit => self.descend(),
            // Prompt answers and the character sheet never take a turn here.
            PlayerCommand::ShowCharacterInfo
            | PlayerCommand::TargetTile(_)
            | PlayerCommand::TargetEntity(_) => Ok(TurnOutcome::NotTaken),
        }
    }

    /// Attacks a living fighter in the target cell, or steps into it.
    ///
    /// Stepping off the grid crosses into the neighbouring chunk in the open
    /// world and is refused in the dungeon. Walking into a wall costs nothing.
    pub fn player_move_or_attack(&mut self, delta: Position) -> BurrowResult<TurnOutcome> {
        let target = self.player_position()? + delta;

        if !self.region.grid.in_bounds(target) {
            return match self.world {
                WorldMode::Overworld(_) => self.cross_chunk_edge(target),
                WorldMode::Dungeon { .. } => Ok(TurnOutcome::NotTaken),
            };
        }

        if let Some(defender) = self.region.entities.fighter_at(target) {
            if defender != self.player_id {
                self.attack(self.player_id, defender)?;
                return Ok(TurnOutcome::Taken);
            }
        }

        if self.region.is_blocked(target) {
            return Ok(TurnOutcome::NotTaken);
        }

        self.entity_mut(self.player_id)?.position = target;
        self.fov_dirty = true;
        self.statistics.steps_taken += 1;
        Ok(TurnOutcome::Taken)
    }

    /// Moves the item under the player into the inventory.
    pub fn pick_up(&mut self) -> BurrowResult<TurnOutcome> {
        let here = self.player_position()?;
        let Some(item_id) = self.region.entities.item_at(here) else {
            self.log.add("There is nothing here to pick up.", Color::WHITE);
            return Ok(TurnOutcome::NotTaken);
        };
        let name = self.entity(item_id)?.name.clone();

        let capacity = self.effective_inventory_capacity(self.player_id)?;
        match self.inventory.ensure_room(capacity, &name) {
            Ok(()) => {}
            Err(BurrowError::InventoryFull(message)) => {
                self.log.add(message, Color::RED);
                return Ok(TurnOutcome::NotTaken);
            }
            Err(err) => return Err(err),
        }

        let entity = self.region.entities.remove(item_id).ok_or_else(|| {
            BurrowError::InvalidState(format!("Item {} vanished during pickup", item_id))
        })?;
        let slot_free = entity
            .equipment
            .as_ref()
            .map(|equipment| self.inventory.equipped_in(equipment.slot).is_none())
            .unwrap_or(false);

        let index = self.inventory.push(entity);
        self.log.add(format!("You picked up a {}!", name), Color::GREEN);
        if slot_free {
            let events = self.inventory.equip(index);
            self.log_equip_events(events);
        }
        Ok(TurnOutcome::Taken)
    }

    /// Uses the inventory entry at `index`.
    ///
    /// Completed effects consume the item; equipment is toggled instead and
    /// stays in the pack.
    pub fn use_item(
        &mut self,
        index: usize,
        input: &mut dyn InputSource,
    ) -> BurrowResult<TurnOutcome> {
        let Some(entity) = self.inventory.get(index) else {
            self.log.add("There is no such item.", Color::WHITE);
            return Ok(TurnOutcome::NotTaken);
        };
        let name = entity.name.clone();
        let effect = entity.item.as_ref().and_then(|item| item.effect.clone());

        match effect {
            None => {
                self.log
                    .add(format!("The {} cannot be used.", name), Color::WHITE);
                Ok(TurnOutcome::NotTaken)
            }
            Some(ItemEffect::EquipToggle) => {
                let events = self.inventory.toggle_equip(index);
                self.log_equip_events(events);
                Ok(TurnOutcome::Taken)
            }
            Some(effect) => {
                let outcome = self.apply_effect(effect, input)?;
                if outcome == ActionOutcome::Completed {
                    self.inventory.remove(index);
                    self.statistics.items_used += 1;
                    debug!("Used {}", name);
                }
                Ok(outcome.into())
            }
        }
    }

    /// Drops the inventory entry at `index` under the player.
    pub fn drop_item(&mut self, index: usize) -> BurrowResult<TurnOutcome> {
        if self.inventory.get(index).is_none() {
            self.log.add("There is no such item.", Color::WHITE);
            return Ok(TurnOutcome::NotTaken);
        }
        let events = self.inventory.dequip(index);
        self.log_equip_events(events);

        let here = self.player_position()?;
        let Some(mut entity) = self.inventory.remove(index) else {
            return Ok(TurnOutcome::NotTaken);
        };
        entity.position = here;
        let name = entity.name.clone();
        self.region.entities.insert_back(entity);
        self.log.add(format!("You dropped a {}.", name), Color::YELLOW);
        Ok(TurnOutcome::Taken)
    }

    /// Takes the stairs to the next dungeon level if the player stands on them.
    pub fn descend(&mut self) -> BurrowResult<TurnOutcome> {
        let WorldMode::Dungeon { depth } = self.world else {
            return Ok(TurnOutcome::NotTaken);
        };
        if self.region.exit_position() != Some(self.player_position()?) {
            self.log.add("There are no stairs here.", Color::WHITE);
            return Ok(TurnOutcome::NotTaken);
        }

        self.log.add(
            "You take a moment to rest, and recover your strength.",
            Color::LIGHT_VIOLET,
        );
        let half = self.effective_max_hp(self.player_id)? / 2;
        self.heal(self.player_id, half)?;
        self.log.add(
            "After a rare moment of peace, you descend deeper into the heart of the dungeon...",
            Color::RED,
        );

        let next_depth = depth + 1;
        let next = DungeonGenerator::new(next_depth).generate(&self.generation, &mut self.rng)?;
        let spawn = next.spawn;
        self.swap_region(next, spawn)?;
        self.world = WorldMode::Dungeon { depth: next_depth };
        self.statistics.deepest_level = self.statistics.deepest_level.max(next_depth);

        info!("Descended to depth {}", next_depth);
        Ok(TurnOutcome::Taken)
    }

    /// Closest living monster in view within `max_range` of the player.
    pub fn closest_visible_monster(&self, max_range: f64) -> Option<EntityId> {
        let player = self.player().ok()?;
        self.region
            .entities
            .iter()
            .filter(|entity| {
                entity.id != self.player_id
                    && entity.is_alive()
                    && self.visibility.is_visible(entity.position)
            })
            .map(|entity| (entity.id, player.distance_to(entity)))
            .filter(|(_, distance)| *distance <= max_range)
            .fold(None, |best: Option<(EntityId, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .map(|(id, _)| id)
    }

    fn apply_effect(
        &mut self,
        effect: ItemEffect,
        input: &mut dyn InputSource,
    ) -> BurrowResult<ActionOutcome> {
        match effect {
            ItemEffect::Heal { amount } => self.cast_heal(amount),
            ItemEffect::RangedStrike { damage, range } => self.cast_lightning(damage, range),
            ItemEffect::AreaBurst { damage, radius } => self.cast_fireball(damage, radius, input),
            ItemEffect::Confuse { range, turns } => self.cast_confuse(range, turns, input),
            ItemEffect::EquipToggle => Ok(ActionOutcome::Cancelled),
        }
    }

    fn cast_heal(&mut self, amount: i32) -> BurrowResult<ActionOutcome> {
        let hp = self.player()?.fighter.as_ref().map(|f| f.hp).unwrap_or(0);
        if hp >= self.effective_max_hp(self.player_id)? {
            self.log.add("You are already at full health.", Color::RED);
            return Ok(ActionOutcome::Cancelled);
        }
        self.log
            .add("Your wounds start to feel better!", Color::LIGHT_VIOLET);
        self.heal(self.player_id, amount)?;
        Ok(ActionOutcome::Completed)
    }

    fn cast_lightning(&mut self, damage: i32, range: f64) -> BurrowResult<ActionOutcome> {
        let Some(target) = self.closest_visible_monster(range) else {
            self.log
                .add("No enemy is close enough to strike.", Color::RED);
            return Ok(ActionOutcome::Cancelled);
        };
        let name = self.entity(target)?.name.clone();
        self.log.add(
            format!(
                "A lightning bolt strikes the {} with a loud thunder! The damage is {} hit points.",
                name, damage
            ),
            Color::LIGHT_CYAN,
        );
        self.take_damage(target, damage)?;
        Ok(ActionOutcome::Completed)
    }

    fn cast_fireball(
        &mut self,
        damage: i32,
        radius: f64,
        input: &mut dyn InputSource,
    ) -> BurrowResult<ActionOutcome> {
        self.log.add(
            "Choose a target tile for the fireball, or cancel.",
            Color::LIGHT_CYAN,
        );
        let center = match input.target_tile(self, None) {
            TargetReply::Cancel => return Ok(ActionOutcome::Cancelled),
            TargetReply::Selected(pos) => match self.validate_tile_target(pos) {
                Ok(pos) => pos,
                Err(err) => return self.reject_target(err),
            },
        };

        self.log.add(
            format!(
                "The fireball explodes, burning everything within {} tiles!",
                radius
            ),
            Color::ORANGE,
        );
        let victims: Vec<EntityId> = self
            .region
            .entities
            .iter()
            .filter(|entity| entity.is_alive() && entity.distance(center) <= radius)
            .map(|entity| entity.id)
            .collect();
        for id in victims {
            let name = self.entity(id)?.name.clone();
            self.log.add(
                format!("The {} gets burned for {} hit points.", name, damage),
                Color::ORANGE,
            );
            self.take_damage(id, damage)?;
        }
        Ok(ActionOutcome::Completed)
    }

    fn cast_confuse(
        &mut self,
        range: f64,
        turns: u32,
        input: &mut dyn InputSource,
    ) -> BurrowResult<ActionOutcome> {
        self.log.add(
            "Choose an enemy to confuse, or cancel.",
            Color::LIGHT_CYAN,
        );
        let target = match input.target_entity(self, Some(range)) {
            TargetReply::Cancel => return Ok(ActionOutcome::Cancelled),
            TargetReply::Selected(id) => match self.validate_monster_target(id, range) {
                Ok(id) => id,
                Err(err) => return self.reject_target(err),
            },
        };

        let entity = self.entity_mut(target)?;
        let previous = entity.ai.take().unwrap_or(AiBehavior::Basic);
        entity.ai = Some(AiBehavior::confused(previous, turns));
        let name = entity.name.clone();
        self.log.add(
            format!(
                "The eyes of the {} look vacant, as it starts to stumble around!",
                name
            ),
            Color::LIGHT_GREEN,
        );
        Ok(ActionOutcome::Completed)
    }

    /// A tile target must be on the grid and in view.
    fn validate_tile_target(&self, pos: Position) -> BurrowResult<Position> {
        if !self.region.grid.in_bounds(pos) || !self.visibility.is_visible(pos) {
            return Err(BurrowError::InvalidTarget(
                "You cannot see that spot.".to_string(),
            ));
        }
        Ok(pos)
    }

    /// A monster target must be a living, visible, acting creature in range.
    fn validate_monster_target(&self, id: EntityId, range: f64) -> BurrowResult<EntityId> {
        let invalid = |reason: &str| Err(BurrowError::InvalidTarget(reason.to_string()));
        if id == self.player_id {
            return invalid("You cannot target yourself.");
        }
        let Some(entity) = self.region.entities.get(id) else {
            return invalid("There is nothing there.");
        };
        if !entity.is_alive() || entity.ai.is_none() {
            return invalid("That is not a monster.");
        }
        if !self.visibility.is_visible(entity.position) {
            return invalid("You cannot see that.");
        }
        if self.player()?.distance_to(entity) > range {
            return invalid("That is out of range.");
        }
        Ok(id)
    }

    fn reject_target(&mut self, err: BurrowError) -> BurrowResult<ActionOutcome> {
        match err {
            BurrowError::InvalidTarget(reason) => {
                self.log.add(reason, Color::RED);
                Ok(ActionOutcome::Cancelled)
            }
            other => Err(other),
        }
    }

    fn log_equip_events(&mut self, events: Vec<EquipEvent>) {
        for event in events {
            match event {
                EquipEvent::Equipped { name, slot } => self.log.add(
                    format!("Equipped {} on {}.", name, slot),
                    Color::LIGHT_GREEN,
                ),
                EquipEvent::Dequipped { name, slot } => self.log.add(
                    format!("Dequipped {} from {}.", name, slot),
                    Color::LIGHT_YELLOW,
                ),
            }
        }
    }
}
