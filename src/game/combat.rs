//! # Combat Resolver
//!
//! Derived stats, attacks, and the single hit point mutation path.
//!
//! Effective stats are always computed on demand from the fighter's base values
//! plus whatever the owner has equipped at that moment; nothing is cached.

use crate::{
    capitalize, BurrowError, BurrowResult, Color, DeathKind, EntityId, EquipmentBonus, Fighter,
    GameState, GameStatus,
};
use log::{debug, info};

impl GameState {
    /// Bonuses from the owner's equipped gear. Only the player carries gear.
    fn equipment_bonus(&self, owner: EntityId) -> EquipmentBonus {
        if owner == self.player_id {
            self.inventory.bonuses()
        } else {
            EquipmentBonus::default()
        }
    }

    fn fighter(&self, id: EntityId) -> BurrowResult<&Fighter> {
        self.entity(id)?
            .fighter
            .as_ref()
            .ok_or_else(|| BurrowError::InvalidState(format!("Entity {} cannot fight", id)))
    }

    pub fn effective_power(&self, id: EntityId) -> BurrowResult<i32> {
        Ok(self.fighter(id)?.base_power + self.equipment_bonus(id).power)
    }

    pub fn effective_defense(&self, id: EntityId) -> BurrowResult<i32> {
        Ok(self.fighter(id)?.base_defense + self.equipment_bonus(id).defense)
    }

    pub fn effective_max_hp(&self, id: EntityId) -> BurrowResult<i32> {
        Ok(self.fighter(id)?.base_max_hp + self.equipment_bonus(id).max_hp)
    }

    pub fn effective_inventory_capacity(&self, id: EntityId) -> BurrowResult<i32> {
        Ok(self.fighter(id)?.base_inventory_capacity + self.equipment_bonus(id).inventory)
    }

    /// Resolves one melee attack and returns the computed damage.
    ///
    /// Damage is power minus defense; zero or less leaves the defender untouched.
    pub fn attack(&mut self, attacker: EntityId, defender: EntityId) -> BurrowResult<i32> {
        let damage = self.effective_power(attacker)? - self.effective_defense(defender)?;
        let attacker_name = capitalize(&self.entity(attacker)?.name);
        let defender_name = self.entity(defender)?.name.clone();

        if damage > 0 {
            self.log.add(
                format!(
                    "{} attacks {} for {} hit points.",
                    attacker_name, defender_name, damage
                ),
                Color::WHITE,
            );
            self.take_damage(defender, damage)?;
        } else {
            self.log.add(
                format!(
                    "{} attacks {} but it has no effect!",
                    attacker_name, defender_name
                ),
                Color::WHITE,
            );
        }
        Ok(damage)
    }

    /// Removes hit points. The death transition fires only on the hit that
    /// takes a living fighter to zero or below.
    pub fn take_damage(&mut self, target: EntityId, amount: i32) -> BurrowResult<()> {
        let entity = self.entity_mut(target)?;
        let Some(fighter) = entity.fighter.as_mut() else {
            return Ok(());
        };
        if amount <= 0 {
            return Ok(());
        }

        let was_alive = fighter.hp > 0;
        fighter.hp -= amount;
        let (dead, death) = (fighter.hp <= 0, fighter.death);
        debug!("{} takes {} damage, hp now {}", entity.name, amount, fighter.hp);

        if was_alive && dead {
            match death {
                DeathKind::Player => self.player_death(target)?,
                DeathKind::Monster => self.monster_death(target)?,
            }
        }
        Ok(())
    }

    /// Restores hit points, never beyond the effective maximum.
    pub fn heal(&mut self, target: EntityId, amount: i32) -> BurrowResult<()> {
        let max_hp = self.effective_max_hp(target)?;
        if let Some(fighter) = self.entity_mut(target)?.fighter.as_mut() {
            fighter.hp = (fighter.hp + amount).min(max_hp);
        }
        Ok(())
    }

    fn player_death(&mut self, target: EntityId) -> BurrowResult<()> {
        let entity = self.entity_mut(target)?;
        entity.glyph = '%';
        entity.color = Color::DARK_RED;
        self.status = GameStatus::Dead;
        self.log.add("You died!", Color::RED);
        info!("Player died on turn {}", self.turn_number);
        Ok(())
    }

    fn monster_death(&mut self, target: EntityId) -> BurrowResult<()> {
        let entity = self.entity_mut(target)?;
        let xp = entity.fighter.as_ref().map(|f| f.xp).unwrap_or(0);
        let name = entity.name.clone();

        entity.glyph = '%';
        entity.color = Color::DARK_RED;
        entity.blocks = false;
        entity.fighter = None;
        entity.ai = None;
        entity.name = format!("remains of {}", name);
        self.region.entities.send_to_back(target);

        let mut awarded = 0;
        if target != self.player_id {
            if let Some(fighter) = self.entity_mut(self.player_id)?.fighter.as_mut() {
                fighter.xp += xp;
                awarded = xp;
            }
        }

        let message = if awarded > 0 {
            format!("The {} is dead! You gain {} experience points.", name, awarded)
        } else {
            format!("The {} is dead!", name)
        };
        self.log.add(message, Color::ORANGE);
        self.statistics.monsters_slain += 1;
        debug!("{} died, {} xp awarded", name, awarded);
        Ok(())
    }
}
