//! # Monster AI
//!
//! One `take_turn` per AI-holding entity per player turn, in entity table
//! order. Monsters never leave the active region except by fleeing over its
//! edge, which removes them from the simulation.

use crate::{
    config, next_step, AiBehavior, BurrowResult, Color, Direction, EntityId, GameState,
    GameStatus, Position,
};
use log::debug;
use rand::seq::SliceRandom;

/// Where a single step left the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepResult {
    Moved,
    Blocked,
    Fled,
}

impl GameState {
    /// Gives every monster its turn. Stops as soon as the player dies.
    pub(crate) fn run_ai(&mut self) -> BurrowResult<()> {
        for id in self.region.entities.ids() {
            if self.status == GameStatus::Dead {
                break;
            }
            if id == self.player_id {
                continue;
            }
            // Entities that fled or died earlier this phase have nothing left to do.
            let Some(ai) = self.region.entities.get(id).and_then(|e| e.ai.clone()) else {
                continue;
            };
            self.take_turn(id, ai)?;
        }
        Ok(())
    }

    fn take_turn(&mut self, id: EntityId, ai: AiBehavior) -> BurrowResult<()> {
        match ai {
            AiBehavior::Basic => self.basic_turn(id),
            AiBehavior::Skittish => self.skittish_turn(id),
            AiBehavior::Confused {
                previous,
                turns_remaining,
            } => self.confused_turn(id, *previous, turns_remaining),
        }
    }

    /// Closes in while in view, attacks once adjacent.
    fn basic_turn(&mut self, id: EntityId) -> BurrowResult<()> {
        let here = self.entity(id)?.position;
        if !self.visibility.is_visible(here) {
            return Ok(());
        }

        let player = self.player()?;
        let (target, player_alive) = (player.position, player.is_alive());
        if here.euclidean_distance(target) >= 2.0 {
            self.approach(id, here, target)?;
        } else if player_alive {
            self.attack(id, self.player_id)?;
        }
        Ok(())
    }

    /// Runs to whichever neighbour puts the most room between it and the player.
    fn skittish_turn(&mut self, id: EntityId) -> BurrowResult<()> {
        let here = self.entity(id)?.position;
        let threat = self.player_position()?;
        let current = here.euclidean_distance(threat);
        if current >= config::SKITTISH_RANGE {
            return Ok(());
        }

        let best = here
            .adjacent_positions()
            .into_iter()
            .filter(|&pos| !self.region.grid.in_bounds(pos) || !self.region.is_blocked(pos))
            .map(|pos| (pos, pos.euclidean_distance(threat)))
            .filter(|&(_, distance)| distance > current)
            .max_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((pos, _)) = best {
            self.move_entity(id, pos - here)?;
        }
        Ok(())
    }

    /// Stumbles in a random direction, then counts down towards recovery.
    fn confused_turn(
        &mut self,
        id: EntityId,
        previous: AiBehavior,
        turns_remaining: u32,
    ) -> BurrowResult<()> {
        if turns_remaining > 0 {
            let direction = Direction::all()
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Direction::North);
            if self.move_entity(id, direction.to_delta())? == StepResult::Fled {
                return Ok(());
            }
        }

        let remaining = turns_remaining.saturating_sub(1);
        let entity = self.entity_mut(id)?;
        if remaining == 0 {
            entity.ai = Some(previous);
            let message = format!("The {} is no longer confused!", entity.name);
            self.log.add(message, Color::RED);
        } else {
            entity.ai = Some(AiBehavior::confused(previous, remaining));
        }
        Ok(())
    }

    /// One step along the shortest path, or straight at the target when the
    /// path is missing or too long.
    fn approach(&mut self, id: EntityId, from: Position, target: Position) -> BurrowResult<()> {
        let step = next_step(from, target, config::MAX_PATH_LENGTH, |pos| {
            !self.region.is_blocked(pos)
        });
        match step {
            Some(step) if step != target => {
                self.move_entity(id, step - from)?;
            }
            _ => self.move_towards(id, from, target)?,
        }
        Ok(())
    }

    fn move_towards(&mut self, id: EntityId, from: Position, target: Position) -> BurrowResult<()> {
        let delta = target - from;
        let distance = from.euclidean_distance(target);
        if distance == 0.0 {
            return Ok(());
        }
        let step = Position::new(
            (delta.x as f64 / distance).round() as i32,
            (delta.y as f64 / distance).round() as i32,
        );
        self.move_entity(id, step)?;
        Ok(())
    }

    /// Moves a non-player entity by `delta`. Leaving the grid means fleeing.
    fn move_entity(&mut self, id: EntityId, delta: Position) -> BurrowResult<StepResult> {
        let target = self.entity(id)?.position + delta;

        if !self.region.grid.in_bounds(target) {
            if let Some(entity) = self.region.entities.remove(id) {
                self.log.add(
                    format!("The {} flees beyond your sight.", entity.name),
                    Color::LIGHT_YELLOW,
                );
                debug!("{} left the region at ({}, {})", entity.name, target.x, target.y);
            }
            return Ok(StepResult::Fled);
        }

        if self.region.is_blocked(target) {
            return Ok(StepResult::Blocked);
        }
        self.entity_mut(id)?.position = target;
        Ok(StepResult::Moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{arena, spawn_monster};
    use crate::{DeathKind, Entity, Fighter, Grid, Tile};

    fn spawn_deer(state: &mut GameState, pos: Position) -> EntityId {
        state.region.entities.insert(
            Entity::new(pos, 'd', "deer", Color::BROWN, true)
                .with_fighter(Fighter::new(10, 0, 0, 10, DeathKind::Monster))
                .with_ai(AiBehavior::Skittish),
        )
    }

    #[test]
    fn test_basic_ai_approaches_then_attacks() {
        let mut state = arena();
        let orc = spawn_monster(&mut state, Position::new(9, 5), 20, 0, 5);

        state.run_ai().unwrap();
        assert_eq!(state.entity(orc).unwrap().position.x, 8);

        state.entity_mut(orc).unwrap().position = Position::new(6, 6);
        state.run_ai().unwrap();
        // Power 5 against the player's defense 1.
        assert_eq!(state.player().unwrap().fighter.as_ref().unwrap().hp, 96);
        assert_eq!(state.entity(orc).unwrap().position, Position::new(6, 6));
    }

    #[test]
    fn test_basic_ai_waits_out_of_sight() {
        let mut state = arena();
        let orc = spawn_monster(&mut state, Position::new(17, 17), 20, 0, 5);
        state.fov_radius = 3;
        state.fov_dirty = true;
        state.refresh_fov();

        state.run_ai().unwrap();
        assert_eq!(state.entity(orc).unwrap().position, Position::new(17, 17));
    }

    #[test]
    fn test_basic_ai_stops_when_player_dies() {
        let mut state = arena();
        let player = state.player_id;
        state.entity_mut(player).unwrap().fighter.as_mut().unwrap().hp = 3;
        spawn_monster(&mut state, Position::new(6, 5), 20, 0, 5);
        spawn_monster(&mut state, Position::new(4, 5), 20, 0, 5);

        state.run_ai().unwrap();
        assert_eq!(state.status, GameStatus::Dead);
        let hits = state.log.iter().filter(|m| m.text.contains("attacks player")).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_confusion_wears_off_after_exact_turns() {
        let mut state = arena();
        let orc = spawn_monster(&mut state, Position::new(10, 10), 20, 0, 5);
        state.entity_mut(orc).unwrap().ai = Some(AiBehavior::confused(
            AiBehavior::Basic,
            config::CONFUSE_NUM_TURNS,
        ));

        for _ in 0..config::CONFUSE_NUM_TURNS - 1 {
            state.run_ai().unwrap();
            assert!(matches!(
                state.entity(orc).unwrap().ai,
                Some(AiBehavior::Confused { .. })
            ));
        }
        state.run_ai().unwrap();
        assert_eq!(state.entity(orc).unwrap().ai, Some(AiBehavior::Basic));
        assert!(state.log.contains("The orc is no longer confused!"));
    }

    #[test]
    fn test_skittish_runs_away() {
        let mut state = arena();
        let deer = spawn_deer(&mut state, Position::new(7, 5));

        state.run_ai().unwrap();
        let pos = state.entity(deer).unwrap().position;
        assert_eq!(pos.x, 8);
        assert!(pos.euclidean_distance(Position::new(5, 5)) > 2.0);
    }

    #[test]
    fn test_skittish_ignores_distant_player() {
        let mut state = arena();
        let deer = spawn_deer(&mut state, Position::new(15, 5));
        state.run_ai().unwrap();
        assert_eq!(state.entity(deer).unwrap().position, Position::new(15, 5));
    }

    #[test]
    fn test_skittish_flees_off_the_grid() {
        let mut state = arena();
        state.region.grid = Grid::filled(10, 10, Tile::floor());
        state.visibility = crate::VisibilityMap::for_grid(&state.region.grid);
        let player = state.player_id;
        state.entity_mut(player).unwrap().position = Position::new(6, 3);
        let deer = spawn_deer(&mut state, Position::new(9, 3));

        state.run_ai().unwrap();
        assert!(!state.region.entities.contains(deer));
        assert!(state.log.contains("The deer flees"));
    }
}
