//! # Inventory
//!
//! The player's pack. Entities in here have been removed from the map; moving
//! between the two is always a transfer of ownership.

use crate::{BurrowError, BurrowResult, Entity, Slot};
use serde::{Deserialize, Serialize};

/// Summed bonuses of everything currently equipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquipmentBonus {
    pub power: i32,
    pub defense: i32,
    pub max_hp: i32,
    pub inventory: i32,
}

/// A change in what is worn, reported so the caller can log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipEvent {
    Equipped { name: String, slot: Slot },
    Dequipped { name: String, slot: Slot },
}

/// Ordered list of carried entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Entity>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter()
    }

    /// Fails with `InventoryFull` when `capacity` slots are already taken.
    pub fn ensure_room(&self, capacity: i32, incoming: &str) -> BurrowResult<()> {
        if self.items.len() as i64 >= capacity.max(0) as i64 {
            return Err(BurrowError::InventoryFull(format!(
                "Your inventory is full, cannot pick up {}.",
                incoming
            )));
        }
        Ok(())
    }

    /// Adds an entity. Callers check [`Inventory::ensure_room`] first.
    pub fn push(&mut self, entity: Entity) -> usize {
        self.items.push(entity);
        self.items.len() - 1
    }

    /// Removes and returns the entity at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Entity> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Index of the item worn in `slot`.
    pub fn equipped_in(&self, slot: Slot) -> Option<usize> {
        self.items.iter().position(|entity| {
            entity
                .equipment
                .as_ref()
                .map(|e| e.is_equipped && e.slot == slot)
                .unwrap_or(false)
        })
    }

    /// Equips the item at `index`, first taking off whatever holds its slot.
    pub fn equip(&mut self, index: usize) -> Vec<EquipEvent> {
        let mut events = Vec::new();
        let slot = match self.items.get(index).and_then(|e| e.equipment.as_ref()) {
            Some(equipment) if !equipment.is_equipped => equipment.slot,
            _ => return events,
        };

        if let Some(current) = self.equipped_in(slot) {
            events.extend(self.dequip(current));
        }

        let entity = &mut self.items[index];
        if let Some(equipment) = entity.equipment.as_mut() {
            equipment.is_equipped = true;
            events.push(EquipEvent::Equipped {
                name: entity.name.clone(),
                slot,
            });
        }
        events
    }

    /// Takes off the item at `index` if it is worn.
    pub fn dequip(&mut self, index: usize) -> Vec<EquipEvent> {
        let Some(entity) = self.items.get_mut(index) else {
            return Vec::new();
        };
        match entity.equipment.as_mut() {
            Some(equipment) if equipment.is_equipped => {
                equipment.is_equipped = false;
                vec![EquipEvent::Dequipped {
                    name: entity.name.clone(),
                    slot: equipment.slot,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Equips or takes off the item at `index`.
    pub fn toggle_equip(&mut self, index: usize) -> Vec<EquipEvent> {
        let equipped = self
            .items
            .get(index)
            .and_then(|e| e.equipment.as_ref())
            .map(|e| e.is_equipped);
        match equipped {
            Some(true) => self.dequip(index),
            Some(false) => self.equip(index),
            None => Vec::new(),
        }
    }

    /// Sum of the bonuses of every equipped item.
    pub fn bonuses(&self) -> EquipmentBonus {
        self.items
            .iter()
            .filter_map(|entity| entity.equipment.as_ref())
            .filter(|equipment| equipment.is_equipped)
            .fold(EquipmentBonus::default(), |acc, e| EquipmentBonus {
                power: acc.power + e.power_bonus,
                defense: acc.defense + e.defense_bonus,
                max_hp: acc.max_hp + e.max_hp_bonus,
                inventory: acc.inventory + e.inventory_bonus,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Equipment, Position};
    use proptest::prelude::*;

    fn gear(name: &str, slot: Slot, power: i32) -> Entity {
        Entity::new(Position::origin(), '/', name, Color::SKY, false)
            .with_equipment(Equipment::new(slot).power(power))
    }

    fn equipped_count(inventory: &Inventory, slot: Slot) -> usize {
        inventory
            .iter()
            .filter_map(|e| e.equipment.as_ref())
            .filter(|e| e.is_equipped && e.slot == slot)
            .count()
    }

    #[test]
    fn test_equip_replaces_slot_occupant() {
        let mut inventory = Inventory::new();
        inventory.push(gear("dagger", Slot::RightHand, 2));
        inventory.push(gear("sword", Slot::RightHand, 3));

        inventory.equip(0);
        let events = inventory.equip(1);

        assert_eq!(
            events,
            vec![
                EquipEvent::Dequipped {
                    name: "dagger".to_string(),
                    slot: Slot::RightHand
                },
                EquipEvent::Equipped {
                    name: "sword".to_string(),
                    slot: Slot::RightHand
                },
            ]
        );
        assert_eq!(inventory.equipped_in(Slot::RightHand), Some(1));
        assert_eq!(inventory.bonuses().power, 3);
    }

    #[test]
    fn test_room_check() {
        let mut inventory = Inventory::new();
        inventory.push(gear("dagger", Slot::RightHand, 2));
        assert!(inventory.ensure_room(2, "rock").is_ok());
        let err = inventory.ensure_room(1, "rock").unwrap_err();
        assert!(matches!(err, BurrowError::InventoryFull(_)));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_bonuses_only_count_equipped() {
        let mut inventory = Inventory::new();
        inventory.push(gear("helmet", Slot::Head, 0));
        inventory.push(gear("sword", Slot::RightHand, 3));
        assert_eq!(inventory.bonuses(), EquipmentBonus::default());
        inventory.toggle_equip(1);
        assert_eq!(inventory.bonuses().power, 3);
        inventory.toggle_equip(1);
        assert_eq!(inventory.bonuses().power, 0);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_equipped_per_slot(ops in proptest::collection::vec((0usize..6, any::<bool>()), 0..40)) {
            let slots = [Slot::Head, Slot::RightHand, Slot::RightHand, Slot::LeftHand, Slot::Head, Slot::Legs];
            let mut inventory = Inventory::new();
            for (i, slot) in slots.iter().enumerate() {
                inventory.push(gear(&format!("item {}", i), *slot, 1));
            }
            for (index, toggle) in ops {
                if toggle {
                    inventory.toggle_equip(index);
                } else {
                    inventory.equip(index);
                }
                for slot in [Slot::Head, Slot::Torso, Slot::Legs, Slot::LeftHand, Slot::RightHand] {
                    prop_assert!(equipped_count(&inventory, slot) <= 1);
                }
            }
        }
    }
}
