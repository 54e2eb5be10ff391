//! # Entity Model
//!
//! Entities are positioned objects that carry optional capabilities rather than
//! belonging to a type hierarchy. A monster is an entity with a fighter and an
//! AI; a potion is an entity with an item; a sword is an entity with equipment
//! (and therefore an item). Capabilities never point back at their owner; the
//! owning entity is always reached through its [`EntityId`].

use crate::{new_entity_id, Color, EntityId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A positioned object with optional capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub glyph: char,
    pub name: String,
    pub color: Color,
    /// Whether other blocking entities can share the cell
    pub blocks: bool,
    /// Drawn on explored cells even when out of sight
    pub always_visible: bool,
    pub fighter: Option<Fighter>,
    pub ai: Option<AiBehavior>,
    pub item: Option<Item>,
    pub equipment: Option<Equipment>,
}

impl Entity {
    /// Creates a bare entity with no capabilities.
    pub fn new(position: Position, glyph: char, name: &str, color: Color, blocks: bool) -> Self {
        Self {
            id: new_entity_id(),
            position,
            glyph,
            name: name.to_string(),
            color,
            blocks,
            always_visible: false,
            fighter: None,
            ai: None,
            item: None,
            equipment: None,
        }
    }

    pub fn with_fighter(mut self, fighter: Fighter) -> Self {
        self.fighter = Some(fighter);
        self
    }

    pub fn with_ai(mut self, ai: AiBehavior) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    /// Attaches equipment; an equippable entity is always an item as well.
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = Some(equipment);
        if self.item.is_none() {
            self.item = Some(Item::new(ItemEffect::EquipToggle));
        }
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    /// Euclidean distance to another entity.
    pub fn distance_to(&self, other: &Entity) -> f64 {
        self.position.euclidean_distance(other.position)
    }

    /// Euclidean distance to a cell.
    pub fn distance(&self, pos: Position) -> f64 {
        self.position.euclidean_distance(pos)
    }

    /// Alive fighters are the only things that can be attacked.
    pub fn is_alive(&self) -> bool {
        self.fighter.as_ref().map(|f| f.hp > 0).unwrap_or(false)
    }
}

/// What happens when a fighter's hit points run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathKind {
    /// Ends the game
    Player,
    /// Leaves a corpse and awards experience
    Monster,
}

/// Combat capability. Effective values add equipment bonuses at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub base_max_hp: i32,
    pub hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    /// Experience carried; awarded to the player when a monster dies
    pub xp: i32,
    pub base_inventory_capacity: i32,
    pub death: DeathKind,
}

impl Fighter {
    /// A fighter at full health with no inventory.
    pub fn new(max_hp: i32, defense: i32, power: i32, xp: i32, death: DeathKind) -> Self {
        Self {
            base_max_hp: max_hp,
            hp: max_hp,
            base_defense: defense,
            base_power: power,
            xp,
            base_inventory_capacity: 0,
            death,
        }
    }

    pub fn with_inventory_capacity(mut self, capacity: i32) -> Self {
        self.base_inventory_capacity = capacity;
        self
    }
}

/// Effect triggered by using an item from the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Restore hit points to the user
    Heal { amount: i32 },
    /// Hit the closest visible monster within range
    RangedStrike { damage: i32, range: f64 },
    /// Damage every fighter around a chosen tile
    AreaBurst { damage: i32, radius: f64 },
    /// Make a chosen monster wander aimlessly
    Confuse { range: f64, turns: u32 },
    /// Equip or unequip
    EquipToggle,
}

/// Item capability: the entity can be picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub effect: Option<ItemEffect>,
}

impl Item {
    pub fn new(effect: ItemEffect) -> Self {
        Self {
            effect: Some(effect),
        }
    }
}

/// Body slot an equipment piece occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Head,
    Torso,
    Legs,
    LeftHand,
    RightHand,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Head => "head",
            Slot::Torso => "torso",
            Slot::Legs => "legs",
            Slot::LeftHand => "left hand",
            Slot::RightHand => "right hand",
        };
        f.write_str(name)
    }
}

/// Equipment capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub slot: Slot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
    pub max_hp_bonus: i32,
    pub inventory_bonus: i32,
    pub is_equipped: bool,
}

impl Equipment {
    /// Unequipped gear for `slot` with no bonuses.
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            power_bonus: 0,
            defense_bonus: 0,
            max_hp_bonus: 0,
            inventory_bonus: 0,
            is_equipped: false,
        }
    }

    pub fn power(mut self, bonus: i32) -> Self {
        self.power_bonus = bonus;
        self
    }

    pub fn defense(mut self, bonus: i32) -> Self {
        self.defense_bonus = bonus;
        self
    }

    pub fn max_hp(mut self, bonus: i32) -> Self {
        self.max_hp_bonus = bonus;
        self
    }

    pub fn inventory(mut self, bonus: i32) -> Self {
        self.inventory_bonus = bonus;
        self
    }
}

/// Monster behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Close in on the player and attack
    Basic,
    /// Run from the player when it gets near
    Skittish,
    /// Temporary random wandering wrapped around the real behavior
    Confused {
        previous: Box<AiBehavior>,
        turns_remaining: u32,
    },
}

impl AiBehavior {
    /// Wraps a behavior in a confusion lasting `turns` turns.
    pub fn confused(previous: AiBehavior, turns: u32) -> Self {
        AiBehavior::Confused {
            previous: Box::new(previous),
            turns_remaining: turns,
        }
    }
}

/// Authoritative table of the entities standing on one region.
///
/// Iteration follows insertion order; [`EntityTable::send_to_back`] moves an
/// entity to the front so it is drawn beneath everything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityTable {
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity at the end of the iteration order.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Adds an entity beneath all others.
    pub fn insert_back(&mut self, entity: Entity) -> EntityId {
        let id = self.insert(entity);
        self.send_to_back(id);
        id
    }

    /// Removes an entity, transferring ownership to the caller.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of the iteration order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Entities in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(move |id| self.entities.get(id))
    }

    /// Moves an entity to the front of the iteration order.
    pub fn send_to_back(&mut self, id: EntityId) {
        if let Some(index) = self.order.iter().position(|&other| other == id) {
            let id = self.order.remove(index);
            self.order.insert(0, id);
        }
    }

    /// First blocking entity on a cell.
    pub fn blocker_at(&self, pos: Position) -> Option<EntityId> {
        self.iter()
            .find(|entity| entity.blocks && entity.position == pos)
            .map(|entity| entity.id)
    }

    /// First living fighter on a cell.
    pub fn fighter_at(&self, pos: Position) -> Option<EntityId> {
        self.iter()
            .find(|entity| entity.position == pos && entity.is_alive())
            .map(|entity| entity.id)
    }

    /// First entity that can be picked up on a cell.
    pub fn item_at(&self, pos: Position) -> Option<EntityId> {
        self.iter()
            .find(|entity| entity.position == pos && entity.item.is_some())
            .map(|entity| entity.id)
    }
}
