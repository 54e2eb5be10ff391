//! # Item Generation
//!
//! Item kinds, their spawn weights by depth, and the constructors that turn a
//! kind into a map entity.

use crate::{
    config, from_metric, Color, Entity, Equipment, Item, ItemEffect, Position, RandomTable, Slot,
};
use serde::{Deserialize, Serialize};

/// Upper bound of items per room, by depth or distance.
const MAX_ITEMS_PER_ROOM: [(u32, u32); 2] = [(1, 1), (2, 4)];

/// Every kind of item that can appear on the map or in the starting kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealingPotion,
    LightningScroll,
    FireballScroll,
    ConfusionScroll,
    Dagger,
    Sword,
    Shield,
    Helmet,
    ChainMail,
    BeltOfHolding,
}

impl ItemKind {
    /// Builds the map entity for this kind at `position`.
    pub fn spawn(self, position: Position) -> Entity {
        let scroll = |name: &str, effect: ItemEffect| {
            Entity::new(position, '?', name, Color::LIGHT_YELLOW, false).with_item(Item::new(effect))
        };
        let gear = |glyph: char, name: &str, color: Color, equipment: Equipment| {
            Entity::new(position, glyph, name, color, false).with_equipment(equipment)
        };

        match self {
            ItemKind::HealingPotion => {
                Entity::new(position, '!', "healing potion", Color::VIOLET, false).with_item(
                    Item::new(ItemEffect::Heal {
                        amount: config::HEAL_AMOUNT,
                    }),
                )
            }
            ItemKind::LightningScroll => scroll(
                "scroll of lightning bolt",
                ItemEffect::RangedStrike {
                    damage: config::LIGHTNING_DAMAGE,
                    range: config::LIGHTNING_RANGE,
                },
            ),
            ItemKind::FireballScroll => scroll(
                "scroll of fireball",
                ItemEffect::AreaBurst {
                    damage: config::FIREBALL_DAMAGE,
                    radius: config::FIREBALL_RADIUS,
                },
            ),
            ItemKind::ConfusionScroll => scroll(
                "scroll of confusion",
                ItemEffect::Confuse {
                    range: config::CONFUSE_RANGE,
                    turns: config::CONFUSE_NUM_TURNS,
                },
            ),
            ItemKind::Dagger => gear('-', "dagger", Color::SKY, Equipment::new(Slot::RightHand).power(2)),
            ItemKind::Sword => gear('/', "sword", Color::SKY, Equipment::new(Slot::RightHand).power(3)),
            ItemKind::Shield => gear(
                '[',
                "shield",
                Color::DARKER_ORANGE,
                Equipment::new(Slot::LeftHand).defense(1),
            ),
            ItemKind::Helmet => gear(
                '^',
                "helmet",
                Color::BROWN,
                Equipment::new(Slot::Head).defense(1).max_hp(5),
            ),
            ItemKind::ChainMail => gear(
                '&',
                "chain mail",
                Color::GREY,
                Equipment::new(Slot::Torso).defense(2),
            ),
            ItemKind::BeltOfHolding => gear(
                '=',
                "belt of holding",
                Color::BROWN,
                Equipment::new(Slot::Legs).inventory(6),
            ),
        }
    }
}

/// Weighted item table for a depth or distance metric.
pub fn item_table(metric: u32) -> RandomTable<ItemKind> {
    RandomTable::new()
        .add(ItemKind::HealingPotion, 35)
        .add(ItemKind::LightningScroll, from_metric(&[(25, 4)], metric))
        .add(ItemKind::FireballScroll, from_metric(&[(25, 6)], metric))
        .add(ItemKind::ConfusionScroll, from_metric(&[(10, 2)], metric))
        .add(ItemKind::Sword, from_metric(&[(5, 4)], metric))
        .add(ItemKind::Shield, from_metric(&[(15, 8)], metric))
        .add(ItemKind::Helmet, from_metric(&[(10, 3)], metric))
        .add(ItemKind::ChainMail, from_metric(&[(8, 5)], metric))
        .add(ItemKind::BeltOfHolding, from_metric(&[(6, 2)], metric))
}

/// Most items a single room may receive.
pub fn max_items(metric: u32) -> u32 {
    from_metric(&MAX_ITEMS_PER_ROOM, metric)
}

/// What a new player carries: a dagger in hand.
pub fn starting_kit() -> Vec<ItemKind> {
    vec![ItemKind::Dagger]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_equipment_kinds_are_items() {
        for kind in [ItemKind::Dagger, ItemKind::Sword, ItemKind::BeltOfHolding] {
            let entity = kind.spawn(Position::new(3, 3));
            assert!(entity.equipment.is_some());
            assert_eq!(entity.item, Some(Item::new(ItemEffect::EquipToggle)));
            assert!(!entity.blocks);
        }
    }

    #[test]
    fn test_shallow_levels_only_have_potions() {
        let table = item_table(1);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(table.choose(&mut rng), Some(&ItemKind::HealingPotion));
        }
        assert_eq!(max_items(1), 1);
        assert_eq!(max_items(0), 0);
    }

    #[test]
    fn test_deep_levels_unlock_everything() {
        let table = item_table(8);
        assert_eq!(table.total_weight(), 35 + 25 + 25 + 10 + 5 + 15 + 10 + 8 + 6);
        assert_eq!(max_items(8), 2);
    }
}
