//! # Encounter Generation
//!
//! Monster species, the player template, and the placement routine that
//! scatters monsters and items over a generated area.

use crate::{
    config, from_metric, item_table, max_items, AiBehavior, Biome, Color, DeathKind, Entity,
    Fighter, Position, RandomTable, Region, Room,
};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound of monsters per room, by depth or distance.
const MAX_MONSTERS_PER_ROOM: [(u32, u32); 3] = [(2, 1), (3, 4), (5, 6)];

/// Every monster species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Orc,
    Troll,
    Deer,
}

impl MonsterKind {
    /// Builds the map entity for this species at `position`.
    pub fn spawn(self, position: Position) -> Entity {
        match self {
            MonsterKind::Orc => Entity::new(position, 'o', "orc", Color::DESATURATED_GREEN, true)
                .with_fighter(Fighter::new(20, 0, 4, 35, DeathKind::Monster))
                .with_ai(AiBehavior::Basic),
            MonsterKind::Troll => Entity::new(position, 'T', "troll", Color::DARKER_GREEN, true)
                .with_fighter(Fighter::new(30, 2, 8, 100, DeathKind::Monster))
                .with_ai(AiBehavior::Basic),
            MonsterKind::Deer => Entity::new(position, 'd', "deer", Color::BROWN, true)
                .with_fighter(Fighter::new(10, 0, 0, 10, DeathKind::Monster))
                .with_ai(AiBehavior::Skittish),
        }
    }
}

/// Weighted monster table for a depth or distance metric.
pub fn monster_table(metric: u32, biome: Biome) -> RandomTable<MonsterKind> {
    let deer = match biome {
        Biome::Overworld => 40,
        Biome::Dungeon => 0,
    };
    RandomTable::new()
        .add(MonsterKind::Orc, 80)
        .add(MonsterKind::Troll, from_metric(&[(15, 3), (30, 5), (60, 7)], metric))
        .add(MonsterKind::Deer, deer)
}

/// Most monsters a single room may receive.
pub fn max_monsters(metric: u32) -> u32 {
    from_metric(&MAX_MONSTERS_PER_ROOM, metric)
}

/// A fresh player standing at `position`.
pub fn new_player(position: Position) -> Entity {
    Entity::new(position, '@', "player", Color::WHITE, true)
        .with_fighter(
            Fighter::new(100, 1, 2, 0, DeathKind::Player)
                .with_inventory_capacity(config::PLAYER_INVENTORY_CAPACITY),
        )
        .always_visible()
}

/// Scatters monsters and items over the interior of `area`.
///
/// Each candidate position is sampled independently and dropped when the cell
/// is blocked by terrain or a blocking entity, or is the `reserved` arrival
/// point of the player.
pub fn populate(
    region: &mut Region,
    area: &Room,
    metric: u32,
    biome: Biome,
    reserved: Option<Position>,
    rng: &mut StdRng,
) {
    if area.x2 - area.x1 < 2 || area.y2 - area.y1 < 2 {
        return;
    }
    let sample = |rng: &mut StdRng| {
        Position::new(
            rng.gen_range(area.x1 + 1..area.x2),
            rng.gen_range(area.y1 + 1..area.y2),
        )
    };

    let monsters = monster_table(metric, biome);
    let monster_count = rng.gen_range(0..=max_monsters(metric));
    let mut placed_monsters = 0;
    for _ in 0..monster_count {
        let pos = sample(rng);
        if region.is_blocked(pos) || Some(pos) == reserved {
            continue;
        }
        if let Some(kind) = monsters.choose(rng) {
            region.entities.insert(kind.spawn(pos));
            placed_monsters += 1;
        }
    }

    let items = item_table(metric);
    let item_count = rng.gen_range(0..=max_items(metric));
    let mut placed_items = 0;
    for _ in 0..item_count {
        let pos = sample(rng);
        if region.is_blocked(pos) {
            continue;
        }
        if let Some(kind) = items.choose(rng) {
            region.entities.insert(kind.spawn(pos));
            placed_items += 1;
        }
    }

    debug!(
        "Populated area at ({}, {}): {} monsters, {} items",
        area.x1, area.y1, placed_monsters, placed_items
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkCoord, Grid, Tile};
    use rand::SeedableRng;

    #[test]
    fn test_deer_only_outdoors() {
        let dungeon = monster_table(10, Biome::Dungeon);
        let overworld = monster_table(10, Biome::Overworld);
        assert_eq!(overworld.total_weight() - dungeon.total_weight(), 40);
    }

    #[test]
    fn test_trolls_scale_with_depth() {
        assert_eq!(monster_table(1, Biome::Dungeon).total_weight(), 80);
        assert_eq!(monster_table(3, Biome::Dungeon).total_weight(), 95);
        assert_eq!(monster_table(7, Biome::Dungeon).total_weight(), 140);
        assert_eq!(max_monsters(0), 0);
        assert_eq!(max_monsters(5), 3);
    }

    #[test]
    fn test_player_template() {
        let player = new_player(Position::new(1, 2));
        let fighter = player.fighter.as_ref().unwrap();
        assert_eq!(fighter.hp, 100);
        assert_eq!(fighter.base_defense, 1);
        assert_eq!(fighter.base_power, 2);
        assert_eq!(fighter.base_inventory_capacity, config::PLAYER_INVENTORY_CAPACITY);
        assert_eq!(fighter.death, DeathKind::Player);
        assert!(player.ai.is_none());
    }

    #[test]
    fn test_populate_respects_blocking_and_reservation() {
        let mut rng = StdRng::seed_from_u64(99);
        let area = Room::new(0, 0, 5, 5);
        for _ in 0..50 {
            let mut region = Region::new(
                ChunkCoord::default(),
                Grid::filled(5, 5, Tile::floor()),
                Position::new(2, 2),
            );
            // A pillar in the middle of the room.
            region.grid.set(Position::new(1, 1), Tile::wall()).unwrap();
            populate(&mut region, &area, 6, Biome::Dungeon, Some(Position::new(2, 2)), &mut rng);

            let mut blockers = std::collections::HashSet::new();
            for entity in region.entities.iter() {
                assert!(area.contains(entity.position));
                assert_ne!(entity.position, Position::new(1, 1));
                if entity.blocks {
                    assert_ne!(entity.position, Position::new(2, 2));
                    assert!(blockers.insert(entity.position), "two monsters share a cell");
                }
            }
        }
    }
}
