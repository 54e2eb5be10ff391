//! # Command Definitions
//!
//! The primitive commands the simulation consumes, and the default key map
//! that front ends can use to produce them.

use crate::{Direction, EntityId, Position};
use serde::{Deserialize, Serialize};

/// Answer to a targeting prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetReply<T> {
    Selected(T),
    Cancel,
}

/// One inbound command from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Step, attack the occupant of the target cell, or cross a chunk edge
    Move(Direction),
    /// Pick up the item under the player
    PickUp,
    /// Ask the input source which item to use
    OpenInventoryToUse,
    /// Ask the input source which item to drop
    OpenInventoryToDrop,
    /// Use the inventory entry at this index
    UseItem(usize),
    /// Drop the inventory entry at this index
    DropItem(usize),
    /// Take the stairs if standing on them
    DescendIfOnExit,
    /// Show the character sheet; never takes a turn
    ShowCharacterInfo,
    /// Answer to a tile prompt
    TargetTile(TargetReply<Position>),
    /// Answer to an entity prompt
    TargetEntity(TargetReply<EntityId>),
}

impl PlayerCommand {
    /// Maps a key to a command using vi-style movement keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Direction, PlayerCommand};
    ///
    /// assert_eq!(PlayerCommand::from_key('k'), Some(PlayerCommand::Move(Direction::North)));
    /// assert_eq!(PlayerCommand::from_key('g'), Some(PlayerCommand::PickUp));
    /// assert_eq!(PlayerCommand::from_key('Q'), None);
    /// ```
    pub fn from_key(key: char) -> Option<PlayerCommand> {
        let command = match key {
            'h' => PlayerCommand::Move(Direction::West),
            'j' => PlayerCommand::Move(Direction::South),
            'k' => PlayerCommand::Move(Direction::North),
            'l' => PlayerCommand::Move(Direction::East),
            'y' => PlayerCommand::Move(Direction::Northwest),
            'u' => PlayerCommand::Move(Direction::Northeast),
            'b' => PlayerCommand::Move(Direction::Southwest),
            'n' => PlayerCommand::Move(Direction::Southeast),
            'g' | ',' => PlayerCommand::PickUp,
            'i' => PlayerCommand::OpenInventoryToUse,
            'd' => PlayerCommand::OpenInventoryToDrop,
            '>' => PlayerCommand::DescendIfOnExit,
            'c' => PlayerCommand::ShowCharacterInfo,
            _ => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vi_keys_cover_all_directions() {
        let mut directions: Vec<Direction> = "hjklyubn"
            .chars()
            .filter_map(PlayerCommand::from_key)
            .filter_map(|command| match command {
                PlayerCommand::Move(direction) => Some(direction),
                _ => None,
            })
            .collect();
        directions.dedup();
        assert_eq!(directions.len(), Direction::all().len());
    }

    #[test]
    fn test_command_serializes() {
        let command = PlayerCommand::TargetTile(TargetReply::Selected(Position::new(3, 4)));
        let json = serde_json::to_string(&command).unwrap();
        let back: PlayerCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
