//! Save and load round trips through the filesystem.

use burrow::{
    AutoPlayer, BurrowError, Direction, GameConfig, GameState, PlayerCommand, ScriptedInput,
    TurnOutcome,
};
use tempfile::tempdir;

fn played(seed: u64, turns: usize) -> GameState {
    let mut state = GameState::new(&GameConfig::dungeon(seed)).expect("Failed to start a game");
    let mut auto = AutoPlayer::new(seed);
    for _ in 0..turns {
        let command = auto.next_command(&state);
        if state.play_turn(command, &mut auto).expect("Tick failed") == TurnOutcome::GameOver {
            break;
        }
    }
    state
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("burrow.json");
    let state = played(61, 60);

    state.save_to_path(&path).expect("Save failed");
    let loaded = GameState::load_from_path(&path).expect("Load failed");

    assert_eq!(loaded.summary().unwrap(), state.summary().unwrap());
    assert_eq!(loaded.player_id, state.player_id);
    assert_eq!(loaded.inventory.len(), state.inventory.len());
    assert_eq!(loaded.statistics, state.statistics);
    assert_eq!(loaded.region.grid, state.region.grid);
    assert_eq!(loaded.region.entities.ids(), state.region.entities.ids());

    let texts = |s: &GameState| s.log.iter().map(|m| m.text.clone()).collect::<Vec<_>>();
    assert_eq!(texts(&loaded), texts(&state));
}

#[test]
fn test_loaded_game_keeps_playing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("burrow.json");
    played(62, 10).save_to_path(&path).expect("Save failed");

    let mut loaded = GameState::load_from_path(&path).expect("Load failed");
    let mut input = ScriptedInput::new();
    for direction in Direction::all() {
        loaded
            .play_turn(PlayerCommand::Move(direction), &mut input)
            .expect("Tick after load failed");
    }
}

#[test]
fn test_missing_save_is_none() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(GameState::load_or_none(&dir.path().join("nothing.json")).is_none());
}

#[test]
fn test_corrupt_save_is_a_load_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"region\": 12").expect("Failed to write file");

    match GameState::load_from_path(&path) {
        Err(BurrowError::LoadFailure(_)) => {}
        other => panic!("expected a load failure, got {:?}", other.map(|_| ())),
    }
}
