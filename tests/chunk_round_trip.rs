//! Integration tests for crossing open-world chunk edges.

use burrow::{
    ChunkCoord, Direction, EntityId, GameConfig, GameState, Location, PlayerCommand, Position,
    Region, ScriptedInput, TurnOutcome, WorldMode,
};

fn layout(region: &Region) -> Vec<(Position, bool, char)> {
    region
        .grid
        .positions()
        .filter_map(|pos| region.grid.get(pos).map(|tile| (pos, tile.blocked, tile.glyph)))
        .collect()
}

fn others(region: &Region, player: EntityId) -> Vec<(EntityId, Position)> {
    region
        .entities
        .iter()
        .filter(|entity| entity.id != player)
        .map(|entity| (entity.id, entity.position))
        .collect()
}

#[test]
fn test_walking_out_and_back_restores_the_chunk() {
    let mut state =
        GameState::new(&GameConfig::overworld(31337)).expect("Failed to start an open-world game");
    let player = state.player_id;
    let row = state.region.spawn.y;
    let last_column = state.region.grid.width() - 1;
    state
        .entity_mut(player)
        .expect("Player missing")
        .position = Position::new(last_column, row);

    let home_layout = layout(&state.region);
    let home_entities = others(&state.region, player);
    let mut input = ScriptedInput::new();

    let outcome = state
        .play_turn(PlayerCommand::Move(Direction::East), &mut input)
        .expect("Crossing east failed");
    assert_ne!(outcome, TurnOutcome::NotTaken);
    assert_eq!(state.region.coordinates, ChunkCoord::new(1, 0));
    assert_eq!(state.location(), Location::Distance(1));

    // Monsters at home stay frozen while the player is away.
    match &state.world {
        WorldMode::Overworld(chunks) => {
            let home = chunks.get(ChunkCoord::origin()).expect("Home chunk not cached");
            assert_eq!(others(home, player), home_entities);
        }
        WorldMode::Dungeon { .. } => panic!("expected the open world"),
    }

    let arrival = state.player_position().expect("Player missing");
    assert_eq!(arrival.x, 0);

    let outcome = state
        .play_turn(PlayerCommand::Move(Direction::West), &mut input)
        .expect("Crossing west failed");
    assert_ne!(outcome, TurnOutcome::NotTaken);
    assert_eq!(state.region.coordinates, ChunkCoord::origin());
    assert_eq!(
        state.player_position().expect("Player missing"),
        Position::new(last_column, arrival.y)
    );
    assert_eq!(layout(&state.region), home_layout);
    assert_eq!(state.location(), Location::Distance(0));
}

#[test]
fn test_distance_grows_with_both_axes() {
    let mut state =
        GameState::new(&GameConfig::overworld(55)).expect("Failed to start an open-world game");
    let player = state.player_id;
    let mut input = ScriptedInput::new();

    state.entity_mut(player).expect("Player missing").position = Position::new(0, 0);
    state
        .play_turn(PlayerCommand::Move(Direction::Northwest), &mut input)
        .expect("Corner crossing failed");

    assert_eq!(state.region.coordinates, ChunkCoord::new(-1, 1));
    assert_eq!(state.location(), Location::Distance(2));
    let (w, h) = (state.region.grid.width(), state.region.grid.height());
    assert_eq!(
        state.player_position().expect("Player missing"),
        Position::new(w - 1, h - 1)
    );
}

#[test]
fn test_dungeon_edges_are_walls() {
    let mut state = GameState::new(&GameConfig::dungeon(3)).expect("Failed to start a dungeon");
    let before = state.region.coordinates;
    let player = state.player_id;
    state.entity_mut(player).expect("Player missing").position = Position::new(0, 0);

    let outcome = state
        .play_turn(PlayerCommand::Move(Direction::West), &mut ScriptedInput::new())
        .expect("Tick failed");
    assert_eq!(outcome, TurnOutcome::NotTaken);
    assert_eq!(state.region.coordinates, before);
}

#[test]
fn test_new_open_world_games_can_always_move() {
    for seed in [6, 7, 31, 45] {
        let mut state =
            GameState::new(&GameConfig::overworld(seed)).expect("Failed to start an open-world game");
        let mut input = ScriptedInput::new();
        let moved = Direction::all().into_iter().any(|direction| {
            state
                .play_turn(PlayerCommand::Move(direction), &mut input)
                .expect("Tick failed")
                != TurnOutcome::NotTaken
        });
        assert!(moved, "seed {} starts boxed in", seed);
    }
}
