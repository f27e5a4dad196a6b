//! Session flow through the public plugins, without rendering or physics.

use std::time::Duration;

use arena_shooter::GameState;
use arena_shooter::gameplay::player::PlayerInput;
use arena_shooter::gameplay::spawner::SpawnerCommand;
use arena_shooter::menus::Menu;
use arena_shooter::session::{EnemyKilled, HighScoreStore, PlayerDied, SessionStats};
use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use pretty_assertions::assert_eq;

fn create_session_app(store: HighScoreStore) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, InputPlugin));
    app.insert_resource(store)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
        .init_resource::<PlayerInput>()
        .add_message::<SpawnerCommand>();
    app.add_plugins((
        arena_shooter::theme::plugin,
        arena_shooter::screens::plugin,
        arena_shooter::menus::plugin,
        arena_shooter::session::plugin,
    ));
    app.update();
    app
}

fn set_state(app: &mut App, state: GameState) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(state);
    app.update();
}

fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn spawner_commands(app: &mut App) -> Vec<SpawnerCommand> {
    app.world_mut()
        .resource_mut::<Messages<SpawnerCommand>>()
        .drain()
        .collect()
}

fn kill_enemies(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().write_message(EnemyKilled {
            enemy: Entity::PLACEHOLDER,
        });
    }
    app.update();
}

fn temp_store(name: &str) -> HighScoreStore {
    let path = std::env::temp_dir().join(format!(
        "arena-shooter-it-{name}-{}.ron",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    HighScoreStore { path: Some(path) }
}

#[test]
fn game_starts_on_title() {
    let app = create_session_app(HighScoreStore::in_memory());
    assert_eq!(current_state(&app), GameState::Title);
}

#[test]
fn run_then_death_reaches_game_over() {
    let mut app = create_session_app(HighScoreStore::in_memory());
    set_state(&mut app, GameState::InGame);
    assert_eq!(
        spawner_commands(&mut app),
        vec![SpawnerCommand::Reset, SpawnerCommand::SetActive(true)]
    );

    kill_enemies(&mut app, 2);
    assert_eq!(app.world().resource::<SessionStats>().kills, 2);

    app.world_mut().write_message(PlayerDied);
    app.update();
    app.update();

    assert_eq!(current_state(&app), GameState::GameOver);
    let commands = spawner_commands(&mut app);
    assert!(commands.contains(&SpawnerCommand::Reset));
    assert_eq!(commands.last(), Some(&SpawnerCommand::SetActive(false)));
}

#[test]
fn retry_resets_kills_but_keeps_high_score() {
    let mut app = create_session_app(HighScoreStore::in_memory());
    set_state(&mut app, GameState::InGame);
    kill_enemies(&mut app, 3);

    app.world_mut().write_message(PlayerDied);
    app.update();
    app.update();
    set_state(&mut app, GameState::InGame);

    let stats = *app.world().resource::<SessionStats>();
    assert_eq!(stats.kills, 0);
    assert_eq!(stats.high_score, 3);
}

#[test]
fn pause_holds_virtual_time() {
    let mut app = create_session_app(HighScoreStore::in_memory());
    set_state(&mut app, GameState::InGame);

    app.world_mut()
        .resource_mut::<NextState<Menu>>()
        .set(Menu::Pause);
    app.update();
    assert!(app.world().resource::<Time<Virtual>>().is_paused());

    set_state(&mut app, GameState::Title);
    app.update();
    assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::None);
    assert!(!app.world().resource::<Time<Virtual>>().is_paused());
}

#[test]
fn high_score_persists_across_launches() {
    let store = temp_store("persist");
    let path = store.path.clone().unwrap();

    let mut first = create_session_app(store.clone());
    set_state(&mut first, GameState::InGame);
    kill_enemies(&mut first, 4);
    assert_eq!(first.world().resource::<SessionStats>().high_score, 4);

    let second = create_session_app(store);
    assert_eq!(second.world().resource::<SessionStats>().high_score, 4);
    let _ = std::fs::remove_file(path);
}
