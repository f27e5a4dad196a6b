//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use bevy::app::FixedMain;
use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::GameState;
use crate::menus::Menu;

/// Creates a minimal app with state support and both state machines initialized.
pub fn create_base_test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    app.init_state::<Menu>();
    app
}

/// Switches time to fixed manual steps so every `update()` advances exactly `step`.
/// Runs one update to absorb the zero-delta first frame.
pub fn use_manual_time(app: &mut App, step: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    app.update();
}

/// Moves `GameState` to `InGame` and applies the transition.
pub fn transition_to_ingame(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

/// Counts entities matching `F` and asserts the total.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let mut query = app.world_mut().query_filtered::<Entity, F>();
    let count = query.iter(app.world()).count();
    assert_eq!(
        count,
        expected,
        "expected {expected} entities matching {}, found {count}",
        std::any::type_name::<F>()
    );
}

/// Drains and returns every message of type `M` written so far.
pub fn drain_messages<M: Message + Clone>(app: &mut App) -> Vec<M> {
    app.world_mut()
        .resource_mut::<Messages<M>>()
        .drain()
        .collect()
}

/// Writes a message directly into the world.
pub fn write_message<M: Message>(app: &mut App, message: M) {
    app.world_mut().write_message(message);
}

/// Sets elapsed to 1 nanosecond before the timer's duration so any positive
/// delta finishes it.
pub fn nearly_expire_timer(timer: &mut Timer) {
    let duration = timer.duration();
    timer.set_elapsed(duration - Duration::from_nanos(1));
}

/// Runs one pass of the fixed schedules (`FixedFirst` through `FixedLast`)
/// without touching the time accumulator. For systems that don't read time.
pub fn advance_fixed(app: &mut App) {
    app.world_mut().run_schedule(FixedMain);
}
