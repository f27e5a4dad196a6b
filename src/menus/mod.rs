//! Menu screens and overlays.
//!
//! The title and game-over panels follow `GameState`. The pause overlay is
//! the `Menu` state, which is orthogonal to `GameState` and only opens
//! during a run.

mod game_over;
mod pause;
mod title;

use bevy::prelude::*;

/// Menu overlay states. Orthogonal to `GameState`.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[states(scoped_entities)]
pub enum Menu {
    /// No menu overlay is active.
    #[default]
    None,
    /// Pause menu (shown in-game).
    Pause,
}

pub fn plugin(app: &mut App) {
    app.init_state::<Menu>();
    app.add_plugins((title::plugin, pause::plugin, game_over::plugin));

    // Stopping virtual time also stops the fixed schedules, so physics,
    // shoot loops and the spawner all hold while a menu is open.
    app.add_systems(OnExit(Menu::None), pause_virtual_time);
    app.add_systems(OnEnter(Menu::None), unpause_virtual_time);
}

fn pause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn unpause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}
