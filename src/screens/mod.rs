//! Top-level game flow: title, an active run, and the game-over screen.

use bevy::prelude::*;

use crate::menus::Menu;

/// Primary game state.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[states(scoped_entities)]
pub enum GameState {
    /// Start prompt. The arena is visible but nothing spawns.
    #[default]
    Title,
    /// A run is in progress.
    InGame,
    /// The player died; final stats are shown.
    GameOver,
}

/// Opens the pause menu during a run.
fn open_pause_menu(keyboard: Res<ButtonInput<KeyCode>>, mut next_menu: ResMut<NextState<Menu>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        next_menu.set(Menu::Pause);
    }
}

pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();
    app.add_systems(
        Update,
        open_pause_menu
            .in_set(crate::GameSet::Input)
            .run_if(in_state(GameState::InGame).and(in_state(Menu::None))),
    );
}
