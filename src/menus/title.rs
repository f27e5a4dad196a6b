//! Title panel: game name, start and quit.

use bevy::prelude::*;

use crate::screens::GameState;
use crate::theme::{palette, widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Title), spawn_title_menu);
    app.add_systems(
        Update,
        handle_title_input.run_if(in_state(GameState::Title)),
    );
}

fn spawn_title_menu(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Title Screen"),
        DespawnOnExit(GameState::Title),
        children![(
            widget::panel("Title Panel"),
            children![
                (
                    Text::new("Arena Shooter"),
                    TextFont::from_font_size(palette::FONT_SIZE_TITLE),
                    TextColor(palette::HEADER_TEXT),
                ),
                widget::prompt("WASD to move, mouse to aim, click or SPACE to fire"),
                widget::button(
                    "Start",
                    |_: On<Pointer<Click>>, mut next_game: ResMut<NextState<GameState>>| {
                        next_game.set(GameState::InGame);
                    },
                ),
                widget::button(
                    "Quit",
                    |_: On<Pointer<Click>>, mut exit: MessageWriter<AppExit>| {
                        exit.write(AppExit::Success);
                    },
                ),
                widget::prompt("Press ENTER to start"),
            ],
        )],
    ));
}

fn handle_title_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::InGame);
    }
}
