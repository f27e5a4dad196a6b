//! Game-over panel: final run stats, the high score, retry and quit.

use bevy::prelude::*;

use crate::gameplay::hud::format_elapsed;
use crate::screens::GameState;
use crate::session::SessionStats;
use crate::theme::{palette, widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::GameOver), spawn_game_over_menu);
    app.add_systems(
        Update,
        handle_game_over_input.run_if(in_state(GameState::GameOver)),
    );
}

#[must_use]
pub fn time_survived_line(stats: &SessionStats) -> String {
    format!("Time Survived: {}", format_elapsed(stats.elapsed_secs))
}

#[must_use]
pub fn enemies_defeated_line(stats: &SessionStats) -> String {
    format!("Enemies Defeated: {}", stats.kills)
}

#[must_use]
pub fn high_score_line(stats: &SessionStats) -> String {
    format!("High Score: {}", stats.high_score)
}

fn spawn_game_over_menu(mut commands: Commands, stats: Res<SessionStats>) {
    commands.spawn((widget::overlay(), DespawnOnExit(GameState::GameOver)));
    commands.spawn((
        widget::ui_root("Game Over Screen"),
        DespawnOnExit(GameState::GameOver),
        children![(
            widget::panel("Game Over Panel"),
            children![
                widget::header("Game Over"),
                widget::label(time_survived_line(&stats)),
                widget::label(enemies_defeated_line(&stats)),
                (
                    Text::new(high_score_line(&stats)),
                    TextFont::from_font_size(palette::FONT_SIZE_LABEL),
                    TextColor(palette::SCORE_TEXT),
                ),
                widget::button(
                    "Retry",
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
                widget::prompt("Press ENTER to retry"),
            ],
        )],
    ));
}

fn handle_game_over_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::InGame);
    }
}
