//! Pause overlay: resume or abandon the run.

use bevy::prelude::*;

use super::Menu;
use crate::screens::GameState;
use crate::theme::widget;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::Pause), spawn_pause_menu);
    app.add_systems(Update, handle_pause_input.run_if(in_state(Menu::Pause)));
    // Leaving the run by any path must not leave the overlay (and paused time) behind.
    app.add_systems(OnExit(GameState::InGame), close_menu);
}

fn spawn_pause_menu(mut commands: Commands) {
    commands.spawn((widget::overlay(), DespawnOnExit(Menu::Pause)));
    commands.spawn((
        widget::ui_root("Pause Menu"),
        DespawnOnExit(Menu::Pause),
        children![
            widget::header("PAUSED"),
            widget::button(
                "Resume",
                |_: On<Pointer<Click>>, mut next_menu: ResMut<NextState<Menu>>| {
                    next_menu.set(Menu::None);
                },
            ),
            widget::button(
                "Quit to Title",
                |_: On<Pointer<Click>>, mut next_game: ResMut<NextState<GameState>>| {
                    next_game.set(GameState::Title);
                },
            ),
            widget::prompt("Press ESC to Resume | Q to Quit"),
        ],
    ));
}

fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_menu: ResMut<NextState<Menu>>,
    mut next_game_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        next_menu.set(Menu::None);
    }
    if keyboard.just_pressed(KeyCode::KeyQ) {
        next_game_state.set(GameState::Title);
    }
}

fn close_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_entity_count, create_base_test_app, transition_to_ingame};
    use pretty_assertions::assert_eq;

    fn create_pause_test_app() -> App {
        let mut app = create_base_test_app();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_plugins(plugin);
        transition_to_ingame(&mut app);
        app.world_mut()
            .resource_mut::<NextState<Menu>>()
            .set(Menu::Pause);
        app.update();
        app
    }

    #[test]
    fn pause_spawns_overlay_with_buttons() {
        let mut app = create_pause_test_app();
        assert_entity_count::<With<Button>>(&mut app, 2);
    }

    #[test]
    fn escape_resumes() {
        let mut app = create_pause_test_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        app.update();

        assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::None);
        assert_entity_count::<With<Button>>(&mut app, 0);
    }

    #[test]
    fn q_quits_to_title_and_closes_menu() {
        let mut app = create_pause_test_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyQ);
        app.update();
        app.update();
        app.update();

        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Title
        );
        assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::None);
    }
}
