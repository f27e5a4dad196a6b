//! In-game HUD: health readout, bleeding overlays, survival time, and kills.

use bevy::prelude::*;

use super::player::{BLEEDING_STEPS, PlayerVitals};
use crate::session::SessionStats;
use crate::theme::palette;
use crate::{GameSet, GameState};

/// Peak alpha of one bleeding overlay layer. Layers stack as the step rises.
const BLEEDING_LAYER_ALPHA: f32 = 0.18;

// === Components ===

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HealthDisplay;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ElapsedTimeDisplay;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KillCountDisplay;

/// One full-screen bleeding layer. Layer `n` shows from bleeding step `n + 1`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BleedingOverlay(pub u8);

// === Formatting ===

/// `mm:ss`, truncating partial seconds.
#[must_use]
pub fn format_elapsed(secs: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total_secs = secs.max(0.0) as u32;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[must_use]
pub fn health_label(fraction: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
    format!("Health: {percent}%")
}

/// Red at zero health, white at full.
#[must_use]
pub fn health_color(fraction: f32) -> Color {
    let f = fraction.clamp(0.0, 1.0);
    Color::srgb(1.0, f, f)
}

#[must_use]
pub const fn bleeding_layer_visible(layer: u8, vitals: &PlayerVitals) -> bool {
    vitals.alive && layer < vitals.bleeding
}

// === Systems ===

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HUD"),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(12.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
        children![
            (
                HealthDisplay,
                Text::new(health_label(1.0)),
                TextFont::from_font_size(palette::FONT_SIZE_HUD),
                TextColor(health_color(1.0)),
            ),
            (
                ElapsedTimeDisplay,
                Text::new(format_elapsed(0.0)),
                TextFont::from_font_size(palette::FONT_SIZE_HUD),
                TextColor(palette::BODY_TEXT),
            ),
            (
                KillCountDisplay,
                Text::new("Kills: 0"),
                TextFont::from_font_size(palette::FONT_SIZE_HUD),
                TextColor(palette::BODY_TEXT),
            ),
        ],
    ));

    for layer in 0..BLEEDING_STEPS {
        commands.spawn((
            Name::new(format!("Bleeding Overlay {}", layer + 1)),
            BleedingOverlay(layer),
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            BackgroundColor(palette::BLEEDING.with_alpha(BLEEDING_LAYER_ALPHA)),
            Visibility::Hidden,
            Pickable::IGNORE,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn update_health_display(
    vitals: Res<PlayerVitals>,
    display: Option<Single<(&mut Text, &mut TextColor), With<HealthDisplay>>>,
) {
    let Some(mut display) = display else {
        return;
    };
    let (text, color) = &mut *display;
    ***text = health_label(vitals.health);
    color.0 = health_color(vitals.health);
}

fn update_bleeding_overlays(
    vitals: Res<PlayerVitals>,
    mut overlays: Query<(&BleedingOverlay, &mut Visibility)>,
) {
    for (overlay, mut visibility) in &mut overlays {
        *visibility = if bleeding_layer_visible(overlay.0, &vitals) {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

fn update_session_displays(
    stats: Res<SessionStats>,
    mut elapsed: Query<&mut Text, (With<ElapsedTimeDisplay>, Without<KillCountDisplay>)>,
    mut kills: Query<&mut Text, (With<KillCountDisplay>, Without<ElapsedTimeDisplay>)>,
) {
    for mut text in &mut elapsed {
        **text = format_elapsed(stats.elapsed_secs);
    }
    for mut text in &mut kills {
        **text = format!("Kills: {}", stats.kills);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HealthDisplay>()
        .register_type::<ElapsedTimeDisplay>()
        .register_type::<KillCountDisplay>()
        .register_type::<BleedingOverlay>();

    app.add_systems(OnEnter(GameState::InGame), spawn_hud);
    app.add_systems(
        Update,
        (
            update_health_display.run_if(resource_changed::<PlayerVitals>),
            update_bleeding_overlays.run_if(resource_changed::<PlayerVitals>),
            update_session_displays.run_if(resource_changed::<SessionStats>),
        )
            .in_set(GameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}
