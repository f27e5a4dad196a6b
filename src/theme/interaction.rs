//! Hover and press feedback for menu buttons.

use bevy::picking::hover::Hovered;
use bevy::prelude::*;
use bevy::ui::Pressed;

/// Background colors for the idle, hovered and pressed button states.
#[derive(Component, Debug, Reflect)]
#[reflect(Component)]
#[require(Hovered)]
pub struct InteractionPalette {
    pub none: Color,
    pub hovered: Color,
    pub pressed: Color,
}

impl InteractionPalette {
    #[must_use]
    pub const fn pick(&self, pressed: bool, hovered: bool) -> Color {
        match (pressed, hovered) {
            (true, _) => self.pressed,
            (false, true) => self.hovered,
            (false, false) => self.none,
        }
    }
}

fn apply_interaction_palette(
    mut buttons: Query<
        (
            Has<Pressed>,
            &Hovered,
            &InteractionPalette,
            &mut BackgroundColor,
        ),
        Changed<Interaction>,
    >,
) {
    for (pressed, Hovered(hovered), palette, mut background) in &mut buttons {
        background.0 = palette.pick(pressed, *hovered);
    }
}

pub fn plugin(app: &mut App) {
    app.register_type::<InteractionPalette>();
    app.add_systems(Update, apply_interaction_palette);
}
