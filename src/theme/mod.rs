//! Look of the menus and HUD: palette tokens, widget builders and button
//! hover feedback. Owns the window backdrop color.

use bevy::prelude::*;

pub mod interaction;
pub mod palette;
pub mod widget;

pub use interaction::InteractionPalette;

pub fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(palette::ARENA_BACKDROP));
    app.add_plugins(interaction::plugin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::any::TypeId;

    #[test]
    fn plugin_sets_backdrop_and_button_feedback() {
        let mut app = App::new();
        app.add_plugins(plugin);

        assert_eq!(app.world().resource::<ClearColor>().0, palette::ARENA_BACKDROP);
        assert!(
            app.world()
                .resource::<AppTypeRegistry>()
                .read()
                .contains(TypeId::of::<InteractionPalette>())
        );
    }
}
