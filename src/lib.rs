//! Arena shooter combat core: enemies, weapons, projectiles, damage, and session flow.

#[cfg(feature = "dev")]
mod dev_tools;
pub mod gameplay;
pub mod menus;
pub mod screens;
pub mod session;
#[cfg(test)]
pub mod testing;
pub mod theme;
pub mod third_party;

use avian2d::prelude::PhysicsSystems;
use bevy::prelude::*;

pub use screens::GameState;

// === Z-Layer Constants ===

/// Arena floor and wall sprites.
pub const Z_ARENA: f32 = 0.0;

/// Props and cover markers.
pub const Z_PROP: f32 = 1.0;

/// Player and enemies.
pub const Z_ACTOR: f32 = 2.0;

/// Projectiles in flight.
pub const Z_PROJECTILE: f32 = 3.0;

/// Short-lived impact and blood effects.
pub const Z_EFFECT: f32 = 4.0;

// === System Sets ===

/// Ordered gameplay phases.
///
/// `Input` and `Ui` run in `Update`. The simulation phases run in
/// `FixedUpdate` (`Ai` through `Spawning`) and `FixedPostUpdate`
/// (`Contacts` through `Death`, once avian has stepped and written back
/// positions and collision messages).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Keyboard and mouse sampling for the player.
    Input,
    /// Enemy behavior loop: engagement, rotation, shoot scheduling, flinch.
    Ai,
    /// Fire requests pass the rate gate and become projectiles.
    Weapons,
    /// Navigation paths and velocity steering.
    Movement,
    /// Projectile lifetime expiry.
    Projectiles,
    /// Enemy population management.
    Spawning,
    /// Collision messages become projectile contacts and are resolved.
    Contacts,
    /// `TakeDamage` messages are applied to recipients.
    Damage,
    /// Zero-crossing handling for player and enemies.
    Death,
    /// HUD text and presentation sinks.
    Ui,
}

/// Run condition: a match is in progress and no menu overlay is open.
pub fn gameplay_running(
    game_state: Option<Res<State<GameState>>>,
    menu: Option<Res<State<menus::Menu>>>,
) -> bool {
    let in_game = game_state.is_some_and(|state| *state.get() == GameState::InGame);
    let no_menu = menu.is_none_or(|menu| *menu.get() == menus::Menu::None);
    in_game && no_menu
}

// === Plugin ===

/// Orders the gameplay phases around the physics step.
pub(crate) fn configure_game_sets(app: &mut App) {
    app.configure_sets(Update, (GameSet::Input, GameSet::Ui).chain());
    app.configure_sets(
        FixedUpdate,
        (
            GameSet::Ai,
            GameSet::Weapons,
            GameSet::Movement,
            GameSet::Projectiles,
            GameSet::Spawning,
        )
            .chain(),
    );
    app.configure_sets(
        FixedPostUpdate,
        (GameSet::Contacts, GameSet::Damage, GameSet::Death)
            .chain()
            .after(PhysicsSystems::Writeback),
    );
}

pub fn plugin(app: &mut App) {
    configure_game_sets(app);
    app.add_plugins((
        third_party::plugin,
        theme::plugin,
        screens::plugin,
        menus::plugin,
        session::plugin,
        gameplay::plugin,
    ));

    #[cfg(feature = "dev")]
    app.add_plugins(dev_tools::plugin);
}
