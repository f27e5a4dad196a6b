//! Third-party plugin isolation.

mod avian;
mod vleue_navigator;

pub use avian::{
    CollisionLayer, ProjectileHooks, enemy_layers, player_body_layers, player_hurtbox_layers,
    projectile_layers, prop_layers, world_layers,
};
pub use self::vleue_navigator::{NavObstacle, spawn_navmesh};

#[cfg(test)]
pub(crate) use avian::plugin as physics_plugin;

pub fn plugin(app: &mut bevy::prelude::App) {
    app.add_plugins((avian::plugin, vleue_navigator::plugin));
}
