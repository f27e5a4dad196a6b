//! Development tools, only included with `cargo run --features dev`.
//!
//! World inspector, collider gizmos, and keys to spawn or wipe enemies.
//! This module is stripped from release builds.

use avian2d::prelude::PhysicsDebugPlugin;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::gameplay::Dead;
use crate::gameplay::arena::SpawnPoint;
use crate::gameplay::enemy::{Enemy, EnemyStats, spawn_enemy};
use crate::gameplay::player::PlayerHead;
use crate::menus::Menu;
use crate::screens::GameState;

/// F2 spawns one grunt at the first spawn point, outside the spawner's cap.
fn debug_spawn_enemy(
    keyboard: Res<ButtonInput<KeyCode>>,
    spawn_points: Query<(Entity, &Transform, &SpawnPoint)>,
    anchor: Option<Single<Entity, With<PlayerHead>>>,
    mut commands: Commands,
) {
    if !keyboard.just_pressed(KeyCode::F2) {
        return;
    }
    let Some(anchor) = anchor else {
        warn!("debug spawn: no player head");
        return;
    };
    let Some((_, transform, spawn_point)) = spawn_points.iter().min_by_key(|(entity, ..)| *entity)
    else {
        warn!("debug spawn: no spawn points");
        return;
    };
    let enemy = spawn_enemy(
        &mut commands,
        &EnemyStats::grunt(),
        transform.translation.truncate(),
        *anchor,
        spawn_point.cover,
    );
    debug!("debug spawned enemy {enemy:?}");
}

/// F3 kills every living enemy through the normal death path.
fn debug_kill_enemies(
    keyboard: Res<ButtonInput<KeyCode>>,
    enemies: Query<Entity, (With<Enemy>, Without<Dead>)>,
    mut commands: Commands,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }
    for enemy in &enemies {
        commands.entity(enemy).try_insert(Dead);
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        EguiPlugin::default(),
        WorldInspectorPlugin::new(),
        PhysicsDebugPlugin::default(),
    ));
    app.add_systems(
        Update,
        (debug_spawn_enemy, debug_kill_enemies)
            .in_set(crate::GameSet::Input)
            .run_if(in_state(GameState::InGame).and(in_state(Menu::None))),
    );
}
