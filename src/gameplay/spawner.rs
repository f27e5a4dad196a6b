//! Enemy population: a fixed spawn cadence over round-robin spawn points, capped.

use bevy::prelude::*;

use super::arena::SpawnPoint;
use super::enemy::{Enemy, EnemyStats, spawn_enemy};
use super::player::PlayerHead;
use super::Dead;
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Seconds between spawns while active.
pub const SPAWN_INTERVAL_SECS: f32 = 3.0;

/// Live enemies never exceed this.
pub const MAX_ENEMIES: usize = 10;

// === Resources ===

/// Spawner state. Tracks the enemies it created so `Reset` can clear them.
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct EnemySpawner {
    pub active: bool,
    /// Seconds accumulated toward the next spawn.
    pub since_last_spawn: f32,
    /// Handles of spawned enemies. May contain stale handles until the next purge.
    pub enemies: Vec<Entity>,
    /// Index of the next spawn point.
    pub cursor: usize,
}

impl EnemySpawner {
    /// Drops handles that no longer resolve to a living enemy.
    fn purge(&mut self, alive: &Query<(), (With<Enemy>, Without<Dead>)>) {
        self.enemies.retain(|&enemy| alive.contains(enemy));
    }

    /// Advances the accumulator. Returns true when a spawn slot opens.
    fn tick(&mut self, delta_secs: f32) -> bool {
        self.since_last_spawn += delta_secs;
        if self.since_last_spawn < SPAWN_INTERVAL_SECS {
            return false;
        }
        self.since_last_spawn = 0.0;
        true
    }
}

// === Messages ===

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerCommand {
    /// Start or stop spawning. Stopping purges dead handles but keeps survivors.
    SetActive(bool),
    /// Despawn every tracked enemy and prime the next spawn to happen at once.
    Reset,
}

// === Systems ===

fn apply_spawner_commands(
    mut commands_in: MessageReader<SpawnerCommand>,
    mut spawner: ResMut<EnemySpawner>,
    alive: Query<(), (With<Enemy>, Without<Dead>)>,
    mut commands: Commands,
) {
    for command in commands_in.read() {
        match *command {
            SpawnerCommand::SetActive(active) => {
                spawner.active = active;
                if !active {
                    spawner.purge(&alive);
                }
                debug!("spawner active: {active}");
            }
            SpawnerCommand::Reset => {
                for enemy in spawner.enemies.drain(..) {
                    commands.entity(enemy).try_despawn();
                }
                spawner.since_last_spawn = SPAWN_INTERVAL_SECS;
                spawner.cursor = 0;
                debug!("spawner reset");
            }
        }
    }
}

fn tick_spawner(
    time: Res<Time>,
    mut spawner: ResMut<EnemySpawner>,
    alive: Query<(), (With<Enemy>, Without<Dead>)>,
    spawn_points: Query<(Entity, &Transform, &SpawnPoint)>,
    anchor: Option<Single<Entity, With<PlayerHead>>>,
    mut commands: Commands,
) {
    if !spawner.active {
        return;
    }
    spawner.purge(&alive);
    if !spawner.tick(time.delta_secs()) || spawner.enemies.len() >= MAX_ENEMIES {
        return;
    }

    let Some(anchor) = anchor else {
        warn!("no player head anchor; skipping enemy spawn");
        return;
    };
    let mut points: Vec<_> = spawn_points.iter().collect();
    if points.is_empty() {
        warn!("no spawn points; skipping enemy spawn");
        return;
    }
    points.sort_by_key(|(entity, ..)| *entity);

    let (_, transform, spawn_point) = points[spawner.cursor % points.len()];
    spawner.cursor = (spawner.cursor + 1) % points.len();
    let enemy = spawn_enemy(
        &mut commands,
        &EnemyStats::grunt(),
        transform.translation.truncate(),
        *anchor,
        spawn_point.cover,
    );
    spawner.enemies.push(enemy);
    info!("spawned enemy {enemy:?} ({} alive)", spawner.enemies.len());
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<EnemySpawner>()
        .init_resource::<EnemySpawner>()
        .add_message::<SpawnerCommand>();

    app.add_systems(
        FixedUpdate,
        (
            apply_spawner_commands,
            tick_spawner.run_if(gameplay_running),
        )
            .chain()
            .in_set(GameSet::Spawning),
    );
}
