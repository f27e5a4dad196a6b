//! Match lifecycle: starting a run, counting kills, the game-over transition,
//! and the persisted high score.

mod high_score;

pub use high_score::{HIGH_SCORE_PATH, HighScoreError, HighScoreFile, HighScoreStore};

use bevy::prelude::*;

use crate::gameplay::enemy::Enemy;
use crate::gameplay::player::{Player, reset_player};
use crate::gameplay::spawner::SpawnerCommand;
use crate::gameplay::Dead;
use crate::{GameSet, GameState, gameplay_running};

// === Resources ===

/// Per-run statistics plus the best kill count seen so far.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SessionStats {
    pub kills: u32,
    /// Seconds the player has been alive in the current run.
    pub elapsed_secs: f32,
    pub high_score: u32,
}

impl SessionStats {
    /// Counts a kill. Returns true when it set a new high score.
    pub const fn register_kill(&mut self) -> bool {
        self.kills += 1;
        if self.kills > self.high_score {
            self.high_score = self.kills;
            return true;
        }
        false
    }

    /// Clears the run counters. The high score survives.
    pub const fn reset_run(&mut self) {
        self.kills = 0;
        self.elapsed_secs = 0.0;
    }
}

// === Messages ===

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyKilled {
    pub enemy: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied;

// === Systems ===

fn load_high_score(store: Res<HighScoreStore>, mut stats: ResMut<SessionStats>) {
    match store.load() {
        Ok(high_score) => {
            stats.high_score = high_score;
            info!("loaded high score {high_score}");
        }
        Err(err) => {
            stats.high_score = 0;
            warn!("{err}; starting from a high score of 0");
        }
    }
}

fn start_new_game(mut stats: ResMut<SessionStats>, mut spawner: MessageWriter<SpawnerCommand>) {
    spawner.write(SpawnerCommand::Reset);
    stats.reset_run();
    spawner.write(SpawnerCommand::SetActive(true));
    info!("new game started (high score {})", stats.high_score);
}

fn stop_spawning(mut spawner: MessageWriter<SpawnerCommand>) {
    spawner.write(SpawnerCommand::SetActive(false));
}

fn tick_session_clock(
    time: Res<Time>,
    player: Option<Single<(), (With<Player>, Without<Dead>)>>,
    mut stats: ResMut<SessionStats>,
) {
    if player.is_some() {
        stats.elapsed_secs += time.delta_secs();
    }
}

fn register_enemy_kills(
    mut kills: MessageReader<EnemyKilled>,
    mut stats: ResMut<SessionStats>,
    store: Res<HighScoreStore>,
) {
    let mut improved = false;
    for _ in kills.read() {
        improved |= stats.register_kill();
    }
    if improved {
        if let Err(err) = store.save(stats.high_score) {
            error!("failed to save high score {}: {err}", stats.high_score);
        }
    }
}

fn end_game(
    mut died: MessageReader<PlayerDied>,
    enemies: Query<Entity, With<Enemy>>,
    stats: Res<SessionStats>,
    mut spawner: MessageWriter<SpawnerCommand>,
    mut next_state: ResMut<NextState<GameState>>,
    mut commands: Commands,
) {
    if died.is_empty() {
        return;
    }
    died.clear();
    for enemy in &enemies {
        commands.entity(enemy).try_despawn();
    }
    spawner.write(SpawnerCommand::Reset);
    spawner.write(SpawnerCommand::SetActive(false));
    next_state.set(GameState::GameOver);
    info!(
        "game over: survived {:.1}s, {} kills, high score {}",
        stats.elapsed_secs, stats.kills, stats.high_score
    );
}

// === Plugin ===

pub fn plugin(app: &mut App) {
    app.register_type::<SessionStats>()
        .init_resource::<SessionStats>()
        .init_resource::<HighScoreStore>()
        .add_message::<EnemyKilled>()
        .add_message::<PlayerDied>();

    app.add_systems(Startup, load_high_score);
    app.add_systems(OnEnter(GameState::InGame), (start_new_game, reset_player));
    app.add_systems(OnExit(GameState::InGame), stop_spawning);
    app.add_systems(
        FixedUpdate,
        tick_session_clock
            .in_set(GameSet::Spawning)
            .run_if(gameplay_running),
    );
    app.add_systems(
        FixedPostUpdate,
        (register_enemy_kills, end_game)
            .chain()
            .after(GameSet::Death)
            .run_if(gameplay_running),
    );
}
