//! Enemies: archetype stats, spawning, hit reaction, and death.

mod behavior;
mod flinch;

use avian2d::prelude::*;
use bevy::prelude::*;

pub use behavior::{
    ApproachGoal, BehaviorState, ENGAGE_DISTANCE, EnemyBehavior, aim_at_head, cone_half_angle,
    facing_rotation, perturb_aim,
};
pub use flinch::{
    CROUCH_COOLDOWN_SECS, CROUCH_DURATION_SECS, Flinch, FlinchPhase, FlinchStep, advance_flinch,
    begin_flinch,
};

use super::arena::METER;
use super::damage::{DamageRecipient, RecipientKind, TakeDamage};
use super::fx::{AnimState, AnimationState, AnimationTrigger, AudioCue, SoundId, VfxKind, VfxRequest};
use super::navigation::{NavAgent, NavGoal, NavPath};
use super::weapon::{Weapon, Wielding};
use super::{Dead, Faction, Health};
use crate::session::EnemyKilled;
use crate::third_party::enemy_layers;
use crate::{GameSet, GameState, Z_ACTOR, gameplay_running};

const ENEMY_COLOR: Color = Color::srgb(0.8, 0.25, 0.25);
const MUZZLE_COLOR: Color = Color::srgb(0.2, 0.2, 0.2);
const ENEMY_DEATH_VOLUME: f32 = 1.0;

// === Stats ===

/// Per-archetype tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: f32,
    /// Damage per round.
    pub damage: f32,
    /// 0 sprays across the full cone, 100 never misses.
    pub accuracy: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
    /// Pixels per second.
    pub move_speed: f32,
    /// Body radius (pixels).
    pub radius: f32,
}

impl EnemyStats {
    #[must_use]
    pub const fn grunt() -> Self {
        Self {
            max_health: 100.0,
            damage: 10.0,
            accuracy: 70.0,
            fire_rate: 1.0,
            rotation_speed: 120.0,
            move_speed: 3.5 * METER,
            radius: 0.45 * METER,
        }
    }
}

// === Components ===

/// An enemy combatant. The player anchor and cover point are injected at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Enemy {
    /// The player's head anchor, aimed at and chased.
    pub anchor: Entity,
    /// Where to go first.
    pub cover: Vec2,
    pub accuracy: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
}

#[cfg(test)]
impl Enemy {
    pub const fn test_default() -> Self {
        Self {
            anchor: Entity::PLACEHOLDER,
            cover: Vec2::ZERO,
            accuracy: 100.0,
            rotation_speed: 120.0,
        }
    }
}

// === Spawning ===

/// Spawns an armed enemy at `position`. `init_enemy` finishes setup once it lands.
pub fn spawn_enemy(
    commands: &mut Commands,
    stats: &EnemyStats,
    position: Vec2,
    anchor: Entity,
    cover: Vec2,
) -> Entity {
    let enemy = commands
        .spawn((
            Name::new("Enemy"),
            Enemy {
                anchor,
                cover,
                accuracy: stats.accuracy,
                rotation_speed: stats.rotation_speed,
            },
            Faction::Enemy,
            Health::new(stats.max_health),
            DamageRecipient(RecipientKind::Enemy),
            EnemyBehavior::default(),
            Flinch::default(),
            AnimationState(AnimState::Run),
            (NavAgent::new(stats.move_speed), NavGoal(cover), NavPath::default()),
            Sprite::from_color(ENEMY_COLOR, Vec2::splat(stats.radius * 2.0)),
            Transform::from_translation(position.extend(Z_ACTOR)),
            DespawnOnExit(GameState::InGame),
            (
                RigidBody::Dynamic,
                Collider::circle(stats.radius),
                enemy_layers(),
                LockedAxes::ROTATION_LOCKED,
            ),
        ))
        .id();

    let muzzle = commands
        .spawn((
            Name::new("Enemy Rifle"),
            Weapon::enemy_rifle(stats.damage, stats.fire_rate),
            Faction::Enemy,
            Sprite::from_color(MUZZLE_COLOR, Vec2::new(4.0, 10.0)),
            Transform::from_xyz(0.0, stats.radius + 4.0, 0.1),
            ChildOf(enemy),
        ))
        .id();
    commands.entity(enemy).insert(Wielding(muzzle));
    enemy
}

// === Systems ===

/// Snaps the new enemy's facing to the player and starts it running for cover.
fn init_enemy(
    add: On<Add, Enemy>,
    mut enemies: Query<(&Enemy, &mut Transform, &mut EnemyBehavior, &mut NavGoal)>,
    anchors: Query<&GlobalTransform>,
    mut animations: MessageWriter<AnimationTrigger>,
) {
    let Ok((enemy, mut transform, mut behavior, mut goal)) = enemies.get_mut(add.entity) else {
        return;
    };
    let facing = anchors.get(enemy.anchor).ok().and_then(|anchor| {
        facing_rotation(transform.translation.truncate(), anchor.translation().truncate())
    });
    if let Some(facing) = facing {
        transform.rotation = facing;
    }
    *behavior = EnemyBehavior::default();
    goal.0 = enemy.cover;
    animations.write(AnimationTrigger {
        entity: add.entity,
        state: AnimState::Run,
    });
}

/// Enemy side of the damage protocol: blood, health, and a flinch if allowed.
/// A lethal hit marks the enemy `Dead` and skips the flinch.
fn apply_enemy_damage(
    time: Res<Time>,
    mut hits: MessageReader<TakeDamage>,
    mut enemies: Query<
        (
            &Transform,
            &mut Health,
            &mut Flinch,
            &mut EnemyBehavior,
            &mut NavAgent,
        ),
        (With<Enemy>, Without<Dead>),
    >,
    mut vfx: MessageWriter<VfxRequest>,
    mut animations: MessageWriter<AnimationTrigger>,
    mut commands: Commands,
) {
    let now = time.elapsed_secs_f64();
    for hit in hits.read() {
        let Ok((transform, mut health, mut flinch, mut behavior, mut agent)) =
            enemies.get_mut(hit.recipient)
        else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        vfx.write(VfxRequest {
            effect: VfxKind::Blood,
            point: hit.contact_point,
            facing: transform.translation.truncate() - hit.contact_point,
        });

        if health.take(hit.damage) {
            debug!("enemy {:?} killed by {:?}", hit.recipient, hit.weapon);
            commands.entity(hit.recipient).try_insert(Dead);
            continue;
        }

        if begin_flinch(&mut flinch, now) {
            behavior.flinch();
            agent.halted = true;
            animations.write(AnimationTrigger {
                entity: hit.recipient,
                state: AnimState::Crouch,
            });
        }
    }
}

/// Registers the kill, plays the death sound, and removes the enemy.
fn handle_enemy_death(
    dead: Query<Entity, (With<Enemy>, Added<Dead>)>,
    mut kills: MessageWriter<EnemyKilled>,
    mut audio: MessageWriter<AudioCue>,
    mut commands: Commands,
) {
    for entity in &dead {
        kills.write(EnemyKilled { enemy: entity });
        audio.write(AudioCue {
            emitter: None,
            sound: SoundId::EnemyDeath,
            volume: ENEMY_DEATH_VOLUME,
        });
        commands.entity(entity).try_despawn();
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Enemy>()
        .register_type::<EnemyBehavior>()
        .register_type::<Flinch>();

    app.add_observer(init_enemy);

    app.add_systems(
        FixedUpdate,
        (
            behavior::tick_flinches,
            behavior::update_engagement,
            behavior::rotate_toward_player,
            behavior::drive_shoot_loops,
        )
            .chain()
            .in_set(GameSet::Ai)
            .run_if(gameplay_running),
    );
    app.add_systems(
        FixedPostUpdate,
        (
            apply_enemy_damage.in_set(GameSet::Damage),
            handle_enemy_death.in_set(GameSet::Death),
        )
            .run_if(gameplay_running),
    );
}
