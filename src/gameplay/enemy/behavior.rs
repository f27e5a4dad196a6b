//! Enemy behavior loop: engagement by distance, shoot scheduling, aiming, and turning.
//!
//! ```text
//!   Approaching --(dist <= ENGAGE_DISTANCE)--> Engaged
//!   Engaged     --(dist >  ENGAGE_DISTANCE)--> Approaching
//!   any         --(hit while flinch ready)---> Flinching --(stand up)--> Approaching
//! ```

use bevy::prelude::*;
use rand::Rng;

use super::flinch::{FlinchStep, advance_flinch};
use super::{Enemy, Flinch};
use crate::gameplay::Dead;
use crate::gameplay::arena::METER;
use crate::gameplay::fx::{AnimState, AnimationTrigger};
use crate::gameplay::navigation::{NavAgent, NavGoal, NavPath};
use crate::gameplay::weapon::{FireRequest, Weapon, Wielding};

// === Constants ===

/// Enemies stop and shoot once the player's head is this close.
pub const ENGAGE_DISTANCE: f32 = 10.0 * METER;

/// Aim rays start this far ahead of the muzzle.
const AIM_ORIGIN_OFFSET: f32 = 0.2 * METER;

/// Cone half-angle at zero accuracy, in degrees.
const MAX_AIM_ERROR_DEGREES: f32 = 30.0;

/// Close enough to the cover point to start chasing the player.
const COVER_REACHED_DISTANCE: f32 = 0.5 * METER;

// === Components ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum BehaviorState {
    #[default]
    Approaching,
    Engaged,
    Flinching,
}

/// Where an approaching enemy is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ApproachGoal {
    #[default]
    Cover,
    Player,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyBehavior {
    pub state: BehaviorState,
    /// Next shot time while engaged. `None` means the loop is cancelled.
    pub next_shot_at: Option<f64>,
    pub approach: ApproachGoal,
}

impl EnemyBehavior {
    /// Drops into `Flinching` and cancels any pending shot.
    pub const fn flinch(&mut self) {
        self.state = BehaviorState::Flinching;
        self.next_shot_at = None;
    }
}

// === Aiming ===

/// Unit direction from `origin` to the head anchor. `None` if they coincide.
#[must_use]
pub fn aim_at_head(origin: Vec3, head: Vec3) -> Option<Dir3> {
    Dir3::new(head - origin).ok()
}

/// Cone half-angle in degrees for an accuracy in `0..=100`.
#[must_use]
pub fn cone_half_angle(accuracy: f32) -> f32 {
    (1.0 - accuracy.clamp(0.0, 100.0) / 100.0) * MAX_AIM_ERROR_DEGREES
}

/// Rotates `ideal` by independent uniform angles in `[-half_angle, half_angle]`
/// degrees about the yaw axis (world Z) and about the in-plane axis
/// perpendicular to the aim. Pitch error tilts the round out of the arena
/// plane, which shortens its planar travel.
pub fn perturb_aim(ideal: Dir3, half_angle_degrees: f32, rng: &mut impl Rng) -> Dir3 {
    if half_angle_degrees <= 0.0 {
        return ideal;
    }
    let yaw = rng
        .random_range(-half_angle_degrees..=half_angle_degrees)
        .to_radians();
    let pitch = rng
        .random_range(-half_angle_degrees..=half_angle_degrees)
        .to_radians();

    let mut rotation = Quat::from_rotation_z(yaw);
    if let Ok(pitch_axis) = Dir3::new(Vec3::Z.cross(*ideal)) {
        rotation *= Quat::from_axis_angle(*pitch_axis, pitch);
    }
    Dir3::new(rotation * *ideal).unwrap_or(ideal)
}

/// Rotation that points local +Y from `from` toward `to`.
#[must_use]
pub fn facing_rotation(from: Vec2, to: Vec2) -> Option<Quat> {
    let direction = (to - from).try_normalize()?;
    Some(Quat::from_rotation_z(
        direction.to_angle() - std::f32::consts::FRAC_PI_2,
    ))
}

// === Systems ===

/// Stand-up and re-arm steps of the flinch timer. Runs first in `GameSet::Ai`.
pub(super) fn tick_flinches(
    time: Res<Time>,
    mut enemies: Query<(Entity, &mut Flinch, &mut EnemyBehavior, &mut NavAgent), Without<Dead>>,
    mut animations: MessageWriter<AnimationTrigger>,
) {
    let now = time.elapsed_secs_f64();
    for (entity, mut flinch, mut behavior, mut agent) in &mut enemies {
        if advance_flinch(&mut flinch, now) == Some(FlinchStep::StoodUp) {
            behavior.state = BehaviorState::Approaching;
            agent.halted = false;
            animations.write(AnimationTrigger {
                entity,
                state: AnimState::Run,
            });
        }
    }
}

/// Distance check against the player's head anchor.
pub(super) fn update_engagement(
    time: Res<Time>,
    mut enemies: Query<
        (
            Entity,
            &Enemy,
            &Transform,
            &Wielding,
            &NavPath,
            &mut EnemyBehavior,
            &mut NavAgent,
            &mut NavGoal,
        ),
        Without<Dead>,
    >,
    anchors: Query<&GlobalTransform>,
    weapons: Query<&Weapon>,
    mut animations: MessageWriter<AnimationTrigger>,
) {
    let now = time.elapsed_secs_f64();
    for (entity, enemy, transform, wielding, nav_path, mut behavior, mut agent, mut goal) in
        &mut enemies
    {
        if behavior.state == BehaviorState::Flinching {
            continue;
        }
        let Ok(anchor) = anchors.get(enemy.anchor) else {
            debug!("enemy {entity:?} has no player anchor");
            continue;
        };
        let position = transform.translation.truncate();
        let head = anchor.translation().truncate();

        if position.distance(head) > ENGAGE_DISTANCE {
            if behavior.state == BehaviorState::Engaged {
                behavior.state = BehaviorState::Approaching;
                behavior.next_shot_at = None;
                behavior.approach = ApproachGoal::Player;
                animations.write(AnimationTrigger {
                    entity,
                    state: AnimState::Run,
                });
            }
            if behavior.approach == ApproachGoal::Cover
                && (nav_path.reached() || position.distance(enemy.cover) <= COVER_REACHED_DISTANCE)
            {
                behavior.approach = ApproachGoal::Player;
            }
            agent.halted = false;
            goal.0 = match behavior.approach {
                ApproachGoal::Cover => enemy.cover,
                ApproachGoal::Player => head,
            };
        } else {
            agent.halted = true;
            if behavior.state != BehaviorState::Engaged {
                let period = weapons.get(wielding.0).map_or(1.0, Weapon::period);
                behavior.state = BehaviorState::Engaged;
                behavior.next_shot_at = Some(now + period);
                animations.write(AnimationTrigger {
                    entity,
                    state: AnimState::Shoot,
                });
            }
        }
    }
}

/// Bounded turn toward the head anchor, in every state.
pub(super) fn rotate_toward_player(
    time: Res<Time>,
    mut enemies: Query<(&Enemy, &mut Transform), Without<Dead>>,
    anchors: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();
    for (enemy, mut transform) in &mut enemies {
        let Ok(anchor) = anchors.get(enemy.anchor) else {
            continue;
        };
        let Some(target) =
            facing_rotation(transform.translation.truncate(), anchor.translation().truncate())
        else {
            continue;
        };
        let max_step = enemy.rotation_speed.to_radians() * dt;
        transform.rotation = transform.rotation.rotate_towards(target, max_step);
    }
}

/// Fires one aimed round per due shot and books the next one.
pub(super) fn drive_shoot_loops(
    time: Res<Time>,
    mut enemies: Query<(Entity, &Enemy, &Wielding, &mut EnemyBehavior), Without<Dead>>,
    muzzles: Query<(&Weapon, &GlobalTransform)>,
    anchors: Query<&GlobalTransform>,
    mut fire: MessageWriter<FireRequest>,
) {
    let now = time.elapsed_secs_f64();
    let mut rng = rand::rng();
    for (entity, enemy, wielding, mut behavior) in &mut enemies {
        if behavior.state != BehaviorState::Engaged {
            continue;
        }
        let Some(due) = behavior.next_shot_at else {
            continue;
        };
        if now < due {
            continue;
        }
        let Ok((weapon, muzzle)) = muzzles.get(wielding.0) else {
            debug!("enemy {entity:?} has no muzzle");
            behavior.next_shot_at = None;
            continue;
        };
        behavior.next_shot_at = Some(now + weapon.period());

        let Ok(anchor) = anchors.get(enemy.anchor) else {
            continue;
        };
        let forward = muzzle.up().truncate().normalize_or_zero();
        let origin = muzzle.translation().truncate() + forward * AIM_ORIGIN_OFFSET;
        let Some(ideal) = aim_at_head(origin.extend(0.0), anchor.translation().truncate().extend(0.0))
        else {
            continue;
        };
        fire.write(FireRequest {
            weapon: wielding.0,
            direction: perturb_aim(ideal, cone_half_angle(enemy.accuracy), &mut rng),
        });
    }
}
