//! Weapons: ballistics profile, fire-rate gate, recoil, and projectile spawning.
//!
//! A weapon is a child entity of its wielder positioned at the muzzle, facing
//! local +Y. Both the player's trigger and the enemy behavior loop write
//! [`FireRequest`]s. A single system gates them and spawns rounds, so the two
//! drivers differ only in who asks and whether recoil applies.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::Faction;
use super::arena::METER;
use super::fx::{AudioCue, SoundId};
use super::projectile::{FirerColliders, spawn_projectile};
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Rounds spawn this far ahead of the muzzle, clear of the barrel.
pub const MUZZLE_CLEARANCE: f32 = 0.1 * METER;

const SHOOT_VOLUME: f32 = 0.8;
const ENEMY_HIT_VOLUME: f32 = 1.0;
const WORLD_HIT_VOLUME: f32 = 0.5;

// === Components ===

/// Who pulls the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum WeaponDriver {
    /// Player activation. Kicks the wielder back on every shot.
    Trigger,
    /// Enemy behavior loop. No recoil.
    Autonomous,
}

/// Ballistics profile plus the fire-rate gate.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Weapon {
    pub damage: f32,
    /// Muzzle speed, in pixels per second.
    pub shooting_force: f32,
    /// Impulse applied to the wielder against the shot direction.
    pub recoil_force: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Earliest time, in seconds since startup, the next shot may leave.
    pub next_fire_time: f64,
    pub driver: WeaponDriver,
}

impl Weapon {
    /// The player's sidearm.
    #[must_use]
    pub const fn pistol() -> Self {
        Self {
            damage: 34.0,
            shooting_force: 28.0 * METER,
            recoil_force: 6.0 * METER,
            fire_rate: 6.0,
            next_fire_time: 0.0,
            driver: WeaponDriver::Trigger,
        }
    }

    /// Enemy rifle with the given per-round damage and cadence.
    #[must_use]
    pub const fn enemy_rifle(damage: f32, fire_rate: f32) -> Self {
        Self {
            damage,
            shooting_force: 14.0 * METER,
            recoil_force: 0.0,
            fire_rate,
            next_fire_time: 0.0,
            driver: WeaponDriver::Autonomous,
        }
    }

    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    #[must_use]
    pub const fn shooting_force(&self) -> f32 {
        self.shooting_force
    }

    /// Seconds between shots.
    #[must_use]
    pub fn period(&self) -> f64 {
        1.0 / f64::from(self.fire_rate)
    }

    /// Rate gate. Succeeds when `now >= next_fire_time` and books the next slot.
    /// A refused call changes nothing.
    pub fn try_fire(&mut self, now: f64) -> bool {
        if now < self.next_fire_time {
            return false;
        }
        self.next_fire_time = now + self.period();
        true
    }

    #[must_use]
    pub const fn shoot_cue(emitter: Entity) -> AudioCue {
        AudioCue {
            emitter: Some(emitter),
            sound: SoundId::Shoot,
            volume: SHOOT_VOLUME,
        }
    }

    /// Hit sound variant for a resolved contact.
    #[must_use]
    pub const fn hit_cue(emitter: Entity, is_enemy_hit: bool) -> AudioCue {
        if is_enemy_hit {
            AudioCue {
                emitter: Some(emitter),
                sound: SoundId::EnemyHit,
                volume: ENEMY_HIT_VOLUME,
            }
        } else {
            AudioCue {
                emitter: Some(emitter),
                sound: SoundId::WorldHit,
                volume: WORLD_HIT_VOLUME,
            }
        }
    }
}

/// On a wielder: its weapon entity (a muzzle child).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Wielding(pub Entity);

// === Messages ===

/// Ask a weapon to fire along `direction`. Dropped silently when the gate is closed.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    pub weapon: Entity,
    pub direction: Dir3,
}

// === Systems ===

/// Topmost ancestor of `entity` (the wielder of a weapon).
fn root_of(entity: Entity, parents: &Query<&ChildOf>) -> Entity {
    let mut current = entity;
    while let Ok(child_of) = parents.get(current) {
        current = child_of.parent();
    }
    current
}

/// Gates fire requests and turns the accepted ones into rounds.
/// Runs in `GameSet::Weapons`.
fn fire_weapons(
    time: Res<Time>,
    mut requests: MessageReader<FireRequest>,
    mut weapons: Query<(&mut Weapon, &Faction, &GlobalTransform)>,
    parents: Query<&ChildOf>,
    firer_colliders: FirerColliders,
    mut bodies: Query<(&mut LinearVelocity, &ComputedMass)>,
    mut audio: MessageWriter<AudioCue>,
    mut commands: Commands,
) {
    let now = time.elapsed_secs_f64();
    for request in requests.read() {
        let Ok((mut weapon, faction, muzzle)) = weapons.get_mut(request.weapon) else {
            debug!("fire request for missing weapon {:?}", request.weapon);
            continue;
        };
        if !weapon.try_fire(now) {
            continue;
        }

        let wielder = root_of(request.weapon, &parents);
        let forward = muzzle.up().truncate().normalize_or_zero();
        let origin = muzzle.translation().truncate() + forward * MUZZLE_CLEARANCE;

        spawn_projectile(
            &mut commands,
            request.weapon,
            &weapon,
            *faction,
            origin,
            request.direction,
            now,
            firer_colliders.of(wielder),
        );
        audio.write(Weapon::shoot_cue(request.weapon));

        if weapon.driver == WeaponDriver::Trigger {
            if let Ok((mut velocity, mass)) = bodies.get_mut(wielder) {
                let impulse = -request.direction.truncate() * weapon.recoil_force;
                velocity.0 += impulse * mass.inverse();
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Weapon>()
        .register_type::<Wielding>()
        .add_message::<FireRequest>();

    app.add_systems(
        FixedUpdate,
        fire_weapons
            .in_set(GameSet::Weapons)
            .run_if(gameplay_running),
    );
}
