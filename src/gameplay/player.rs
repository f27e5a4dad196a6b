//! The player: body, head anchor, hurtbox, pistol, input, and the player side
//! of the damage protocol.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::arena::{METER, PLAYER_START};
use super::damage::{DamageRecipient, RecipientKind, TakeDamage};
use super::enemy::facing_rotation;
use super::fx::{AudioCue, SoundId, VfxKind, VfxRequest};
use super::weapon::{FireRequest, Weapon, Wielding};
use super::{Dead, Faction, Health};
use crate::session::PlayerDied;
use crate::third_party::{player_body_layers, player_hurtbox_layers};
use crate::{GameSet, Z_ACTOR, gameplay_running};

// === Constants ===

pub const PLAYER_MAX_HEALTH: f32 = 100.0;

/// Top walking speed (pixels per second).
const PLAYER_SPEED: f32 = 6.0 * METER;

/// How fast velocity converges on the input target. Recoil decays at this rate.
const PLAYER_ACCELERATION: f32 = 40.0 * METER;

const PLAYER_RADIUS: f32 = 0.4 * METER;

/// Head anchor offset ahead of the body center, along the facing.
pub const HEAD_OFFSET: f32 = 0.15 * METER;

/// Hurtbox slightly larger than the body so grazing rounds still register.
const HURTBOX_RADIUS: f32 = PLAYER_RADIUS * 1.1;

const PLAYER_HURT_VOLUME: f32 = 0.9;

/// Number of bleeding steps above zero.
pub const BLEEDING_STEPS: u8 = 4;

const PLAYER_COLOR: Color = Color::srgb(0.3, 0.55, 0.9);
const PISTOL_COLOR: Color = Color::srgb(0.15, 0.15, 0.15);

// === Components ===

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Player;

/// What enemies aim at and chase. A child of the player body.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerHead;

/// Sensor volume that registers enemy rounds.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerHurtbox;

// === Resources ===

/// Input sampled in `Update` and consumed by the fixed-step systems.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlayerInput {
    /// Unit or zero.
    pub movement: Vec2,
    /// World-space cursor position, if over the window.
    pub aim_at: Option<Vec2>,
    /// A trigger press waiting for the next fixed tick. Set on press, cleared
    /// when fired, so one press fires one round however long it is held.
    pub trigger: bool,
}

/// Derived UI state for the HUD.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlayerVitals {
    /// Health fraction in `0.0..=1.0`.
    pub health: f32,
    /// `0` is unhurt. `1..=BLEEDING_STEPS` select the overlay.
    pub bleeding: u8,
    pub alive: bool,
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self {
            health: 1.0,
            bleeding: 0,
            alive: true,
        }
    }
}

impl PlayerVitals {
    #[must_use]
    pub fn from_health(health: &Health) -> Self {
        Self {
            health: health.fraction(),
            bleeding: bleeding_step(health.current, health.max),
            alive: health.is_alive(),
        }
    }
}

/// `floor((max - current) * 5 / max)` clamped to `0..=4`.
/// Computed on the health deficit so step edges land exactly (80/100 is step 1).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bleeding_step(current: f32, max: f32) -> u8 {
    if max <= 0.0 {
        return BLEEDING_STEPS;
    }
    ((max - current) * 5.0 / max)
        .floor()
        .clamp(0.0, f32::from(BLEEDING_STEPS)) as u8
}

// === Spawning ===

fn spawn_player(mut commands: Commands) {
    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Faction::Player,
            Health::new(PLAYER_MAX_HEALTH),
            DamageRecipient(RecipientKind::Player),
            Sprite::from_color(PLAYER_COLOR, Vec2::splat(PLAYER_RADIUS * 2.0)),
            Transform::from_translation(PLAYER_START.extend(Z_ACTOR)),
            RigidBody::Dynamic,
            Collider::circle(PLAYER_RADIUS),
            player_body_layers(),
            LockedAxes::ROTATION_LOCKED,
        ))
        .id();

    commands.spawn((
        Name::new("Player Head"),
        PlayerHead,
        Transform::from_xyz(0.0, HEAD_OFFSET, 0.0),
        ChildOf(player),
    ));
    commands.spawn((
        Name::new("Player Hurtbox"),
        PlayerHurtbox,
        Sensor,
        Collider::circle(HURTBOX_RADIUS),
        player_hurtbox_layers(),
        Transform::default(),
        ChildOf(player),
    ));
    let pistol = commands
        .spawn((
            Name::new("Pistol"),
            Weapon::pistol(),
            Faction::Player,
            Sprite::from_color(PISTOL_COLOR, Vec2::new(4.0, 10.0)),
            Transform::from_xyz(0.0, PLAYER_RADIUS + 4.0, 0.1),
            ChildOf(player),
        ))
        .id();
    commands.entity(player).insert(Wielding(pistol));
}

// === Input ===

fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    window: Option<Single<&Window>>,
    camera: Option<Single<(&Camera, &GlobalTransform), With<Camera2d>>>,
    mut input: ResMut<PlayerInput>,
) {
    let mut movement = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        movement.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        movement.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        movement.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        movement.x -= 1.0;
    }

    input.movement = movement.normalize_or_zero();
    input.trigger |=
        mouse.just_pressed(MouseButton::Left) || keyboard.just_pressed(KeyCode::Space);
    input.aim_at = window.zip(camera).and_then(|(window, camera)| {
        let (camera, camera_global) = *camera;
        window
            .cursor_position()
            .and_then(|screen_pos| camera.viewport_to_world_2d(camera_global, screen_pos).ok())
    });
}

/// Steers velocity toward the input target without overwriting it, so recoil
/// kicks fade out instead of vanishing.
fn move_player(
    time: Res<Time>,
    input: Res<PlayerInput>,
    player: Option<Single<&mut LinearVelocity, (With<Player>, Without<Dead>)>>,
) {
    let Some(mut velocity) = player else {
        return;
    };
    let target = input.movement * PLAYER_SPEED;
    velocity.0 = velocity
        .0
        .move_towards(target, PLAYER_ACCELERATION * time.delta_secs());
}

fn aim_player(
    input: Res<PlayerInput>,
    player: Option<Single<&mut Transform, (With<Player>, Without<Dead>)>>,
) {
    let (Some(mut transform), Some(aim_at)) = (player, input.aim_at) else {
        return;
    };
    if let Some(facing) = facing_rotation(transform.translation.truncate(), aim_at) {
        transform.rotation = facing;
    }
}

/// Consumes a latched trigger press as one fire request along the pistol's
/// facing. The weapon's rate gate may still refuse it.
fn pull_trigger(
    mut input: ResMut<PlayerInput>,
    player: Option<Single<&Wielding, (With<Player>, Without<Dead>)>>,
    muzzles: Query<&GlobalTransform>,
    mut fire: MessageWriter<FireRequest>,
) {
    if !input.trigger {
        return;
    }
    input.trigger = false;
    let Some(wielding) = player else {
        return;
    };
    let Ok(muzzle) = muzzles.get(wielding.0) else {
        debug!("player pistol has no transform");
        return;
    };
    let Ok(direction) = Dir3::new(muzzle.up().truncate().extend(0.0)) else {
        return;
    };
    fire.write(FireRequest {
        weapon: wielding.0,
        direction,
    });
}

// === Damage and Death ===

/// Player side of the damage protocol. Only enemy rounds hurt.
fn apply_player_damage(
    mut hits: MessageReader<TakeDamage>,
    mut player: Query<(Entity, &Transform, &mut Health), (With<Player>, Without<Dead>)>,
    mut vfx: MessageWriter<VfxRequest>,
    mut audio: MessageWriter<AudioCue>,
    mut commands: Commands,
) {
    for hit in hits.read() {
        let Ok((entity, transform, mut health)) = player.get_mut(hit.recipient) else {
            continue;
        };
        if hit.faction != Faction::Enemy {
            debug!("player ignored {:?} round", hit.faction);
            continue;
        }
        if !health.is_alive() {
            continue;
        }

        vfx.write(VfxRequest {
            effect: VfxKind::PlayerHit,
            point: hit.contact_point,
            facing: transform.translation.truncate() - hit.contact_point,
        });
        audio.write(AudioCue {
            emitter: Some(entity),
            sound: SoundId::PlayerHurt,
            volume: PLAYER_HURT_VOLUME,
        });

        if health.take(hit.damage) {
            commands.entity(entity).try_insert(Dead);
        }
    }
}

fn handle_player_death(
    dead: Option<Single<Entity, (With<Player>, Added<Dead>)>>,
    mut died: MessageWriter<PlayerDied>,
) {
    if dead.is_some() {
        info!("player died");
        died.write(PlayerDied);
    }
}

fn sync_player_vitals(
    player: Option<Single<&Health, (With<Player>, Changed<Health>)>>,
    mut vitals: ResMut<PlayerVitals>,
) {
    if let Some(health) = player {
        *vitals = PlayerVitals::from_health(&health);
    }
}

/// Full health, back at the start position, standing still.
pub fn reset_player(
    mut player: Query<
        (
            Entity,
            &mut Health,
            &mut Transform,
            &mut LinearVelocity,
            Option<&Wielding>,
        ),
        With<Player>,
    >,
    mut weapons: Query<&mut Weapon>,
    mut input: ResMut<PlayerInput>,
    mut commands: Commands,
) {
    for (entity, mut health, mut transform, mut velocity, wielding) in &mut player {
        health.restore();
        transform.translation = PLAYER_START.extend(Z_ACTOR);
        transform.rotation = Quat::IDENTITY;
        velocity.0 = Vec2::ZERO;
        if let Some(mut weapon) = wielding.and_then(|w| weapons.get_mut(w.0).ok()) {
            weapon.next_fire_time = 0.0;
        }
        commands.entity(entity).remove::<Dead>();
    }
    *input = PlayerInput::default();
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Player>()
        .register_type::<PlayerHead>()
        .register_type::<PlayerHurtbox>()
        .register_type::<PlayerInput>()
        .register_type::<PlayerVitals>()
        .init_resource::<PlayerInput>()
        .init_resource::<PlayerVitals>();

    app.add_systems(Startup, spawn_player);
    app.add_systems(
        Update,
        (
            read_player_input.run_if(gameplay_running),
            sync_player_vitals,
        )
            .in_set(GameSet::Input),
    );
    app.add_systems(
        FixedUpdate,
        (
            (aim_player, pull_trigger).chain().in_set(GameSet::Ai),
            move_player.in_set(GameSet::Movement),
        )
            .run_if(gameplay_running),
    );
    app.add_systems(
        FixedPostUpdate,
        (
            apply_player_damage.in_set(GameSet::Damage),
            handle_player_death.in_set(GameSet::Death),
        )
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bleeding_steps_hit_exact_edges() {
        let cases = [
            (100.0, 0),
            (81.0, 0),
            (80.0, 1),
            (60.0, 2),
            (40.0, 3),
            (19.0, 4),
            (0.0, 4),
        ];
        for (current, expected) in cases {
            assert_eq!(
                bleeding_step(current, 100.0),
                expected,
                "health {current}"
            );
        }
    }

    #[test]
    fn bleeding_step_clamps_out_of_range() {
        assert_eq!(bleeding_step(150.0, 100.0), 0);
        assert_eq!(bleeding_step(-20.0, 100.0), BLEEDING_STEPS);
        assert_eq!(bleeding_step(0.0, 0.0), BLEEDING_STEPS);
    }

    #[test]
    fn vitals_follow_health() {
        let mut health = Health::new(100.0);
        health.take(45.0);
        assert_eq!(
            PlayerVitals::from_health(&health),
            PlayerVitals {
                health: 0.55,
                bleeding: 2,
                alive: true,
            }
        );
    }

    #[allow(clippy::assertions_on_constants)]
    #[test]
    fn constants_are_valid() {
        assert!(PLAYER_MAX_HEALTH > 0.0);
        assert!(PLAYER_SPEED > 0.0);
        assert!(PLAYER_ACCELERATION > 0.0);
        assert!(HURTBOX_RADIUS > PLAYER_RADIUS);
        assert!(HEAD_OFFSET < PLAYER_RADIUS);
    }
}
