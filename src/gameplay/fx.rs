//! Presentation sinks: animation triggers, audio cues, and visual effects.
//!
//! Combat code never plays a clip or spawns a particle itself. It writes one
//! of the messages below and moves on. The consumers here are the default
//! sinks: a sprite flash for effects, an `AnimationState` component for
//! animation, and a log line for audio.

use std::time::Duration;

use bevy::prelude::*;

use crate::{GameSet, Z_EFFECT};

// === Constants ===

/// How long an impact or blood flash stays on screen.
const EFFECT_DURATION_SECS: f32 = 0.25;

/// Side length of an effect sprite (pixels).
const EFFECT_SIZE: f32 = 6.0;

const IMPACT_COLOR: Color = Color::srgb(1.0, 0.9, 0.5);
const BLOOD_COLOR: Color = Color::srgb(0.7, 0.05, 0.05);
const PLAYER_HIT_COLOR: Color = Color::srgb(1.0, 0.3, 0.3);

// === Animation ===

/// Symbolic animation states an actor can be asked to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AnimState {
    Run,
    Crouch,
    Shoot,
}

/// Fire-and-forget request to switch an actor's animation.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTrigger {
    pub entity: Entity,
    pub state: AnimState,
}

/// Last animation state requested for an actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AnimationState(pub AnimState);

// === Audio ===

/// Identifiers for the sounds combat can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SoundId {
    Shoot,
    EnemyHit,
    WorldHit,
    PlayerHurt,
    EnemyDeath,
}

/// Fire-and-forget request to play a sound.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    /// Entity the sound originates from, if it still exists.
    pub emitter: Option<Entity>,
    pub sound: SoundId,
    pub volume: f32,
}

// === Visual Effects ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum VfxKind {
    /// Projectile striking anything.
    Impact,
    /// Enemy taking damage.
    Blood,
    /// Player taking damage.
    PlayerHit,
}

impl VfxKind {
    const fn color(self) -> Color {
        match self {
            Self::Impact => IMPACT_COLOR,
            Self::Blood => BLOOD_COLOR,
            Self::PlayerHit => PLAYER_HIT_COLOR,
        }
    }
}

/// Fire-and-forget request to show an effect at a world point.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct VfxRequest {
    pub effect: VfxKind,
    pub point: Vec2,
    /// Direction the effect should face. Zero means unoriented.
    pub facing: Vec2,
}

/// Self-expiring effect sprite.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct EffectLifetime(pub Timer);

// === Systems ===

fn spawn_effects(mut requests: MessageReader<VfxRequest>, mut commands: Commands) {
    for request in requests.read() {
        let rotation = request
            .facing
            .try_normalize()
            .map_or(Quat::IDENTITY, |facing| {
                Quat::from_rotation_z(facing.to_angle())
            });
        commands.spawn((
            Name::new(format!("{:?} Effect", request.effect)),
            Sprite::from_color(request.effect.color(), Vec2::splat(EFFECT_SIZE)),
            Transform::from_translation(request.point.extend(Z_EFFECT)).with_rotation(rotation),
            EffectLifetime(Timer::new(
                Duration::from_secs_f32(EFFECT_DURATION_SECS),
                TimerMode::Once,
            )),
        ));
    }
}

fn expire_effects(
    time: Res<Time>,
    mut commands: Commands,
    mut effects: Query<(Entity, &mut EffectLifetime)>,
) {
    for (entity, mut lifetime) in &mut effects {
        lifetime.0.tick(time.delta());
        if lifetime.0.is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

fn apply_animation_triggers(
    mut triggers: MessageReader<AnimationTrigger>,
    mut actors: Query<&mut AnimationState>,
) {
    for trigger in triggers.read() {
        let Ok(mut state) = actors.get_mut(trigger.entity) else {
            continue;
        };
        state.0 = trigger.state;
    }
}

fn log_audio_cues(mut cues: MessageReader<AudioCue>) {
    for cue in cues.read() {
        debug!(
            "audio: {:?} at volume {:.2} from {:?}",
            cue.sound, cue.volume, cue.emitter
        );
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<AnimationState>()
        .register_type::<EffectLifetime>();

    app.add_message::<AnimationTrigger>()
        .add_message::<AudioCue>()
        .add_message::<VfxRequest>();

    app.add_systems(
        Update,
        (
            spawn_effects,
            expire_effects,
            apply_animation_triggers,
            log_audio_cues,
        )
            .in_set(GameSet::Ui),
    );
}
