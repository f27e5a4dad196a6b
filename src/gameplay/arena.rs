//! Arena layout: floor, walls, cover blocks, spawn points, props, and camera.
//!
//! The arena spans `(0, 0)` to [`ARENA_SIZE`]. Everything here is spawned
//! once at startup and persists across matches.

use avian2d::prelude::*;
use bevy::camera::ScalingMode;
use bevy::prelude::*;

use super::damage::{DamageRecipient, ImpactReactive, RecipientKind};
use crate::third_party::{NavObstacle, prop_layers, spawn_navmesh, world_layers};
use crate::{Z_ARENA, Z_PROP};

// === Constants ===

/// Pixels per meter. Also the avian length unit.
pub const METER: f32 = 32.0;

/// Playable area, in pixels.
pub const ARENA_SIZE: Vec2 = Vec2::new(40.0 * METER, 26.0 * METER);

/// Wall thickness (pixels).
const WALL_THICKNESS: f32 = 0.75 * METER;

/// Clearance the navmesh keeps around obstacles.
pub const NAV_AGENT_RADIUS: f32 = 0.5 * METER;

/// Where the player starts every match.
pub const PLAYER_START: Vec2 = Vec2::new(20.0 * METER, 4.0 * METER);

/// Spawn points along the far wall, each paired with a cover point in front of it.
const SPAWN_LAYOUT: [(Vec2, Vec2); 4] = [
    (
        Vec2::new(3.0 * METER, 23.0 * METER),
        Vec2::new(9.0 * METER, 15.0 * METER),
    ),
    (
        Vec2::new(15.0 * METER, 24.0 * METER),
        Vec2::new(15.0 * METER, 14.0 * METER),
    ),
    (
        Vec2::new(25.0 * METER, 24.0 * METER),
        Vec2::new(25.0 * METER, 14.0 * METER),
    ),
    (
        Vec2::new(37.0 * METER, 23.0 * METER),
        Vec2::new(31.0 * METER, 15.0 * METER),
    ),
];

/// Interior cover blocks as (center, size).
const COVER_BLOCKS: [(Vec2, Vec2); 4] = [
    (
        Vec2::new(9.0 * METER, 16.5 * METER),
        Vec2::new(4.0 * METER, 1.0 * METER),
    ),
    (
        Vec2::new(20.0 * METER, 12.0 * METER),
        Vec2::new(2.0 * METER, 4.0 * METER),
    ),
    (
        Vec2::new(31.0 * METER, 16.5 * METER),
        Vec2::new(4.0 * METER, 1.0 * METER),
    ),
    (
        Vec2::new(20.0 * METER, 19.0 * METER),
        Vec2::new(6.0 * METER, 1.0 * METER),
    ),
];

const CRATE_POSITIONS: [Vec2; 3] = [
    Vec2::new(6.0 * METER, 8.0 * METER),
    Vec2::new(33.0 * METER, 7.0 * METER),
    Vec2::new(14.0 * METER, 10.0 * METER),
];
const CRATE_SIZE: f32 = 0.9 * METER;

const FLOOR_COLOR: Color = Color::srgb(0.12, 0.12, 0.14);
const WALL_COLOR: Color = Color::srgb(0.35, 0.35, 0.4);
const CRATE_COLOR: Color = Color::srgb(0.55, 0.4, 0.2);
const COVER_MARKER_COLOR: Color = Color::srgba(0.3, 0.6, 0.3, 0.25);

// === Components ===

/// Where enemies enter the arena, and the cover point they head for first.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint {
    pub cover: Vec2,
}

/// Static arena geometry.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Wall;

/// Physics-reactive crate.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Prop;

/// The gameplay camera.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ArenaCamera;

// === Helpers ===

#[must_use]
pub fn arena_center() -> Vec2 {
    ARENA_SIZE / 2.0
}

/// Boundary walls as (center, size), enclosing the arena from outside.
fn boundary_walls() -> [(Vec2, Vec2); 4] {
    let half = WALL_THICKNESS / 2.0;
    let horizontal = Vec2::new(ARENA_SIZE.x + WALL_THICKNESS * 2.0, WALL_THICKNESS);
    let vertical = Vec2::new(WALL_THICKNESS, ARENA_SIZE.y);
    [
        (Vec2::new(ARENA_SIZE.x / 2.0, -half), horizontal),
        (Vec2::new(ARENA_SIZE.x / 2.0, ARENA_SIZE.y + half), horizontal),
        (Vec2::new(-half, ARENA_SIZE.y / 2.0), vertical),
        (Vec2::new(ARENA_SIZE.x + half, ARENA_SIZE.y / 2.0), vertical),
    ]
}

fn spawn_wall(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Name::new("Wall"),
        Wall,
        NavObstacle,
        Sprite::from_color(WALL_COLOR, size),
        Transform::from_translation(center.extend(Z_PROP)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        world_layers(),
    ));
}

// === Systems ===

fn spawn_arena(mut commands: Commands) {
    commands.spawn((
        Name::new("Arena Floor"),
        Sprite::from_color(FLOOR_COLOR, ARENA_SIZE),
        Transform::from_translation(arena_center().extend(Z_ARENA)),
    ));

    for (center, size) in boundary_walls().into_iter().chain(COVER_BLOCKS) {
        spawn_wall(&mut commands, center, size);
    }

    for (index, (spawn, cover)) in SPAWN_LAYOUT.into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Spawn Point {index}")),
            SpawnPoint { cover },
            Transform::from_translation(spawn.extend(Z_ARENA)),
        ));
        commands.spawn((
            Name::new(format!("Cover Marker {index}")),
            Sprite::from_color(COVER_MARKER_COLOR, Vec2::splat(METER)),
            Transform::from_translation(cover.extend(Z_ARENA)),
        ));
    }

    for position in CRATE_POSITIONS {
        commands.spawn((
            Name::new("Crate"),
            Prop,
            ImpactReactive,
            DamageRecipient(RecipientKind::Prop),
            Sprite::from_color(CRATE_COLOR, Vec2::splat(CRATE_SIZE)),
            Transform::from_translation(position.extend(Z_PROP)),
            RigidBody::Dynamic,
            Collider::rectangle(CRATE_SIZE, CRATE_SIZE),
            prop_layers(),
            LinearDamping(4.0),
            AngularDamping(4.0),
        ));
    }

    spawn_navmesh(&mut commands, ARENA_SIZE, NAV_AGENT_RADIUS);
    info!("arena ready: {} spawn points", SPAWN_LAYOUT.len());
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Arena Camera"),
        ArenaCamera,
        Camera2d,
        Projection::from(OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: ARENA_SIZE.x + WALL_THICKNESS * 4.0,
                min_height: ARENA_SIZE.y + WALL_THICKNESS * 4.0,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_translation(arena_center().extend(0.0)),
    ));
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SpawnPoint>()
        .register_type::<Wall>()
        .register_type::<Prop>()
        .register_type::<ArenaCamera>();

    app.add_systems(Startup, (spawn_camera, spawn_arena));
}
