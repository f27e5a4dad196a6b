//! Projectiles: spawn, launch, contact detection, and one-shot resolution.
//!
//! A round may report several contacts in the same physics step (a trigger
//! volume and a solid body, for instance). Detection turns each collision
//! message into a [`ProjectileContact`]; resolution handles the first one
//! and ignores the rest via [`Projectile::mark_resolved`].

use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::Faction;
use super::damage::{RecipientLookup, TakeDamage};
use super::fx::{AudioCue, VfxKind, VfxRequest};
use super::weapon::Weapon;
use crate::third_party::projectile_layers;
use crate::{GameSet, GameState, Z_PROJECTILE, gameplay_running};

// === Constants ===

/// Rounds that hit nothing despawn after this long.
pub const PROJECTILE_LIFETIME_SECS: f32 = 5.0;

/// Collider and sprite radius (pixels).
const PROJECTILE_RADIUS: f32 = 2.5;

const PLAYER_ROUND_COLOR: Color = Color::srgb(1.0, 0.95, 0.6);
const ENEMY_ROUND_COLOR: Color = Color::srgb(1.0, 0.45, 0.2);

// === Components ===

/// A round in flight.
///
/// Damage and impact force are copied from the weapon when the round is
/// fired, so a round still hits after its weapon is gone.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    weapon: Entity,
    damage: f32,
    impact_force: f32,
    direction: Dir3,
    spawned_at: f64,
    resolved: bool,
}

impl Projectile {
    #[must_use]
    pub const fn new(
        weapon_entity: Entity,
        weapon: &Weapon,
        direction: Dir3,
        spawned_at: f64,
    ) -> Self {
        Self {
            weapon: weapon_entity,
            damage: weapon.damage(),
            impact_force: weapon.shooting_force(),
            direction,
            spawned_at,
            resolved: false,
        }
    }

    /// The weapon that fired this round. May no longer exist.
    #[must_use]
    pub const fn firing_weapon(&self) -> Entity {
        self.weapon
    }

    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Impulse magnitude handed to whatever the round strikes.
    #[must_use]
    pub const fn impact_force(&self) -> f32 {
        self.impact_force
    }

    #[must_use]
    pub const fn direction(&self) -> Dir3 {
        self.direction
    }

    #[must_use]
    pub const fn spawned_at(&self) -> f64 {
        self.spawned_at
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Claims this round for resolution. Returns `false` if it was already claimed.
    pub fn mark_resolved(&mut self) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        true
    }
}

/// Time left before an unresolved round despawns.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Lifetime(pub Timer);

impl Default for Lifetime {
    fn default() -> Self {
        Self(Timer::new(
            Duration::from_secs_f32(PROJECTILE_LIFETIME_SECS),
            TimerMode::Once,
        ))
    }
}

/// Colliders this round passes through: every collider of the firer's hierarchy.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct IgnoredColliders(Vec<Entity>);

impl IgnoredColliders {
    #[must_use]
    pub const fn new(colliders: Vec<Entity>) -> Self {
        Self(colliders)
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }
}

// === Messages ===

/// How the struck collider reported the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ContactKind {
    /// Overlap with a sensor volume.
    Trigger,
    /// Solid collision.
    Collision,
}

/// A round touched something this step.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileContact {
    pub projectile: Entity,
    pub struck: Entity,
    pub point: Vec2,
    pub kind: ContactKind,
}

// === Helpers ===

/// Sets the round moving along `direction` at `force` pixels per second
/// with no spin. The planar part of the direction drives the velocity.
pub fn launch(
    velocity: &mut LinearVelocity,
    angular: &mut AngularVelocity,
    direction: Dir3,
    force: f32,
) {
    velocity.0 = direction.truncate() * force;
    angular.0 = 0.0;
}

/// Collects every collider in a firer's hierarchy.
#[derive(SystemParam)]
pub struct FirerColliders<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    colliders: Query<'w, 's, (), With<Collider>>,
}

impl FirerColliders<'_, '_> {
    /// `root` and all its descendants that carry a collider.
    #[must_use]
    pub fn of(&self, root: Entity) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            if self.colliders.contains(entity) {
                found.push(entity);
            }
            if let Ok(children) = self.children.get(entity) {
                stack.extend(children.iter());
            }
        }
        found
    }
}

/// Spawns a launched round at `origin`.
pub fn spawn_projectile(
    commands: &mut Commands,
    weapon_entity: Entity,
    weapon: &Weapon,
    faction: Faction,
    origin: Vec2,
    direction: Dir3,
    now: f64,
    ignored: Vec<Entity>,
) -> Entity {
    let mut velocity = LinearVelocity::ZERO;
    let mut angular = AngularVelocity::ZERO;
    launch(&mut velocity, &mut angular, direction, weapon.shooting_force());

    let color = match faction {
        Faction::Player => PLAYER_ROUND_COLOR,
        Faction::Enemy => ENEMY_ROUND_COLOR,
    };

    commands
        .spawn((
            Name::new("Projectile"),
            Projectile::new(weapon_entity, weapon, direction, now),
            faction,
            Lifetime::default(),
            IgnoredColliders::new(ignored),
            Sprite::from_color(color, Vec2::splat(PROJECTILE_RADIUS * 2.0)),
            Transform::from_translation(origin.extend(Z_PROJECTILE)),
            DespawnOnExit(GameState::InGame),
            (
                RigidBody::Dynamic,
                Collider::circle(PROJECTILE_RADIUS),
                projectile_layers(faction),
                CollisionEventsEnabled,
                ActiveCollisionHooks::FILTER_PAIRS,
                SweptCcd::default(),
                velocity,
                angular,
            ),
        ))
        .id()
}

/// Where a round met `struck`: the deepest point of their contact manifold,
/// or the round's own position when the pair has none (sensor overlaps).
#[must_use]
pub fn contact_point(
    graph: Option<&ContactGraph>,
    projectile: Entity,
    struck: Entity,
    projectile_position: Vec2,
) -> Vec2 {
    graph
        .and_then(|graph| graph.get(projectile, struck))
        .and_then(|(_, pair)| pair.find_deepest_contact())
        .map_or(projectile_position, |contact| contact.point)
}

// === Systems ===

/// Turns avian collision-start messages into projectile contacts.
fn detect_projectile_contacts(
    mut collisions: MessageReader<CollisionStart>,
    graph: Option<Res<ContactGraph>>,
    projectiles: Query<&Position, With<Projectile>>,
    sensors: Query<(), With<Sensor>>,
    mut contacts: MessageWriter<ProjectileContact>,
) {
    for event in collisions.read() {
        let (projectile, struck) = if projectiles.contains(event.collider1) {
            (event.collider1, event.collider2)
        } else if projectiles.contains(event.collider2) {
            (event.collider2, event.collider1)
        } else {
            continue;
        };
        let Ok(position) = projectiles.get(projectile) else {
            continue;
        };
        let kind = if sensors.contains(struck) {
            ContactKind::Trigger
        } else {
            ContactKind::Collision
        };
        contacts.write(ProjectileContact {
            projectile,
            struck,
            point: contact_point(graph.as_deref(), projectile, struck, position.0),
            kind,
        });
    }
}

/// Resolves each round at most once: impact effect, damage fan-out, hit
/// sound, despawn. Only the hit sound needs the firing weapon to still exist.
fn resolve_projectile_contacts(
    mut contacts: MessageReader<ProjectileContact>,
    mut projectiles: Query<(&mut Projectile, &Faction)>,
    weapons: Query<(), With<Weapon>>,
    lookup: RecipientLookup,
    mut damage: MessageWriter<TakeDamage>,
    mut vfx: MessageWriter<VfxRequest>,
    mut audio: MessageWriter<AudioCue>,
    mut commands: Commands,
) {
    for contact in contacts.read() {
        let Ok((mut projectile, faction)) = projectiles.get_mut(contact.projectile) else {
            continue;
        };
        if !projectile.mark_resolved() {
            continue;
        }

        let weapon_entity = projectile.firing_weapon();
        let direction = projectile.direction().truncate();
        vfx.write(VfxRequest {
            effect: VfxKind::Impact,
            point: contact.point,
            facing: -direction,
        });

        for recipient in lookup.dispatch_targets(contact.struck) {
            damage.write(TakeDamage {
                recipient,
                weapon: weapon_entity,
                projectile: contact.projectile,
                contact_point: contact.point,
                damage: projectile.damage(),
                impulse: direction * projectile.impact_force(),
                faction: *faction,
            });
        }

        if weapons.contains(weapon_entity) {
            audio.write(Weapon::hit_cue(
                weapon_entity,
                lookup.hit_enemy(contact.struck),
            ));
        } else {
            debug!(
                "projectile {:?} outlived its weapon {:?}; no hit sound",
                contact.projectile, weapon_entity
            );
        }
        commands.entity(contact.projectile).try_despawn();
    }
}

fn expire_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Lifetime), With<Projectile>>,
) {
    for (entity, mut lifetime) in &mut projectiles {
        lifetime.0.tick(time.delta());
        if lifetime.0.is_finished() {
            commands.entity(entity).try_despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Projectile>()
        .register_type::<Lifetime>()
        .register_type::<IgnoredColliders>()
        .add_message::<ProjectileContact>();

    app.add_systems(
        FixedUpdate,
        expire_projectiles
            .in_set(GameSet::Projectiles)
            .run_if(gameplay_running),
    );
    app.add_systems(
        FixedPostUpdate,
        (detect_projectile_contacts, resolve_projectile_contacts)
            .chain()
            .in_set(GameSet::Contacts)
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::damage::{DamageDispatchPolicy, DamageRecipient, RecipientKind};
    use crate::gameplay::fx::SoundId;
    use crate::testing::{
        assert_entity_count, drain_messages, nearly_expire_timer, use_manual_time, write_message,
    };
    use bevy::ecs::system::RunSystemOnce;
    use pretty_assertions::assert_eq;

    fn create_contact_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<DamageDispatchPolicy>()
            .init_resource::<Messages<CollisionStart>>()
            .add_message::<ProjectileContact>()
            .add_message::<TakeDamage>()
            .add_message::<VfxRequest>()
            .add_message::<AudioCue>();
        app.add_systems(
            Update,
            (detect_projectile_contacts, resolve_projectile_contacts).chain(),
        );
        app
    }

    fn spawn_weapon(world: &mut World) -> Entity {
        world.spawn(Weapon::enemy_rifle(25.0, 1.0)).id()
    }

    fn spawn_round(world: &mut World, weapon: Entity, at: Vec2) -> Entity {
        world
            .spawn((
                Projectile::new(weapon, &Weapon::enemy_rifle(25.0, 1.0), Dir3::X, 0.0),
                Faction::Enemy,
                Position(at),
            ))
            .id()
    }

    fn collision(collider1: Entity, collider2: Entity) -> CollisionStart {
        CollisionStart {
            collider1,
            collider2,
            body1: Some(collider1),
            body2: Some(collider2),
        }
    }

    #[test]
    fn contact_with_recipient_resolves_fully() {
        let mut app = create_contact_test_app();
        let weapon = spawn_weapon(app.world_mut());
        let target = app
            .world_mut()
            .spawn(DamageRecipient(RecipientKind::Prop))
            .id();
        let round = spawn_round(app.world_mut(), weapon, Vec2::new(3.0, 4.0));

        write_message(&mut app, collision(round, target));
        app.update();

        let hits = drain_messages::<TakeDamage>(&mut app);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].recipient, target);
        assert_eq!(hits[0].damage, 25.0);
        assert_eq!(hits[0].contact_point, Vec2::new(3.0, 4.0));
        assert_eq!(hits[0].faction, Faction::Enemy);

        let vfx = drain_messages::<VfxRequest>(&mut app);
        assert_eq!(
            vfx,
            vec![VfxRequest {
                effect: VfxKind::Impact,
                point: Vec2::new(3.0, 4.0),
                facing: -Vec2::X,
            }]
        );

        let cues = drain_messages::<AudioCue>(&mut app);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].sound, SoundId::WorldHit);

        assert_entity_count::<With<Projectile>>(&mut app, 0);
    }

    #[test]
    fn trigger_and_collision_in_same_step_resolve_once() {
        let mut app = create_contact_test_app();
        let weapon = spawn_weapon(app.world_mut());
        let body = app
            .world_mut()
            .spawn(DamageRecipient(RecipientKind::Player))
            .id();
        let hurtbox = app.world_mut().spawn((Sensor, ChildOf(body))).id();
        let round = spawn_round(app.world_mut(), weapon, Vec2::ZERO);

        write_message(&mut app, collision(hurtbox, round));
        write_message(&mut app, collision(round, body));
        app.update();

        assert_eq!(drain_messages::<TakeDamage>(&mut app).len(), 1);
        assert_eq!(drain_messages::<VfxRequest>(&mut app).len(), 1);
        assert_eq!(drain_messages::<AudioCue>(&mut app).len(), 1);
    }

    #[test]
    fn sensor_contacts_are_triggers() {
        let mut world = World::new();
        world.init_resource::<Messages<CollisionStart>>();
        world.init_resource::<Messages<ProjectileContact>>();
        let weapon = spawn_weapon(&mut world);
        let sensor = world.spawn(Sensor).id();
        let wall = world.spawn_empty().id();
        let round_a = spawn_round(&mut world, weapon, Vec2::ZERO);
        let round_b = spawn_round(&mut world, weapon, Vec2::ZERO);
        world.write_message(collision(round_a, sensor));
        world.write_message(collision(wall, round_b));

        world.run_system_once(detect_projectile_contacts).unwrap();

        let kinds: Vec<(Entity, ContactKind)> = world
            .resource_mut::<Messages<ProjectileContact>>()
            .drain()
            .map(|contact| (contact.struck, contact.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(sensor, ContactKind::Trigger), (wall, ContactKind::Collision)]
        );
    }

    #[test]
    fn non_projectile_collisions_are_ignored() {
        let mut app = create_contact_test_app();
        let a = app.world_mut().spawn_empty().id();
        let b = app.world_mut().spawn_empty().id();

        write_message(&mut app, collision(a, b));
        app.update();

        assert!(drain_messages::<VfxRequest>(&mut app).is_empty());
    }

    #[test]
    fn round_outliving_its_weapon_still_hits() {
        let mut app = create_contact_test_app();
        let weapon = spawn_weapon(app.world_mut());
        let target = app
            .world_mut()
            .spawn(DamageRecipient(RecipientKind::Enemy))
            .id();
        let round = spawn_round(app.world_mut(), weapon, Vec2::ZERO);
        app.world_mut().despawn(weapon);

        write_message(&mut app, collision(round, target));
        app.update();

        let hits = drain_messages::<TakeDamage>(&mut app);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].recipient, target);
        assert_eq!(hits[0].damage, 25.0);
        assert_eq!(hits[0].weapon, weapon);

        let vfx = drain_messages::<VfxRequest>(&mut app);
        assert_eq!(vfx.len(), 1);
        assert_eq!(vfx[0].effect, VfxKind::Impact);

        assert!(drain_messages::<AudioCue>(&mut app).is_empty());
        assert_entity_count::<With<Projectile>>(&mut app, 0);
    }

    #[test]
    fn unclaimed_rounds_expire() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, expire_projectiles);
        use_manual_time(&mut app, Duration::from_millis(20));

        let mut lifetime = Lifetime::default();
        nearly_expire_timer(&mut lifetime.0);
        let round = Projectile::new(Entity::PLACEHOLDER, &Weapon::pistol(), Dir3::Y, 0.0);
        app.world_mut().spawn((round, lifetime));
        app.world_mut().spawn((round, Lifetime::default()));

        app.update();

        assert_entity_count::<With<Projectile>>(&mut app, 1);
    }

    #[test]
    fn firer_colliders_cover_whole_hierarchy() {
        let mut world = World::new();
        let root = world.spawn(Collider::circle(5.0)).id();
        let hurtbox = world.spawn((Collider::circle(6.0), ChildOf(root))).id();
        let muzzle = world.spawn(ChildOf(root)).id();

        let mut found = world
            .run_system_once(move |firer: FirerColliders| firer.of(root))
            .unwrap();
        found.sort();

        let mut expected = vec![root, hurtbox];
        expected.sort();
        assert_eq!(found, expected);
        assert!(!found.contains(&muzzle));
    }
}
