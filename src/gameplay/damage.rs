//! Damage protocol: recipients, `TakeDamage` messages, and dispatch planning.
//!
//! A projectile that strikes something does not know what it hit. It asks
//! [`RecipientLookup`] for every [`DamageRecipient`] in the struck entity's
//! ancestor and descendant chains and writes one [`TakeDamage`] per planned
//! delivery. Each recipient kind consumes those messages in its own module:
//! enemies in `enemy`, the player in `player`, props here.

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::Faction;
use super::enemy::Enemy;
use crate::{GameSet, gameplay_running};

// === Components ===

/// What kind of actor consumes the damage protocol on this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum RecipientKind {
    Player,
    Enemy,
    /// Loose physics object that is shoved by impacts but has no health.
    Prop,
}

/// Marks an entity as a damage recipient.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct DamageRecipient(pub RecipientKind);

/// Marker for props that take an impulse when hit.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ImpactReactive;

// === Messages ===

/// One delivery of a hit to one recipient.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct TakeDamage {
    pub recipient: Entity,
    pub weapon: Entity,
    pub projectile: Entity,
    pub contact_point: Vec2,
    /// Damage the round carried from its weapon.
    pub damage: f32,
    /// Travel direction times the round's impact force.
    pub impulse: Vec2,
    /// Side that fired the round.
    pub faction: Faction,
}

// === Resources ===

/// How contact resolution fans a hit out to recipients.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Resource)]
pub enum DamageDispatchPolicy {
    /// Every recipient receives the hit at most once.
    #[default]
    Deduplicated,
    /// Ancestors and descendants are concatenated (the struck entity appears
    /// in both), delivered, then the nearest player ancestor is hit again,
    /// then the concatenated list is delivered a second time.
    Legacy,
}

// === Dispatch Planning ===

/// Orders deliveries for one contact.
///
/// `ancestors` and `descendants` are the recipients found walking up and
/// down from the struck entity, both starting with the struck entity itself.
/// `player` is the nearest player recipient in the ancestor chain.
#[must_use]
pub fn plan_dispatch(
    policy: DamageDispatchPolicy,
    ancestors: &[Entity],
    descendants: &[Entity],
    player: Option<Entity>,
) -> Vec<Entity> {
    match policy {
        DamageDispatchPolicy::Deduplicated => {
            let mut plan: Vec<Entity> = Vec::new();
            for &entity in ancestors.iter().chain(descendants).chain(player.iter()) {
                if !plan.contains(&entity) {
                    plan.push(entity);
                }
            }
            plan
        }
        DamageDispatchPolicy::Legacy => {
            let takers: Vec<Entity> = ancestors.iter().chain(descendants).copied().collect();
            let mut plan = takers.clone();
            plan.extend(player);
            plan.extend(takers);
            plan
        }
    }
}

/// Hierarchy queries used to find recipients around a struck entity.
#[derive(SystemParam)]
pub struct RecipientLookup<'w, 's> {
    parents: Query<'w, 's, &'static ChildOf>,
    children: Query<'w, 's, &'static Children>,
    recipients: Query<'w, 's, &'static DamageRecipient>,
    enemies: Query<'w, 's, (), With<Enemy>>,
    policy: Res<'w, DamageDispatchPolicy>,
}

impl RecipientLookup<'_, '_> {
    /// `struck` followed by its parent, grandparent, and so on.
    fn self_and_ancestors(&self, struck: Entity) -> Vec<Entity> {
        let mut chain = vec![struck];
        let mut current = struck;
        while let Ok(child_of) = self.parents.get(current) {
            current = child_of.parent();
            chain.push(current);
        }
        chain
    }

    /// `struck` followed by its whole subtree, depth first.
    fn self_and_descendants(&self, struck: Entity) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut stack = vec![struck];
        while let Some(entity) = stack.pop() {
            found.push(entity);
            if let Ok(children) = self.children.get(entity) {
                stack.extend(children.iter());
            }
        }
        found
    }

    /// Deliveries for a hit on `struck`, in order, under the active policy.
    #[must_use]
    pub fn dispatch_targets(&self, struck: Entity) -> Vec<Entity> {
        let ancestors: Vec<Entity> = self
            .self_and_ancestors(struck)
            .into_iter()
            .filter(|&entity| self.recipients.contains(entity))
            .collect();
        let descendants: Vec<Entity> = self
            .self_and_descendants(struck)
            .into_iter()
            .filter(|&entity| self.recipients.contains(entity))
            .collect();
        let player = ancestors.iter().copied().find(|&entity| {
            self.recipients
                .get(entity)
                .is_ok_and(|recipient| recipient.0 == RecipientKind::Player)
        });
        plan_dispatch(*self.policy, &ancestors, &descendants, player)
    }

    /// Whether any entity from `struck` upward is an enemy.
    #[must_use]
    pub fn hit_enemy(&self, struck: Entity) -> bool {
        self.self_and_ancestors(struck)
            .into_iter()
            .any(|entity| self.enemies.contains(entity))
    }
}

// === Systems ===

/// Props turn a hit into a velocity change of `impulse / mass`.
fn push_props(
    mut hits: MessageReader<TakeDamage>,
    mut props: Query<(&mut LinearVelocity, &ComputedMass), With<ImpactReactive>>,
) {
    for hit in hits.read() {
        let Ok((mut velocity, mass)) = props.get_mut(hit.recipient) else {
            continue;
        };
        velocity.0 += hit.impulse * mass.inverse();
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<DamageRecipient>()
        .register_type::<ImpactReactive>()
        .register_type::<DamageDispatchPolicy>()
        .init_resource::<DamageDispatchPolicy>()
        .add_message::<TakeDamage>();

    app.add_systems(
        FixedPostUpdate,
        push_props.in_set(GameSet::Damage).run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entities(n: u32) -> Vec<Entity> {
        (1..=n).map(|i| Entity::from_bits(u64::from(i))).collect()
    }

    #[test]
    fn deduplicated_hits_struck_recipient_once() {
        let e = entities(1);
        let plan = plan_dispatch(DamageDispatchPolicy::Deduplicated, &e, &e, None);
        assert_eq!(plan, vec![e[0]]);
    }

    #[test]
    fn legacy_hits_struck_recipient_four_times() {
        let e = entities(1);
        let plan = plan_dispatch(DamageDispatchPolicy::Legacy, &e, &e, None);
        assert_eq!(plan, vec![e[0]; 4]);
    }

    #[test]
    fn legacy_player_path_adds_one_more_delivery() {
        // Struck hurtbox child carries no recipient; the player root does.
        let e = entities(1);
        let plan = plan_dispatch(DamageDispatchPolicy::Legacy, &e, &[], Some(e[0]));
        assert_eq!(plan, vec![e[0]; 3]);

        let plan = plan_dispatch(DamageDispatchPolicy::Deduplicated, &e, &[], Some(e[0]));
        assert_eq!(plan, vec![e[0]]);
    }

    #[test]
    fn deduplicated_keeps_independent_recipients() {
        // Ragdoll part (struck) under a reactive parent: both get one hit.
        let e = entities(2);
        let (part, parent) = (e[0], e[1]);
        let plan = plan_dispatch(
            DamageDispatchPolicy::Deduplicated,
            &[part, parent],
            &[part],
            None,
        );
        assert_eq!(plan, vec![part, parent]);
    }

    #[test]
    fn no_recipients_means_no_deliveries() {
        for policy in [DamageDispatchPolicy::Deduplicated, DamageDispatchPolicy::Legacy] {
            assert!(plan_dispatch(policy, &[], &[], None).is_empty());
        }
    }

    #[test]
    fn default_policy_is_deduplicated() {
        assert_eq!(
            DamageDispatchPolicy::default(),
            DamageDispatchPolicy::Deduplicated
        );
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use pretty_assertions::assert_eq;

    fn targets_for(world: &mut World, struck: Entity) -> Vec<Entity> {
        world
            .run_system_once(move |lookup: RecipientLookup| lookup.dispatch_targets(struck))
            .unwrap()
    }

    fn create_lookup_world(policy: DamageDispatchPolicy) -> World {
        let mut world = World::new();
        world.insert_resource(policy);
        world
    }

    #[test]
    fn walks_ancestors_and_descendants() {
        let mut world = create_lookup_world(DamageDispatchPolicy::Deduplicated);
        let root = world
            .spawn(DamageRecipient(RecipientKind::Prop))
            .id();
        let middle = world.spawn(ChildOf(root)).id();
        let leaf = world
            .spawn((DamageRecipient(RecipientKind::Prop), ChildOf(middle)))
            .id();
        let unrelated = world.spawn(DamageRecipient(RecipientKind::Prop)).id();

        let targets = targets_for(&mut world, middle);

        assert_eq!(targets, vec![root, leaf]);
        assert!(!targets.contains(&unrelated));
    }

    #[test]
    fn player_hurtbox_resolves_to_player_root() {
        let mut world = create_lookup_world(DamageDispatchPolicy::Legacy);
        let player = world
            .spawn(DamageRecipient(RecipientKind::Player))
            .id();
        let hurtbox = world.spawn(ChildOf(player)).id();

        let targets = targets_for(&mut world, hurtbox);

        assert_eq!(targets, vec![player; 3]);
    }

    #[test]
    fn enemy_tag_found_through_parents() {
        let mut world = create_lookup_world(DamageDispatchPolicy::Deduplicated);
        let enemy = world.spawn(Enemy::test_default()).id();
        let limb = world.spawn(ChildOf(enemy)).id();
        let wall = world.spawn_empty().id();

        let (limb_hit, wall_hit) = world
            .run_system_once(move |lookup: RecipientLookup| {
                (lookup.hit_enemy(limb), lookup.hit_enemy(wall))
            })
            .unwrap();

        assert!(limb_hit);
        assert!(!wall_hit);
    }

    #[test]
    fn props_gain_velocity_along_impulse() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<TakeDamage>();
        app.add_systems(Update, push_props);

        let prop = app
            .world_mut()
            .spawn((
                ImpactReactive,
                LinearVelocity::ZERO,
                ComputedMass::new(2.0),
            ))
            .id();
        app.world_mut().write_message(TakeDamage {
            recipient: prop,
            weapon: prop,
            projectile: prop,
            contact_point: Vec2::ZERO,
            damage: 10.0,
            impulse: Vec2::new(100.0, 0.0),
            faction: Faction::Player,
        });
        app.update();

        let velocity = app.world().get::<LinearVelocity>(prop).unwrap();
        assert_eq!(velocity.0, Vec2::new(50.0, 0.0));
    }
}
