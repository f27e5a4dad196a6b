//! Avian2d physics configuration for the top-down arena.

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::gameplay::Faction;
use crate::gameplay::arena::METER;
use crate::gameplay::projectile::IgnoredColliders;

// === Collision Layers ===

/// Physics collision layers.
///
/// Projectiles are split by faction so the player only ever overlaps
/// enemy fire, while enemy fire can still strike other enemies and props.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum CollisionLayer {
    #[default]
    Default,
    /// Static arena geometry.
    World,
    /// Loose physics objects that react to impacts.
    Props,
    /// Player body and hurtbox.
    Player,
    /// Enemy bodies.
    Enemy,
    /// Rounds fired by the player's weapon.
    PlayerProjectile,
    /// Rounds fired by enemy weapons.
    EnemyProjectile,
}

impl CollisionLayer {
    /// Projectile layer for rounds fired by the given faction.
    #[must_use]
    pub const fn projectile_of(faction: Faction) -> Self {
        match faction {
            Faction::Player => Self::PlayerProjectile,
            Faction::Enemy => Self::EnemyProjectile,
        }
    }
}

/// Walls and other static geometry collide with everything.
#[must_use]
pub fn world_layers() -> CollisionLayers {
    CollisionLayers::new(CollisionLayer::World, LayerMask::ALL)
}

/// Props collide with everything.
#[must_use]
pub fn prop_layers() -> CollisionLayers {
    CollisionLayers::new(CollisionLayer::Props, LayerMask::ALL)
}

/// Solid player body. Does not stop the player's own rounds.
#[must_use]
pub fn player_body_layers() -> CollisionLayers {
    CollisionLayers::new(
        CollisionLayer::Player,
        [
            CollisionLayer::World,
            CollisionLayer::Props,
            CollisionLayer::Enemy,
            CollisionLayer::EnemyProjectile,
        ],
    )
}

/// Player hurtbox sensor: only enemy rounds register.
#[must_use]
pub fn player_hurtbox_layers() -> CollisionLayers {
    CollisionLayers::new(CollisionLayer::Player, CollisionLayer::EnemyProjectile)
}

/// Enemy bodies are hit by both factions' rounds.
#[must_use]
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(CollisionLayer::Enemy, LayerMask::ALL)
}

/// Rounds never collide with other rounds.
#[must_use]
pub fn projectile_layers(faction: Faction) -> CollisionLayers {
    let target = match faction {
        Faction::Player => CollisionLayer::Enemy,
        Faction::Enemy => CollisionLayer::Player,
    };
    CollisionLayers::new(
        CollisionLayer::projectile_of(faction),
        [
            CollisionLayer::World,
            CollisionLayer::Props,
            CollisionLayer::Enemy,
            target,
        ],
    )
}

// === Collision Hooks ===

/// Drops contact pairs between a projectile and its firer's colliders.
#[derive(SystemParam)]
pub struct ProjectileHooks<'w, 's> {
    ignored: Query<'w, 's, &'static IgnoredColliders>,
}

impl ProjectileHooks<'_, '_> {
    fn ignores(&self, projectile: Entity, other: Entity) -> bool {
        self.ignored
            .get(projectile)
            .is_ok_and(|ignored| ignored.contains(other))
    }
}

impl CollisionHooks for ProjectileHooks<'_, '_> {
    fn filter_pairs(&self, collider1: Entity, collider2: Entity, _commands: &mut Commands) -> bool {
        !self.ignores(collider1, collider2) && !self.ignores(collider2, collider1)
    }
}

// === Plugin ===

pub(crate) fn plugin(app: &mut App) {
    app.add_plugins(
        PhysicsPlugins::default()
            .with_length_unit(METER)
            .with_collision_hooks::<ProjectileHooks>(),
    );
    app.insert_resource(Gravity::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn layers_interact(a: CollisionLayers, b: CollisionLayers) -> bool {
        a.interacts_with(b)
    }

    #[test]
    fn enemy_rounds_reach_player_hurtbox() {
        assert!(layers_interact(
            projectile_layers(Faction::Enemy),
            player_hurtbox_layers()
        ));
    }

    #[test]
    fn player_rounds_skip_player() {
        assert!(!layers_interact(
            projectile_layers(Faction::Player),
            player_body_layers()
        ));
        assert!(!layers_interact(
            projectile_layers(Faction::Player),
            player_hurtbox_layers()
        ));
    }

    #[test]
    fn both_factions_hit_enemies_and_walls() {
        for faction in [Faction::Player, Faction::Enemy] {
            assert!(layers_interact(projectile_layers(faction), enemy_layers()));
            assert!(layers_interact(projectile_layers(faction), world_layers()));
            assert!(layers_interact(projectile_layers(faction), prop_layers()));
        }
    }

    #[test]
    fn rounds_do_not_collide_with_rounds() {
        assert!(!layers_interact(
            projectile_layers(Faction::Player),
            projectile_layers(Faction::Enemy)
        ));
    }

    fn filter(world: &mut World, a: Entity, b: Entity) -> bool {
        world
            .run_system_once(
                move |hooks: ProjectileHooks, mut commands: Commands| {
                    hooks.filter_pairs(a, b, &mut commands)
                },
            )
            .unwrap()
    }

    #[test]
    fn hooks_reject_firer_colliders_in_either_order() {
        let mut world = World::new();
        let firer = world.spawn_empty().id();
        let bystander = world.spawn_empty().id();
        let projectile = world.spawn(IgnoredColliders::new(vec![firer])).id();

        assert!(!filter(&mut world, projectile, firer));
        assert!(!filter(&mut world, firer, projectile));
        assert!(filter(&mut world, projectile, bystander));
    }

    #[test]
    fn hooks_accept_pairs_without_exclusions() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        assert!(filter(&mut world, a, b));
    }
}
