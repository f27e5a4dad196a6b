//! `vleue_navigator` navmesh configuration for enemy pathfinding.

use avian2d::prelude::*;
use bevy::prelude::*;
use vleue_navigator::prelude::*;

/// Marker: this entity's `Collider` is a navmesh obstacle.
/// Add to walls and cover blocks. Never to actors, props, or projectiles.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct NavObstacle;

/// Spawns the arena navmesh covering `size`, anchored at the origin.
/// Obstacles are cut out by `NavmeshUpdaterPlugin` as `NavObstacle` colliders appear.
pub fn spawn_navmesh(commands: &mut Commands, size: Vec2, agent_radius: f32) {
    commands.spawn((
        Name::new("Arena NavMesh"),
        NavMeshSettings {
            fixed: Triangulation::from_outer_edges(&[
                Vec2::ZERO,
                Vec2::new(size.x, 0.0),
                size,
                Vec2::new(0.0, size.y),
            ]),
            agent_radius,
            ..default()
        },
        NavMeshUpdateMode::Direct,
        Transform::default(),
    ));
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<NavObstacle>();
    app.add_plugins((
        VleueNavigatorPlugin,
        NavmeshUpdaterPlugin::<Collider, NavObstacle>::default(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use pretty_assertions::assert_eq;

    #[test]
    fn navmesh_settings_cover_requested_area() {
        let mut world = World::new();
        world
            .run_system_once(|mut commands: Commands| {
                spawn_navmesh(&mut commands, Vec2::new(640.0, 480.0), 12.0);
            })
            .unwrap();

        let mut query = world.query::<&NavMeshSettings>();
        let settings = query.single(&world).unwrap();
        assert_eq!(settings.agent_radius, 12.0);
        assert_eq!(
            query.iter(&world).count(),
            1,
            "exactly one navmesh per arena"
        );
    }
}
