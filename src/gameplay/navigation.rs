//! `NavMesh` navigation for enemies: goal tracking, path computation, and steering.

use avian2d::prelude::*;
use bevy::prelude::*;
use vleue_navigator::prelude::*;

use super::arena::METER;
use crate::{GameSet, gameplay_running};

/// An agent is at a waypoint once its center is this close.
const WAYPOINT_REACHED_DISTANCE: f32 = 0.25 * METER;

/// A goal that moved further than this since the last path forces a recompute.
const REPATH_DISTANCE: f32 = 1.0 * METER;

/// Seconds between periodic path recomputations. Picks up goal drift below
/// `REPATH_DISTANCE` and navmesh rebuilds.
const PATH_REFRESH_INTERVAL_SECS: f32 = 0.5;

/// Timer controlling periodic path refresh for all agents.
#[derive(Resource, Debug, Reflect)]
#[reflect(Resource)]
pub struct PathRefreshTimer(pub Timer);

impl Default for PathRefreshTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            PATH_REFRESH_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

/// Movement capability. A halted agent holds still but keeps its goal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Pixels per second.
    pub speed: f32,
    pub halted: bool,
}

impl NavAgent {
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            speed,
            halted: false,
        }
    }
}

/// World-space point the agent is heading for.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavGoal(pub Vec2);

/// Waypoint path from the navmesh toward the current goal.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavPath {
    pub waypoints: Vec<Vec2>,
    /// Index of the next waypoint to steer toward.
    pub current_index: usize,
    /// Goal this path was computed for.
    goal: Option<Vec2>,
}

impl NavPath {
    pub fn set(&mut self, waypoints: Vec<Vec2>, goal: Vec2) {
        self.waypoints = waypoints;
        self.current_index = 0;
        self.goal = Some(goal);
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.current_index = 0;
        self.goal = None;
    }

    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.current_index).copied()
    }

    /// Moves to the next waypoint. Returns true if one remains.
    pub fn advance(&mut self) -> bool {
        self.current_index += 1;
        self.current_index < self.waypoints.len()
    }

    /// A path has been computed and is non-empty.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Every waypoint of a computed path has been consumed.
    #[must_use]
    pub const fn reached(&self) -> bool {
        self.has_path() && self.current_index >= self.waypoints.len()
    }

    #[must_use]
    pub fn needs_recompute(&self, goal: Vec2) -> bool {
        self.goal
            .is_none_or(|previous| previous.distance(goal) > REPATH_DISTANCE)
    }
}

/// Computes paths for agents whose goal moved or whose refresh is due.
/// Runs in `GameSet::Movement` before steering.
fn compute_paths(
    time: Res<Time>,
    mut refresh_timer: ResMut<PathRefreshTimer>,
    mut agents: Query<(&NavGoal, &GlobalTransform, &mut NavPath)>,
    navmeshes: Option<Res<Assets<NavMesh>>>,
    navmesh_query: Option<Single<(&ManagedNavMesh, &NavMeshStatus)>>,
) {
    let Some(navmeshes) = navmeshes else {
        return;
    };
    let Some(inner) = navmesh_query else {
        return;
    };
    let (managed, status) = *inner;
    if *status != NavMeshStatus::Built {
        return;
    }
    let Some(navmesh) = navmeshes.get(managed) else {
        return;
    };

    refresh_timer.0.tick(time.delta());
    let refresh_due = refresh_timer.0.just_finished();

    for (goal, transform, mut nav_path) in &mut agents {
        if !refresh_due && !nav_path.needs_recompute(goal.0) {
            continue;
        }
        let from = transform.translation().xy();
        if let Some(path) = navmesh.path(from, goal.0) {
            nav_path.set(path.path, goal.0);
        } else {
            debug!("no navmesh path from {from} to {}", goal.0);
            nav_path.set(Vec::new(), goal.0);
        }
    }
}

/// Velocity toward the next waypoint, advancing past reached ones.
/// Zero when halted or out of waypoints.
fn steering_velocity(agent: &NavAgent, position: Vec2, nav_path: &mut NavPath) -> Vec2 {
    if agent.halted {
        return Vec2::ZERO;
    }
    let Some(steer_toward) = nav_path.current_waypoint().and_then(|waypoint| {
        if position.distance(waypoint) < WAYPOINT_REACHED_DISTANCE {
            if nav_path.advance() {
                nav_path.current_waypoint()
            } else {
                None
            }
        } else {
            Some(waypoint)
        }
    }) else {
        return Vec2::ZERO;
    };
    (steer_toward - position).normalize_or_zero() * agent.speed
}

/// Runs in `GameSet::Movement` after `compute_paths`.
fn steer_agents(
    mut agents: Query<(&NavAgent, &GlobalTransform, &mut NavPath, &mut LinearVelocity)>,
) {
    for (agent, transform, mut nav_path, mut velocity) in &mut agents {
        velocity.0 = steering_velocity(agent, transform.translation().xy(), &mut nav_path);
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<NavAgent>()
        .register_type::<NavGoal>()
        .register_type::<NavPath>()
        .register_type::<PathRefreshTimer>()
        .init_resource::<PathRefreshTimer>();

    app.add_systems(
        FixedUpdate,
        (compute_paths, steer_agents)
            .chain()
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}
