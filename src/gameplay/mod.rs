//! Gameplay domain: arena, combatants, weapons, projectiles, damage, and spawning.

pub mod arena;
pub mod damage;
pub mod enemy;
pub mod fx;
pub mod hud;
pub mod navigation;
pub mod player;
pub mod projectile;
pub mod spawner;
pub mod weapon;

use bevy::prelude::*;

// === Shared Components ===

/// Which side an actor or a round belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Faction {
    Player,
    Enemy,
}

/// Hit points. `current` stays within `0..=max`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Remaining health as a fraction of max, in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Applies `damage` and reports whether this call crossed zero.
    /// Already-dead health is left untouched and never reports a crossing.
    pub fn take(&mut self, damage: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.current = apply_damage(self.current, damage);
        !self.is_alive()
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

/// Marker inserted at the zero crossing. Death handling runs once per actor;
/// entities carrying `Dead` ignore further damage.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// `max(health - damage, 0)`. Negative damage is treated as zero so a hit
/// can never heal.
#[must_use]
pub fn apply_damage(health: f32, damage: f32) -> f32 {
    (health - damage.max(0.0)).max(0.0)
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Faction>()
        .register_type::<Health>()
        .register_type::<Dead>();

    app.add_plugins((
        arena::plugin,
        damage::plugin,
        enemy::plugin,
        fx::plugin,
        hud::plugin,
        navigation::plugin,
        player::plugin,
        projectile::plugin,
        spawner::plugin,
        weapon::plugin,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_damage_subtracts() {
        assert_eq!(apply_damage(100.0, 25.0), 75.0);
    }

    #[test]
    fn apply_damage_clamps_at_zero() {
        assert_eq!(apply_damage(10.0, 999.0), 0.0);
        assert_eq!(apply_damage(0.0, 5.0), 0.0);
    }

    #[test]
    fn apply_damage_never_heals() {
        for health in [0.0, 1.0, 50.0, 100.0] {
            for damage in [0.0, 0.5, 10.0, 1000.0] {
                let result = apply_damage(health, damage);
                assert!(result >= 0.0);
                assert!(result <= health);
            }
        }
        assert_eq!(apply_damage(50.0, -10.0), 50.0);
    }

    #[test]
    fn health_new_sets_current_to_max() {
        let health = Health::new(100.0);
        assert_eq!(health.current, 100.0);
        assert_eq!(health.max, 100.0);
        assert!(health.is_alive());
    }

    #[test]
    fn take_reports_crossing_once() {
        let mut health = Health::new(100.0);
        assert!(!health.take(40.0));
        assert!(health.take(999.0));
        assert!(!health.take(999.0));
        assert_eq!(health.current, 0.0);
    }

    #[test]
    fn fraction_handles_zero_max() {
        let health = Health { current: 0.0, max: 0.0 };
        assert_eq!(health.fraction(), 0.0);
        assert_eq!(Health::new(80.0).fraction(), 1.0);
    }

    #[test]
    fn restore_refills() {
        let mut health = Health::new(100.0);
        health.take(100.0);
        health.restore();
        assert_eq!(health.current, 100.0);
    }
}
