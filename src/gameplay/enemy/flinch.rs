//! Hit reaction: a short crouch followed by a cooldown before the next one.

use bevy::prelude::*;

/// Seconds an enemy stays down after a hit.
pub const CROUCH_DURATION_SECS: f64 = 1.0;

/// Seconds after standing up before another hit can make it crouch.
pub const CROUCH_COOLDOWN_SECS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FlinchPhase {
    Ready,
    Crouching { until: f64 },
    Cooldown { until: f64 },
}

/// Flinch gate. Independent of the shoot loop's schedule.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Flinch {
    pub phase: FlinchPhase,
}

impl Default for Flinch {
    fn default() -> Self {
        Self {
            phase: FlinchPhase::Ready,
        }
    }
}

impl Flinch {
    #[must_use]
    pub const fn can_crouch(&self) -> bool {
        matches!(self.phase, FlinchPhase::Ready)
    }

    #[must_use]
    pub const fn is_crouching(&self) -> bool {
        matches!(self.phase, FlinchPhase::Crouching { .. })
    }
}

/// Phase change reported by [`advance_flinch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlinchStep {
    StoodUp,
    Rearmed,
}

/// Starts a crouch if the gate is open. Returns whether one started.
/// Hits while crouching or cooling down leave every deadline untouched.
pub fn begin_flinch(flinch: &mut Flinch, now: f64) -> bool {
    if !flinch.can_crouch() {
        return false;
    }
    flinch.phase = FlinchPhase::Crouching {
        until: now + CROUCH_DURATION_SECS,
    };
    true
}

/// Moves through `Crouching -> Cooldown -> Ready` as deadlines pass.
/// The cooldown is measured from the scheduled stand-up time, so a late tick
/// does not stretch it.
pub fn advance_flinch(flinch: &mut Flinch, now: f64) -> Option<FlinchStep> {
    match flinch.phase {
        FlinchPhase::Crouching { until } if now >= until => {
            flinch.phase = FlinchPhase::Cooldown {
                until: until + CROUCH_COOLDOWN_SECS,
            };
            Some(FlinchStep::StoodUp)
        }
        FlinchPhase::Cooldown { until } if now >= until => {
            flinch.phase = FlinchPhase::Ready;
            Some(FlinchStep::Rearmed)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_cycle() {
        let mut flinch = Flinch::default();
        assert!(begin_flinch(&mut flinch, 10.0));
        assert!(flinch.is_crouching());

        assert_eq!(advance_flinch(&mut flinch, 10.5), None);
        assert_eq!(advance_flinch(&mut flinch, 11.0), Some(FlinchStep::StoodUp));
        assert_eq!(flinch.phase, FlinchPhase::Cooldown { until: 16.0 });
        assert!(!flinch.can_crouch());

        assert_eq!(advance_flinch(&mut flinch, 15.9), None);
        assert_eq!(advance_flinch(&mut flinch, 16.0), Some(FlinchStep::Rearmed));
        assert!(flinch.can_crouch());
    }

    #[test]
    fn hits_while_crouching_do_not_extend() {
        let mut flinch = Flinch::default();
        begin_flinch(&mut flinch, 0.0);
        assert!(!begin_flinch(&mut flinch, 0.5));
        assert_eq!(flinch.phase, FlinchPhase::Crouching { until: 1.0 });
    }

    #[test]
    fn hits_during_cooldown_do_not_restart() {
        let mut flinch = Flinch::default();
        begin_flinch(&mut flinch, 0.0);
        advance_flinch(&mut flinch, 1.0);
        assert!(!begin_flinch(&mut flinch, 3.0));
        assert_eq!(flinch.phase, FlinchPhase::Cooldown { until: 6.0 });
    }

    #[test]
    fn late_tick_keeps_cooldown_deadline() {
        let mut flinch = Flinch::default();
        begin_flinch(&mut flinch, 0.0);
        advance_flinch(&mut flinch, 1.3);
        assert_eq!(flinch.phase, FlinchPhase::Cooldown { until: 6.0 });
    }

    #[allow(clippy::assertions_on_constants)]
    #[test]
    fn constants_are_valid() {
        assert!(CROUCH_DURATION_SECS > 0.0);
        assert!(CROUCH_COOLDOWN_SECS > 0.0);
    }
}
