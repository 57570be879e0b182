//! Per-entity decision of which PDUs go out on a tick.
//!
//! EntityState is driven by an independent per-entity rate limiter. The nine
//! secondary kinds each pass an independent probability gate whose chance is
//! scaled by how many nominal emission intervals the tick covered, so the
//! long-run event rate does not depend on tick length.

use crate::domain::PduKind;
use crate::domain::state::EntityState;
use crate::domain::tuning::events::EventTuning;
use rand::Rng;

/// Smallest `dt` the scheduler will use, in seconds.
pub const MIN_DT: f64 = 1e-3;

// Absorbs accumulated rounding when `now` is a sum of tick lengths.
const DUE_EPSILON: f64 = 1e-9;

/// Secondary kinds in sampling order.
pub const SECONDARY_KINDS: [PduKind; 9] = [
    PduKind::Fire,
    PduKind::Detonation,
    PduKind::Collision,
    PduKind::Data,
    PduKind::ActionRequest,
    PduKind::StartResume,
    PduKind::SetData,
    PduKind::Designator,
    PduKind::ElectromagneticEmission,
];

/// Kinds that need a second roster entity as their target.
pub fn is_targeted(kind: PduKind) -> bool {
    matches!(
        kind,
        PduKind::Fire
            | PduKind::Detonation
            | PduKind::Collision
            | PduKind::Data
            | PduKind::ActionRequest
    )
}

/// One PDU to build. Indices point into the roster for this tick only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub kind: PduKind,
    pub source: usize,
    pub target: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct EventScheduler {
    target_rate: f64,
    tuning: EventTuning,
}

impl EventScheduler {
    /// `target_rate` is EntityState sends per entity per second.
    pub fn new(target_rate: f64, tuning: EventTuning) -> Self {
        Self { target_rate, tuning }
    }

    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    /// Nominal seconds between EntityState sends for one entity.
    pub fn interval(&self) -> f64 {
        1.0 / self.target_rate
    }

    pub fn guard_dt(dt: f64) -> f64 {
        // `max` also maps NaN to the floor.
        dt.max(MIN_DT)
    }

    pub fn entity_state_due(&self, entity: &EntityState, now: f64) -> bool {
        now - entity.last_sent_at + DUE_EPSILON >= self.interval()
    }

    /// Chance that `kind` fires during a tick of length `dt`.
    pub fn gate(&self, kind: PduKind, dt: f64) -> f64 {
        (self.tuning.probability(kind) * dt * self.target_rate).clamp(0.0, 1.0)
    }

    /// Appends this entity's events for the tick and stamps `last_sent_at`
    /// when an EntityState is due.
    pub fn schedule<R: Rng>(
        &self,
        roster: &mut [EntityState],
        source: usize,
        now: f64,
        dt: f64,
        rng: &mut R,
        out: &mut Vec<ScheduledEvent>,
    ) {
        let dt = Self::guard_dt(dt);
        let count = roster.len();
        let Some(entity) = roster.get_mut(source) else {
            return;
        };

        if self.entity_state_due(entity, now) {
            entity.last_sent_at = now;
            out.push(ScheduledEvent {
                kind: PduKind::EntityState,
                source,
                target: None,
            });
        }

        for kind in SECONDARY_KINDS {
            let chance = self.gate(kind, dt);
            if rng.gen_range(0.0..1.0) >= chance {
                continue;
            }

            if !is_targeted(kind) {
                out.push(ScheduledEvent {
                    kind,
                    source,
                    target: None,
                });
                continue;
            }

            // A targeted event with nobody else around is dropped.
            if count < 2 {
                continue;
            }
            let mut target = rng.gen_range(0..count - 1);
            if target >= source {
                target += 1;
            }
            out.push(ScheduledEvent {
                kind,
                source,
                target: Some(target),
            });
        }
    }
}
