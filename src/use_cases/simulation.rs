// Roster owner and the I/O-free tick: integrate, schedule, build PDUs.

use super::factory::PduFactory;
use super::scheduler::{EventScheduler, ScheduledEvent};
use super::spawn::{RosterIdentity, spawn_roster};
use super::types::SimulationSettings;
use crate::domain::ports::GeodeticConverter;
use crate::domain::state::EntityState;
use crate::domain::systems::kinematics::{self, WorldBounds};
use crate::domain::tuning::events::EventTuning;
use crate::domain::tuning::spawn::SpawnTuning;
use crate::domain::{AbsoluteTimestamp, Pdu};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Simulation<R> {
    roster: Vec<EntityState>,
    bounds: WorldBounds,
    scheduler: EventScheduler,
    factory: PduFactory,
    rng: R,
    // Simulation seconds since the first tick.
    now: f64,
    ticks: u64,
    events: Vec<ScheduledEvent>,
}

impl Simulation<StdRng> {
    /// Spawns the roster for `settings` and seeds the generator from
    /// `rng_seed` when one is given.
    pub fn from_settings(
        settings: &SimulationSettings,
        spawn: &SpawnTuning,
        events: EventTuning,
        converter: &dyn GeodeticConverter,
    ) -> Self {
        let mut rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (roster, bounds) = spawn_roster(
            RosterIdentity {
                protocol_version: settings.protocol_version,
                site_id: settings.site_id,
                application_id: settings.application_id,
                entity_count: settings.entity_count,
            },
            spawn,
            converter,
            &mut rng,
        );
        let factory = PduFactory::new(
            settings.protocol_version,
            settings.exercise_id,
            settings.site_id,
            settings.application_id,
            events,
        );

        Simulation::new(
            roster,
            bounds,
            EventScheduler::new(settings.target_rate, events),
            factory,
            rng,
        )
    }
}

impl<R: Rng> Simulation<R> {
    pub fn new(
        roster: Vec<EntityState>,
        bounds: WorldBounds,
        scheduler: EventScheduler,
        factory: PduFactory,
        rng: R,
    ) -> Self {
        Self {
            roster,
            bounds,
            scheduler,
            factory,
            rng,
            now: 0.0,
            ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn roster(&self) -> &[EntityState] {
        &self.roster
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances every entity by `dt` seconds, then runs the scheduler for it.
    /// PDUs are built right after each entity is scheduled, so they carry the
    /// roster exactly as it stood at that point.
    pub fn tick(&mut self, dt: f64, timestamp: AbsoluteTimestamp) -> Vec<Pdu> {
        let dt = EventScheduler::guard_dt(dt);
        self.now += dt;
        self.ticks += 1;

        let mut pdus = Vec::new();
        for index in 0..self.roster.len() {
            kinematics::advance(&mut self.roster[index], dt, &self.bounds);

            self.events.clear();
            self.scheduler.schedule(
                &mut self.roster,
                index,
                self.now,
                dt,
                &mut self.rng,
                &mut self.events,
            );
            for event in &self.events {
                if let Some(pdu) = self.factory.build(event, &self.roster, self.now, timestamp) {
                    pdus.push(pdu);
                }
            }
        }
        pdus
    }
}
