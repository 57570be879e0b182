// Builds concrete PDU values for scheduled events from the current roster.

use super::scheduler::ScheduledEvent;
use crate::domain::pdu::{
    ActionRequestPdu, BeamGeometry, ClockTime, CollisionPdu, DIS_VERSION_6, DataPdu,
    DatumRecords, DeadReckoningParameters, DesignatorPdu, DetonationPdu, ElectromagneticEmissionPdu,
    EmissionBeam, EmissionSystem, EmitterSystem, EntityStatePdu, EventIdentifier, FirePdu,
    FixedDatum, FundamentalParameters, SetDataPdu, StartResumePdu, VariableDatum, Vector3Float,
};
use crate::domain::state::{EntityIdentifier, EntityState, EntityType};
use crate::domain::tuning::events::EventTuning;
use crate::domain::{AbsoluteTimestamp, Pdu, PduBody, PduKind};

// Dead reckoning: fixed orientation, constant velocity, world coordinates.
const DR_STATIC: u8 = 1;
const DR_FPW: u8 = 2;

// Collision type: elastic.
const COLLISION_ELASTIC: u8 = 1;
// Detonation result: entity impact.
const DETONATION_ENTITY_IMPACT: u8 = 1;
// Action id: report status.
const ACTION_STATUS_REQUEST: u32 = 5;

// Datum ids carried by Data and SetData.
pub const DATUM_MARKING: u32 = 1;
pub const DATUM_FORCE_ID: u32 = 2;

// Clock time counts the hour fraction in units of 3600 / 2^31 seconds.
const UNITS_PER_HOUR: f64 = 2_147_483_648.0;

/// Wrapping per-application event counter. Zero is never handed out.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventSequence(u16);

impl EventSequence {
    pub fn next(&mut self) -> u16 {
        self.0 = self.0.wrapping_add(1).max(1);
        self.0
    }
}

/// Site/application identity and counters shared by every PDU a run sends.
#[derive(Debug, Clone)]
pub struct PduFactory {
    protocol_version: u8,
    exercise_id: u8,
    site_id: u16,
    application_id: u16,
    tuning: EventTuning,
    events: EventSequence,
    next_request_id: u32,
}

impl PduFactory {
    pub fn new(
        protocol_version: u8,
        exercise_id: u8,
        site_id: u16,
        application_id: u16,
        tuning: EventTuning,
    ) -> Self {
        Self {
            protocol_version,
            exercise_id,
            site_id,
            application_id,
            tuning,
            events: EventSequence::default(),
            next_request_id: 0,
        }
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    /// Builds the PDU for `event`, copying identifiers out of `roster`.
    /// Returns `None` when an index no longer points at an entity.
    pub fn build(
        &mut self,
        event: &ScheduledEvent,
        roster: &[EntityState],
        sim_time: f64,
        timestamp: AbsoluteTimestamp,
    ) -> Option<Pdu> {
        let source = roster.get(event.source)?;
        let target = match event.target {
            Some(index) => Some(roster.get(index)?),
            None => None,
        };

        let body = match (event.kind, target) {
            (PduKind::EntityState, _) => PduBody::EntityState(self.entity_state(source)),
            (PduKind::Fire, Some(target)) => PduBody::Fire(self.fire(source, target)),
            (PduKind::Detonation, Some(target)) => {
                PduBody::Detonation(self.detonation(source, target))
            }
            (PduKind::Collision, Some(target)) => {
                PduBody::Collision(self.collision(source, target))
            }
            (PduKind::Data, Some(target)) => PduBody::Data(DataPdu {
                originating_id: source.id,
                receiving_id: target.id,
                request_id: self.request_id(),
                datums: DatumRecords {
                    fixed: Vec::new(),
                    variable: vec![marking_datum(source)],
                },
            }),
            (PduKind::ActionRequest, Some(target)) => PduBody::ActionRequest(ActionRequestPdu {
                originating_id: source.id,
                receiving_id: target.id,
                request_id: self.request_id(),
                action_id: ACTION_STATUS_REQUEST,
                datums: DatumRecords::default(),
            }),
            (PduKind::StartResume, _) => PduBody::StartResume(StartResumePdu {
                originating_id: source.id,
                receiving_id: EntityIdentifier::ALL,
                real_world_time: clock_time(f64::from(timestamp.seconds())),
                simulation_time: clock_time(sim_time),
                request_id: self.request_id(),
            }),
            (PduKind::SetData, _) => PduBody::SetData(SetDataPdu {
                originating_id: source.id,
                receiving_id: EntityIdentifier::ALL,
                request_id: self.request_id(),
                datums: DatumRecords {
                    fixed: vec![FixedDatum {
                        id: DATUM_FORCE_ID,
                        value: u32::from(source.force_id),
                    }],
                    variable: vec![marking_datum(source)],
                },
            }),
            (PduKind::Designator, _) => PduBody::Designator(self.designator(source)),
            (PduKind::ElectromagneticEmission, _) => {
                PduBody::ElectromagneticEmission(self.emission(source))
            }
            // Targeted kind scheduled without a target.
            (_, None) => return None,
        };

        Some(Pdu::new(
            self.protocol_version,
            self.exercise_id,
            timestamp,
            body,
        ))
    }

    fn event_id(&mut self) -> EventIdentifier {
        EventIdentifier {
            site: self.site_id,
            application: self.application_id,
            event_number: self.events.next(),
        }
    }

    fn request_id(&mut self) -> u32 {
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.next_request_id
    }

    fn entity_state(&self, e: &EntityState) -> EntityStatePdu {
        // Version 6 senders leave force and type unset.
        let (force_id, entity_type) = if self.protocol_version == DIS_VERSION_6 {
            (0, EntityType::default())
        } else {
            (e.force_id, e.entity_type)
        };

        EntityStatePdu {
            entity_id: e.id,
            force_id,
            entity_type,
            alternative_entity_type: entity_type,
            linear_velocity: e.velocity.into(),
            location: e.position,
            orientation: e.orientation.into(),
            appearance: 0,
            dead_reckoning: DeadReckoningParameters {
                algorithm: DR_FPW,
                ..Default::default()
            },
            marking: e.marking,
            capabilities: 0,
            variable_parameters: Vec::new(),
        }
    }

    fn fire(&mut self, source: &EntityState, target: &EntityState) -> FirePdu {
        let line = target.position - source.position;
        FirePdu {
            firing_id: source.id,
            target_id: target.id,
            munition_id: EntityIdentifier::NONE,
            event_id: self.event_id(),
            fire_mission_index: 0,
            location: source.position,
            descriptor: self.tuning.munition,
            velocity: (line.normalized() * f64::from(self.tuning.muzzle_speed)).into(),
            range: line.length() as f32,
        }
    }

    fn detonation(&mut self, source: &EntityState, target: &EntityState) -> DetonationPdu {
        let line = target.position - source.position;
        DetonationPdu {
            firing_id: source.id,
            target_id: target.id,
            munition_id: EntityIdentifier::NONE,
            event_id: self.event_id(),
            velocity: (line.normalized() * f64::from(self.tuning.muzzle_speed)).into(),
            location: target.position,
            descriptor: self.tuning.munition,
            location_in_entity: Vector3Float::ZERO,
            detonation_result: DETONATION_ENTITY_IMPACT,
            variable_parameters: Vec::new(),
        }
    }

    fn collision(&mut self, source: &EntityState, target: &EntityState) -> CollisionPdu {
        CollisionPdu {
            issuing_id: source.id,
            colliding_id: target.id,
            event_id: self.event_id(),
            collision_type: COLLISION_ELASTIC,
            velocity: (source.velocity - target.velocity).into(),
            mass: self.tuning.collision_mass,
            location: Vector3Float::ZERO,
        }
    }

    fn designator(&self, source: &EntityState) -> DesignatorPdu {
        DesignatorPdu {
            designating_id: source.id,
            code_name: 0,
            designated_id: EntityIdentifier::NONE,
            designator_code: 0,
            power: self.tuning.designator_power,
            wavelength: self.tuning.designator_wavelength,
            spot_wrt_designated: Vector3Float::ZERO,
            spot_location: source.position,
            dead_reckoning_algorithm: DR_STATIC,
            linear_acceleration: Vector3Float::ZERO,
        }
    }

    fn emission(&mut self, source: &EntityState) -> ElectromagneticEmissionPdu {
        let beam = EmissionBeam {
            beam_id: 1,
            parameter_index: 0,
            fundamental: FundamentalParameters {
                frequency: self.tuning.emitter_frequency,
                frequency_range: 1.0e6,
                effective_radiated_power: 60.0,
                pulse_repetition_frequency: 1000.0,
                pulse_width: 1.0,
            },
            geometry: BeamGeometry {
                azimuth_center: source.orientation.x as f32,
                azimuth_sweep: 0.5,
                elevation_center: 0.0,
                elevation_sweep: 0.2,
                sweep_sync: 0.0,
            },
            beam_function: 1,
            high_density_track_jam: 0,
            beam_status: 0,
            jamming_technique: [0; 4],
            targets: Vec::new(),
        };

        ElectromagneticEmissionPdu {
            emitting_id: source.id,
            event_id: self.event_id(),
            state_update_indicator: 0,
            systems: vec![EmissionSystem {
                emitter: EmitterSystem {
                    name: self.tuning.emitter_name,
                    function: self.tuning.emitter_function,
                    number: 1,
                },
                location: Vector3Float::ZERO,
                beams: vec![beam],
            }],
        }
    }
}

fn marking_datum(e: &EntityState) -> VariableDatum {
    VariableDatum {
        id: DATUM_MARKING,
        value: e.marking.text().into_bytes(),
    }
}

/// Whole hours plus the hour fraction in DIS clock units.
pub fn clock_time(seconds: f64) -> ClockTime {
    let seconds = seconds.max(0.0);
    let hour = (seconds / 3600.0).floor();
    let past = ((seconds - hour * 3600.0) / 3600.0 * UNITS_PER_HOUR) as u32;
    ClockTime {
        hour: hour as i32,
        time_past_hour: past,
    }
}
