//! Typed PDU values for the supported subset of the DIS catalog.
//!
//! A [`Pdu`] is built per send, serialized once by [`crate::domain::codec`] and
//! dropped. Identifiers are copied in by value, so encoded bytes never depend
//! on later roster mutation.

use crate::domain::state::{EntityIdentifier, EntityType, Marking, Vec3};
use crate::domain::timestamp::AbsoluteTimestamp;

pub const HEADER_LEN: usize = 12;

pub const DIS_VERSION_6: u8 = 6;
pub const DIS_VERSION_7: u8 = 7;

// Fixed record sizes on the wire.
pub(crate) const ENTITY_ID_LEN: usize = 6;
pub(crate) const ENTITY_TYPE_LEN: usize = 8;
pub(crate) const EVENT_ID_LEN: usize = 6;
pub(crate) const VECTOR3_FLOAT_LEN: usize = 12;
pub(crate) const VECTOR3_DOUBLE_LEN: usize = 24;
pub(crate) const MUNITION_DESCRIPTOR_LEN: usize = 16;
pub(crate) const DEAD_RECKONING_LEN: usize = 40;
pub(crate) const MARKING_RECORD_LEN: usize = 12;
pub(crate) const VARIABLE_PARAMETER_LEN: usize = 16;
pub(crate) const CLOCK_TIME_LEN: usize = 8;
pub(crate) const FIXED_DATUM_LEN: usize = 8;
pub(crate) const VARIABLE_DATUM_HEADER_LEN: usize = 8;
pub(crate) const EMISSION_SYSTEM_HEADER_LEN: usize = 20;
pub(crate) const EMISSION_BEAM_HEADER_LEN: usize = 52;
pub(crate) const TRACK_JAM_LEN: usize = 8;

/// Supported PDU kinds with their DIS type codes and protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PduKind {
    EntityState,
    Fire,
    Detonation,
    Collision,
    StartResume,
    ActionRequest,
    SetData,
    Data,
    ElectromagneticEmission,
    Designator,
}

impl PduKind {
    pub const ALL: [PduKind; 10] = [
        PduKind::EntityState,
        PduKind::Fire,
        PduKind::Detonation,
        PduKind::Collision,
        PduKind::StartResume,
        PduKind::ActionRequest,
        PduKind::SetData,
        PduKind::Data,
        PduKind::ElectromagneticEmission,
        PduKind::Designator,
    ];

    pub const COUNT: usize = PduKind::ALL.len();

    pub const fn code(self) -> u8 {
        match self {
            PduKind::EntityState => 1,
            PduKind::Fire => 2,
            PduKind::Detonation => 3,
            PduKind::Collision => 4,
            PduKind::StartResume => 13,
            PduKind::ActionRequest => 16,
            PduKind::SetData => 19,
            PduKind::Data => 20,
            PduKind::ElectromagneticEmission => 23,
            PduKind::Designator => 24,
        }
    }

    pub const fn family(self) -> u8 {
        match self {
            PduKind::EntityState | PduKind::Collision => 1,
            PduKind::Fire | PduKind::Detonation => 2,
            PduKind::StartResume
            | PduKind::ActionRequest
            | PduKind::SetData
            | PduKind::Data => 5,
            PduKind::ElectromagneticEmission | PduKind::Designator => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        PduKind::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Stable snake_case name for logs and counters.
    pub const fn name(self) -> &'static str {
        match self {
            PduKind::EntityState => "entity_state",
            PduKind::Fire => "fire",
            PduKind::Detonation => "detonation",
            PduKind::Collision => "collision",
            PduKind::StartResume => "start_resume",
            PduKind::ActionRequest => "action_request",
            PduKind::SetData => "set_data",
            PduKind::Data => "data",
            PduKind::ElectromagneticEmission => "electromagnetic_emission",
            PduKind::Designator => "designator",
        }
    }

    /// Position within [`PduKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Header shared by every PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: u8,
    pub protocol_family: u8,
    /// Raw timestamp field; absolute when bit 31 is set.
    pub timestamp: u32,
    /// Total PDU length including this header.
    pub length: u16,
    pub pdu_status: u8,
}

impl PduHeader {
    pub fn kind(&self) -> Option<PduKind> {
        PduKind::from_code(self.pdu_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3Float {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3Float {
    pub const ZERO: Vector3Float = Vector3Float {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

impl From<Vec3> for Vector3Float {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x as f32,
            y: v.y as f32,
            z: v.z as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub psi: f32,
    pub theta: f32,
    pub phi: f32,
}

impl From<Vec3> for EulerAngles {
    fn from(v: Vec3) -> Self {
        Self {
            psi: v.x as f32,
            theta: v.y as f32,
            phi: v.z as f32,
        }
    }
}

/// Simulation address plus a per-application event counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventIdentifier {
    pub site: u16,
    pub application: u16,
    pub event_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MunitionDescriptor {
    pub munition_type: EntityType,
    pub warhead: u16,
    pub fuse: u16,
    pub quantity: u16,
    pub rate: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeadReckoningParameters {
    pub algorithm: u8,
    pub other_parameters: [u8; 15],
    pub linear_acceleration: Vector3Float,
    pub angular_velocity: Vector3Float,
}

/// Articulated/attached part record (16 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableParameter {
    pub record_type: u8,
    pub data: [u8; 15],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub hour: i32,
    pub time_past_hour: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedDatum {
    pub id: u32,
    pub value: u32,
}

/// Length-prefixed payload. The wire length is in bits and the bytes are
/// padded to a 64-bit boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableDatum {
    pub id: u32,
    pub value: Vec<u8>,
}

impl VariableDatum {
    pub(crate) fn padded_len(&self) -> usize {
        self.value.len().div_ceil(8) * 8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatumRecords {
    pub fixed: Vec<FixedDatum>,
    pub variable: Vec<VariableDatum>,
}

impl DatumRecords {
    pub(crate) fn wire_len(&self) -> usize {
        self.fixed.len() * FIXED_DATUM_LEN
            + self
                .variable
                .iter()
                .map(|d| VARIABLE_DATUM_HEADER_LEN + d.padded_len())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityStatePdu {
    pub entity_id: EntityIdentifier,
    pub force_id: u8,
    pub entity_type: EntityType,
    pub alternative_entity_type: EntityType,
    pub linear_velocity: Vector3Float,
    pub location: Vec3,
    pub orientation: EulerAngles,
    pub appearance: u32,
    pub dead_reckoning: DeadReckoningParameters,
    pub marking: Marking,
    pub capabilities: u32,
    pub variable_parameters: Vec<VariableParameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirePdu {
    pub firing_id: EntityIdentifier,
    pub target_id: EntityIdentifier,
    pub munition_id: EntityIdentifier,
    pub event_id: EventIdentifier,
    pub fire_mission_index: u32,
    pub location: Vec3,
    pub descriptor: MunitionDescriptor,
    pub velocity: Vector3Float,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetonationPdu {
    pub firing_id: EntityIdentifier,
    pub target_id: EntityIdentifier,
    pub munition_id: EntityIdentifier,
    pub event_id: EventIdentifier,
    pub velocity: Vector3Float,
    pub location: Vec3,
    pub descriptor: MunitionDescriptor,
    pub location_in_entity: Vector3Float,
    pub detonation_result: u8,
    pub variable_parameters: Vec<VariableParameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPdu {
    pub issuing_id: EntityIdentifier,
    pub colliding_id: EntityIdentifier,
    pub event_id: EventIdentifier,
    pub collision_type: u8,
    pub velocity: Vector3Float,
    pub mass: f32,
    pub location: Vector3Float,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartResumePdu {
    pub originating_id: EntityIdentifier,
    pub receiving_id: EntityIdentifier,
    pub real_world_time: ClockTime,
    pub simulation_time: ClockTime,
    pub request_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequestPdu {
    pub originating_id: EntityIdentifier,
    pub receiving_id: EntityIdentifier,
    pub request_id: u32,
    pub action_id: u32,
    pub datums: DatumRecords,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetDataPdu {
    pub originating_id: EntityIdentifier,
    pub receiving_id: EntityIdentifier,
    pub request_id: u32,
    pub datums: DatumRecords,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPdu {
    pub originating_id: EntityIdentifier,
    pub receiving_id: EntityIdentifier,
    pub request_id: u32,
    pub datums: DatumRecords,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignatorPdu {
    pub designating_id: EntityIdentifier,
    pub code_name: u16,
    pub designated_id: EntityIdentifier,
    pub designator_code: u16,
    pub power: f32,
    pub wavelength: f32,
    pub spot_wrt_designated: Vector3Float,
    pub spot_location: Vec3,
    pub dead_reckoning_algorithm: u8,
    pub linear_acceleration: Vector3Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitterSystem {
    pub name: u16,
    pub function: u8,
    pub number: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FundamentalParameters {
    pub frequency: f32,
    pub frequency_range: f32,
    pub effective_radiated_power: f32,
    pub pulse_repetition_frequency: f32,
    pub pulse_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeamGeometry {
    pub azimuth_center: f32,
    pub azimuth_sweep: f32,
    pub elevation_center: f32,
    pub elevation_sweep: f32,
    pub sweep_sync: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackJamTarget {
    pub entity_id: EntityIdentifier,
    pub emitter_number: u8,
    pub beam_number: u8,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmissionBeam {
    pub beam_id: u8,
    pub parameter_index: u16,
    pub fundamental: FundamentalParameters,
    pub geometry: BeamGeometry,
    pub beam_function: u8,
    pub high_density_track_jam: u8,
    pub beam_status: u8,
    /// Kind, category, subcategory, specific.
    pub jamming_technique: [u8; 4],
    pub targets: Vec<TrackJamTarget>,
}

impl EmissionBeam {
    pub(crate) fn wire_len(&self) -> usize {
        EMISSION_BEAM_HEADER_LEN + self.targets.len() * TRACK_JAM_LEN
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmissionSystem {
    pub emitter: EmitterSystem,
    pub location: Vector3Float,
    pub beams: Vec<EmissionBeam>,
}

impl EmissionSystem {
    pub(crate) fn wire_len(&self) -> usize {
        EMISSION_SYSTEM_HEADER_LEN + self.beams.iter().map(EmissionBeam::wire_len).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectromagneticEmissionPdu {
    pub emitting_id: EntityIdentifier,
    pub event_id: EventIdentifier,
    pub state_update_indicator: u8,
    pub systems: Vec<EmissionSystem>,
}

/// Variant-specific part of a PDU.
#[derive(Debug, Clone, PartialEq)]
pub enum PduBody {
    EntityState(EntityStatePdu),
    Fire(FirePdu),
    Detonation(DetonationPdu),
    Collision(CollisionPdu),
    StartResume(StartResumePdu),
    ActionRequest(ActionRequestPdu),
    SetData(SetDataPdu),
    Data(DataPdu),
    ElectromagneticEmission(ElectromagneticEmissionPdu),
    Designator(DesignatorPdu),
}

impl PduBody {
    pub fn kind(&self) -> PduKind {
        match self {
            PduBody::EntityState(_) => PduKind::EntityState,
            PduBody::Fire(_) => PduKind::Fire,
            PduBody::Detonation(_) => PduKind::Detonation,
            PduBody::Collision(_) => PduKind::Collision,
            PduBody::StartResume(_) => PduKind::StartResume,
            PduBody::ActionRequest(_) => PduKind::ActionRequest,
            PduBody::SetData(_) => PduKind::SetData,
            PduBody::Data(_) => PduKind::Data,
            PduBody::ElectromagneticEmission(_) => PduKind::ElectromagneticEmission,
            PduBody::Designator(_) => PduKind::Designator,
        }
    }

    /// Encoded body size in bytes, excluding the header.
    pub fn wire_len(&self) -> usize {
        let fixed = min_body_len(self.kind());
        match self {
            PduBody::EntityState(pdu) => {
                fixed + pdu.variable_parameters.len() * VARIABLE_PARAMETER_LEN
            }
            PduBody::Detonation(pdu) => {
                fixed + pdu.variable_parameters.len() * VARIABLE_PARAMETER_LEN
            }
            PduBody::ActionRequest(pdu) => fixed + pdu.datums.wire_len(),
            PduBody::SetData(pdu) => fixed + pdu.datums.wire_len(),
            PduBody::Data(pdu) => fixed + pdu.datums.wire_len(),
            PduBody::ElectromagneticEmission(pdu) => {
                fixed + pdu.systems.iter().map(EmissionSystem::wire_len).sum::<usize>()
            }
            PduBody::Fire(_)
            | PduBody::Collision(_)
            | PduBody::StartResume(_)
            | PduBody::Designator(_) => fixed,
        }
    }
}

/// Smallest valid body for each kind (fixed part, no repeated records).
pub const fn min_body_len(kind: PduKind) -> usize {
    match kind {
        PduKind::EntityState => 132,
        PduKind::Fire => 84,
        PduKind::Detonation => 92,
        PduKind::Collision => 48,
        PduKind::StartResume => 32,
        PduKind::ActionRequest | PduKind::SetData | PduKind::Data => 28,
        PduKind::ElectromagneticEmission => 16,
        PduKind::Designator => 76,
    }
}

/// A complete PDU: shared header plus variant body.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub header: PduHeader,
    pub body: PduBody,
}

impl Pdu {
    /// Builds a PDU whose type, family and length fields agree with `body`.
    pub fn new(
        protocol_version: u8,
        exercise_id: u8,
        timestamp: AbsoluteTimestamp,
        body: PduBody,
    ) -> Self {
        let kind = body.kind();
        let length = u16::try_from(HEADER_LEN + body.wire_len()).unwrap_or(u16::MAX);
        Self {
            header: PduHeader {
                protocol_version,
                exercise_id,
                pdu_type: kind.code(),
                protocol_family: kind.family(),
                timestamp: timestamp.raw(),
                length,
                pdu_status: 0,
            },
            body,
        }
    }

    pub fn kind(&self) -> PduKind {
        self.body.kind()
    }
}
