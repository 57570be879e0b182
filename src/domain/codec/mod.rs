//! Byte-exact DIS encoding for the supported PDU kinds.
//!
//! All fields are big-endian. The header is written with a zero length, the
//! body follows in the same buffer, and the length is patched once the total
//! size is known. Decoding dispatches on the header's type code and never
//! panics on short or corrupt input.

mod reader;
mod records;
mod writer;

pub use reader::PduReader;
pub use writer::PduWriter;

use crate::domain::errors::DecodeError;
use crate::domain::pdu::{
    ActionRequestPdu, ClockTime, CollisionPdu, DataPdu, DeadReckoningParameters, DesignatorPdu,
    DetonationPdu, ElectromagneticEmissionPdu, EntityStatePdu, EulerAngles, EventIdentifier,
    FirePdu, HEADER_LEN, MunitionDescriptor, Pdu, PduBody, PduHeader, PduKind, SetDataPdu,
    StartResumePdu, Vector3Float, min_body_len,
};
use crate::domain::state::{EntityIdentifier, EntityType, Marking, Vec3};
use records::{
    WireRecord, read_datums, read_emission_system, read_variable_parameters, write_datums,
    write_emission_system, write_records,
};

// Offset of the length field within the header.
const LENGTH_OFFSET: usize = 8;

/// Serializes a PDU. Never fails for an in-memory value.
pub fn encode(pdu: &Pdu) -> Vec<u8> {
    let kind = pdu.kind();
    let mut w = PduWriter::with_capacity(HEADER_LEN + pdu.body.wire_len());

    w.put_u8(pdu.header.protocol_version);
    w.put_u8(pdu.header.exercise_id);
    w.put_u8(kind.code());
    w.put_u8(kind.family());
    w.put_u32(pdu.header.timestamp);
    w.put_u16(0);
    w.put_u8(pdu.header.pdu_status);
    w.put_u8(0);

    write_body(&mut w, &pdu.body);

    let length = u16::try_from(w.len()).unwrap_or(u16::MAX);
    w.patch_u16(LENGTH_OFFSET, length);
    w.into_bytes()
}

/// Reads only the 12-byte header, validating its length field against the
/// datagram size.
pub fn decode_header(bytes: &[u8]) -> Result<PduHeader, DecodeError> {
    let mut r = PduReader::new(bytes, "header");
    let protocol_version = r.u8()?;
    let exercise_id = r.u8()?;
    let pdu_type = r.u8()?;
    let protocol_family = r.u8()?;
    let timestamp = r.u32()?;
    let length = r.u16()?;
    let pdu_status = r.u8()?;
    r.skip(1)?;

    let declared = usize::from(length);
    if declared < HEADER_LEN {
        return Err(DecodeError::MalformedPdu {
            context: "length field",
            needed: HEADER_LEN,
            available: declared,
        });
    }
    if declared > bytes.len() {
        return Err(DecodeError::MalformedPdu {
            context: "length field",
            needed: declared,
            available: bytes.len(),
        });
    }

    Ok(PduHeader {
        protocol_version,
        exercise_id,
        pdu_type,
        protocol_family,
        timestamp,
        length,
        pdu_status,
    })
}

/// Decodes one PDU from a datagram. Bytes past the header's length are ignored.
pub fn decode(bytes: &[u8]) -> Result<Pdu, DecodeError> {
    let header = decode_header(bytes)?;
    let Some(kind) = header.kind() else {
        return Err(DecodeError::UnsupportedPduType { header });
    };

    let body_bytes = &bytes[HEADER_LEN..usize::from(header.length)];
    let mut r = PduReader::new(body_bytes, kind.name());
    r.ensure(min_body_len(kind))?;
    let body = read_body(kind, &mut r)?;

    Ok(Pdu { header, body })
}

fn write_body(w: &mut PduWriter, body: &PduBody) {
    match body {
        PduBody::EntityState(pdu) => write_entity_state(w, pdu),
        PduBody::Fire(pdu) => {
            pdu.firing_id.write(w);
            pdu.target_id.write(w);
            pdu.munition_id.write(w);
            pdu.event_id.write(w);
            w.put_u32(pdu.fire_mission_index);
            pdu.location.write(w);
            pdu.descriptor.write(w);
            pdu.velocity.write(w);
            w.put_f32(pdu.range);
        }
        PduBody::Detonation(pdu) => {
            pdu.firing_id.write(w);
            pdu.target_id.write(w);
            pdu.munition_id.write(w);
            pdu.event_id.write(w);
            pdu.velocity.write(w);
            pdu.location.write(w);
            pdu.descriptor.write(w);
            pdu.location_in_entity.write(w);
            w.put_u8(pdu.detonation_result);
            w.put_u8(pdu.variable_parameters.len() as u8);
            w.put_u16(0);
            write_records(w, &pdu.variable_parameters);
        }
        PduBody::Collision(pdu) => {
            pdu.issuing_id.write(w);
            pdu.colliding_id.write(w);
            pdu.event_id.write(w);
            w.put_u8(pdu.collision_type);
            w.put_u8(0);
            pdu.velocity.write(w);
            w.put_f32(pdu.mass);
            pdu.location.write(w);
        }
        PduBody::StartResume(pdu) => {
            pdu.originating_id.write(w);
            pdu.receiving_id.write(w);
            pdu.real_world_time.write(w);
            pdu.simulation_time.write(w);
            w.put_u32(pdu.request_id);
        }
        PduBody::ActionRequest(pdu) => {
            pdu.originating_id.write(w);
            pdu.receiving_id.write(w);
            w.put_u32(pdu.request_id);
            w.put_u32(pdu.action_id);
            write_datums(w, &pdu.datums);
        }
        PduBody::SetData(pdu) => {
            pdu.originating_id.write(w);
            pdu.receiving_id.write(w);
            w.put_u32(pdu.request_id);
            w.put_u32(0);
            write_datums(w, &pdu.datums);
        }
        PduBody::Data(pdu) => {
            pdu.originating_id.write(w);
            pdu.receiving_id.write(w);
            w.put_u32(pdu.request_id);
            w.put_u32(0);
            write_datums(w, &pdu.datums);
        }
        PduBody::ElectromagneticEmission(pdu) => {
            pdu.emitting_id.write(w);
            pdu.event_id.write(w);
            w.put_u8(pdu.state_update_indicator);
            w.put_u8(pdu.systems.len() as u8);
            w.put_u16(0);
            for system in &pdu.systems {
                write_emission_system(w, system);
            }
        }
        PduBody::Designator(pdu) => {
            pdu.designating_id.write(w);
            w.put_u16(pdu.code_name);
            pdu.designated_id.write(w);
            w.put_u16(pdu.designator_code);
            w.put_f32(pdu.power);
            w.put_f32(pdu.wavelength);
            pdu.spot_wrt_designated.write(w);
            pdu.spot_location.write(w);
            w.put_u8(pdu.dead_reckoning_algorithm);
            w.put_zeros(3);
            pdu.linear_acceleration.write(w);
        }
    }
}

fn write_entity_state(w: &mut PduWriter, pdu: &EntityStatePdu) {
    pdu.entity_id.write(w);
    w.put_u8(pdu.force_id);
    w.put_u8(pdu.variable_parameters.len() as u8);
    pdu.entity_type.write(w);
    pdu.alternative_entity_type.write(w);
    pdu.linear_velocity.write(w);
    pdu.location.write(w);
    pdu.orientation.write(w);
    w.put_u32(pdu.appearance);
    pdu.dead_reckoning.write(w);
    pdu.marking.write(w);
    w.put_u32(pdu.capabilities);
    write_records(w, &pdu.variable_parameters);
}

fn read_body(kind: PduKind, r: &mut PduReader<'_>) -> Result<PduBody, DecodeError> {
    let body = match kind {
        PduKind::EntityState => PduBody::EntityState(read_entity_state(r)?),
        PduKind::Fire => PduBody::Fire(FirePdu {
            firing_id: EntityIdentifier::read(r)?,
            target_id: EntityIdentifier::read(r)?,
            munition_id: EntityIdentifier::read(r)?,
            event_id: EventIdentifier::read(r)?,
            fire_mission_index: r.u32()?,
            location: Vec3::read(r)?,
            descriptor: MunitionDescriptor::read(r)?,
            velocity: Vector3Float::read(r)?,
            range: r.f32()?,
        }),
        PduKind::Detonation => {
            let firing_id = EntityIdentifier::read(r)?;
            let target_id = EntityIdentifier::read(r)?;
            let munition_id = EntityIdentifier::read(r)?;
            let event_id = EventIdentifier::read(r)?;
            let velocity = Vector3Float::read(r)?;
            let location = Vec3::read(r)?;
            let descriptor = MunitionDescriptor::read(r)?;
            let location_in_entity = Vector3Float::read(r)?;
            let detonation_result = r.u8()?;
            let parameter_count = usize::from(r.u8()?);
            r.skip(2)?;
            PduBody::Detonation(DetonationPdu {
                firing_id,
                target_id,
                munition_id,
                event_id,
                velocity,
                location,
                descriptor,
                location_in_entity,
                detonation_result,
                variable_parameters: read_variable_parameters(r, parameter_count)?,
            })
        }
        PduKind::Collision => {
            let issuing_id = EntityIdentifier::read(r)?;
            let colliding_id = EntityIdentifier::read(r)?;
            let event_id = EventIdentifier::read(r)?;
            let collision_type = r.u8()?;
            r.skip(1)?;
            PduBody::Collision(CollisionPdu {
                issuing_id,
                colliding_id,
                event_id,
                collision_type,
                velocity: Vector3Float::read(r)?,
                mass: r.f32()?,
                location: Vector3Float::read(r)?,
            })
        }
        PduKind::StartResume => PduBody::StartResume(StartResumePdu {
            originating_id: EntityIdentifier::read(r)?,
            receiving_id: EntityIdentifier::read(r)?,
            real_world_time: ClockTime::read(r)?,
            simulation_time: ClockTime::read(r)?,
            request_id: r.u32()?,
        }),
        PduKind::ActionRequest => PduBody::ActionRequest(ActionRequestPdu {
            originating_id: EntityIdentifier::read(r)?,
            receiving_id: EntityIdentifier::read(r)?,
            request_id: r.u32()?,
            action_id: r.u32()?,
            datums: read_datums(r)?,
        }),
        PduKind::SetData => {
            let originating_id = EntityIdentifier::read(r)?;
            let receiving_id = EntityIdentifier::read(r)?;
            let request_id = r.u32()?;
            r.skip(4)?;
            PduBody::SetData(SetDataPdu {
                originating_id,
                receiving_id,
                request_id,
                datums: read_datums(r)?,
            })
        }
        PduKind::Data => {
            let originating_id = EntityIdentifier::read(r)?;
            let receiving_id = EntityIdentifier::read(r)?;
            let request_id = r.u32()?;
            r.skip(4)?;
            PduBody::Data(DataPdu {
                originating_id,
                receiving_id,
                request_id,
                datums: read_datums(r)?,
            })
        }
        PduKind::ElectromagneticEmission => {
            let emitting_id = EntityIdentifier::read(r)?;
            let event_id = EventIdentifier::read(r)?;
            let state_update_indicator = r.u8()?;
            let system_count = usize::from(r.u8()?);
            r.skip(2)?;
            let mut systems = Vec::with_capacity(system_count);
            for _ in 0..system_count {
                systems.push(read_emission_system(r)?);
            }
            PduBody::ElectromagneticEmission(ElectromagneticEmissionPdu {
                emitting_id,
                event_id,
                state_update_indicator,
                systems,
            })
        }
        PduKind::Designator => {
            let designating_id = EntityIdentifier::read(r)?;
            let code_name = r.u16()?;
            let designated_id = EntityIdentifier::read(r)?;
            let designator_code = r.u16()?;
            let power = r.f32()?;
            let wavelength = r.f32()?;
            let spot_wrt_designated = Vector3Float::read(r)?;
            let spot_location = Vec3::read(r)?;
            let dead_reckoning_algorithm = r.u8()?;
            r.skip(3)?;
            PduBody::Designator(DesignatorPdu {
                designating_id,
                code_name,
                designated_id,
                designator_code,
                power,
                wavelength,
                spot_wrt_designated,
                spot_location,
                dead_reckoning_algorithm,
                linear_acceleration: Vector3Float::read(r)?,
            })
        }
    };
    Ok(body)
}

fn read_entity_state(r: &mut PduReader<'_>) -> Result<EntityStatePdu, DecodeError> {
    let entity_id = EntityIdentifier::read(r)?;
    let force_id = r.u8()?;
    let parameter_count = usize::from(r.u8()?);
    let entity_type = EntityType::read(r)?;
    let alternative_entity_type = EntityType::read(r)?;
    let linear_velocity = Vector3Float::read(r)?;
    let location = Vec3::read(r)?;
    let orientation = EulerAngles::read(r)?;
    let appearance = r.u32()?;
    let dead_reckoning = DeadReckoningParameters::read(r)?;
    let marking = Marking::read(r)?;
    let capabilities = r.u32()?;
    let variable_parameters = read_variable_parameters(r, parameter_count)?;

    Ok(EntityStatePdu {
        entity_id,
        force_id,
        entity_type,
        alternative_entity_type,
        linear_velocity,
        location,
        orientation,
        appearance,
        dead_reckoning,
        marking,
        capabilities,
        variable_parameters,
    })
}
