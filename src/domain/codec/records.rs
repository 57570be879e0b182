// Fixed-layout records shared by several PDU bodies.

use super::reader::PduReader;
use super::writer::PduWriter;
use crate::domain::errors::DecodeError;
use crate::domain::pdu::{
    BeamGeometry, ClockTime, DatumRecords, DeadReckoningParameters, EmissionBeam,
    EmissionSystem, EmitterSystem, EulerAngles, EventIdentifier, FIXED_DATUM_LEN,
    FixedDatum, FundamentalParameters, MunitionDescriptor, TRACK_JAM_LEN, TrackJamTarget,
    VARIABLE_DATUM_HEADER_LEN, VARIABLE_PARAMETER_LEN, VariableDatum, VariableParameter,
    Vector3Float,
};
use crate::domain::state::{EntityIdentifier, EntityType, MARKING_LEN, Marking, Vec3};

/// A value with one fixed big-endian layout.
pub trait WireRecord: Sized {
    fn write(&self, w: &mut PduWriter);
    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError>;
}

impl WireRecord for EntityIdentifier {
    fn write(&self, w: &mut PduWriter) {
        w.put_u16(self.site);
        w.put_u16(self.application);
        w.put_u16(self.entity);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            site: r.u16()?,
            application: r.u16()?,
            entity: r.u16()?,
        })
    }
}

impl WireRecord for EventIdentifier {
    fn write(&self, w: &mut PduWriter) {
        w.put_u16(self.site);
        w.put_u16(self.application);
        w.put_u16(self.event_number);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            site: r.u16()?,
            application: r.u16()?,
            event_number: r.u16()?,
        })
    }
}

impl WireRecord for EntityType {
    fn write(&self, w: &mut PduWriter) {
        w.put_u8(self.kind);
        w.put_u8(self.domain);
        w.put_u16(self.country);
        w.put_u8(self.category);
        w.put_u8(self.subcategory);
        w.put_u8(self.specific);
        w.put_u8(self.extra);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            kind: r.u8()?,
            domain: r.u8()?,
            country: r.u16()?,
            category: r.u8()?,
            subcategory: r.u8()?,
            specific: r.u8()?,
            extra: r.u8()?,
        })
    }
}

impl WireRecord for Vec3 {
    fn write(&self, w: &mut PduWriter) {
        w.put_f64(self.x);
        w.put_f64(self.y);
        w.put_f64(self.z);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Vec3::new(r.f64()?, r.f64()?, r.f64()?))
    }
}

impl WireRecord for Vector3Float {
    fn write(&self, w: &mut PduWriter) {
        w.put_f32(self.x);
        w.put_f32(self.y);
        w.put_f32(self.z);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            x: r.f32()?,
            y: r.f32()?,
            z: r.f32()?,
        })
    }
}

impl WireRecord for EulerAngles {
    fn write(&self, w: &mut PduWriter) {
        w.put_f32(self.psi);
        w.put_f32(self.theta);
        w.put_f32(self.phi);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            psi: r.f32()?,
            theta: r.f32()?,
            phi: r.f32()?,
        })
    }
}

impl WireRecord for Marking {
    fn write(&self, w: &mut PduWriter) {
        w.put_u8(self.character_set);
        w.put_bytes(&self.chars);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            character_set: r.u8()?,
            chars: r.bytes::<MARKING_LEN>()?,
        })
    }
}

impl WireRecord for MunitionDescriptor {
    fn write(&self, w: &mut PduWriter) {
        self.munition_type.write(w);
        w.put_u16(self.warhead);
        w.put_u16(self.fuse);
        w.put_u16(self.quantity);
        w.put_u16(self.rate);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            munition_type: EntityType::read(r)?,
            warhead: r.u16()?,
            fuse: r.u16()?,
            quantity: r.u16()?,
            rate: r.u16()?,
        })
    }
}

impl WireRecord for DeadReckoningParameters {
    fn write(&self, w: &mut PduWriter) {
        w.put_u8(self.algorithm);
        w.put_bytes(&self.other_parameters);
        self.linear_acceleration.write(w);
        self.angular_velocity.write(w);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            algorithm: r.u8()?,
            other_parameters: r.bytes::<15>()?,
            linear_acceleration: Vector3Float::read(r)?,
            angular_velocity: Vector3Float::read(r)?,
        })
    }
}

impl WireRecord for VariableParameter {
    fn write(&self, w: &mut PduWriter) {
        w.put_u8(self.record_type);
        w.put_bytes(&self.data);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            record_type: r.u8()?,
            data: r.bytes::<15>()?,
        })
    }
}

impl WireRecord for ClockTime {
    fn write(&self, w: &mut PduWriter) {
        w.put_i32(self.hour);
        w.put_u32(self.time_past_hour);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            hour: r.i32()?,
            time_past_hour: r.u32()?,
        })
    }
}

impl WireRecord for EmitterSystem {
    fn write(&self, w: &mut PduWriter) {
        w.put_u16(self.name);
        w.put_u8(self.function);
        w.put_u8(self.number);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            name: r.u16()?,
            function: r.u8()?,
            number: r.u8()?,
        })
    }
}

impl WireRecord for FundamentalParameters {
    fn write(&self, w: &mut PduWriter) {
        w.put_f32(self.frequency);
        w.put_f32(self.frequency_range);
        w.put_f32(self.effective_radiated_power);
        w.put_f32(self.pulse_repetition_frequency);
        w.put_f32(self.pulse_width);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            frequency: r.f32()?,
            frequency_range: r.f32()?,
            effective_radiated_power: r.f32()?,
            pulse_repetition_frequency: r.f32()?,
            pulse_width: r.f32()?,
        })
    }
}

impl WireRecord for BeamGeometry {
    fn write(&self, w: &mut PduWriter) {
        w.put_f32(self.azimuth_center);
        w.put_f32(self.azimuth_sweep);
        w.put_f32(self.elevation_center);
        w.put_f32(self.elevation_sweep);
        w.put_f32(self.sweep_sync);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            azimuth_center: r.f32()?,
            azimuth_sweep: r.f32()?,
            elevation_center: r.f32()?,
            elevation_sweep: r.f32()?,
            sweep_sync: r.f32()?,
        })
    }
}

impl WireRecord for TrackJamTarget {
    fn write(&self, w: &mut PduWriter) {
        self.entity_id.write(w);
        w.put_u8(self.emitter_number);
        w.put_u8(self.beam_number);
    }

    fn read(r: &mut PduReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            entity_id: EntityIdentifier::read(r)?,
            emitter_number: r.u8()?,
            beam_number: r.u8()?,
        })
    }
}

/// Reads `count` records after checking they can all fit.
pub fn read_records<T: WireRecord>(
    r: &mut PduReader<'_>,
    count: usize,
    record_len: usize,
) -> Result<Vec<T>, DecodeError> {
    r.ensure_records(count, record_len)?;
    (0..count).map(|_| T::read(r)).collect()
}

pub fn write_records<T: WireRecord>(w: &mut PduWriter, records: &[T]) {
    for record in records {
        record.write(w);
    }
}

pub fn read_variable_parameters(
    r: &mut PduReader<'_>,
    count: usize,
) -> Result<Vec<VariableParameter>, DecodeError> {
    read_records(r, count, VARIABLE_PARAMETER_LEN)
}

/// Datum counts as two u32 fields, then the fixed and variable records.
pub fn write_datums(w: &mut PduWriter, datums: &DatumRecords) {
    w.put_u32(datums.fixed.len() as u32);
    w.put_u32(datums.variable.len() as u32);
    for datum in &datums.fixed {
        w.put_u32(datum.id);
        w.put_u32(datum.value);
    }
    for datum in &datums.variable {
        w.put_u32(datum.id);
        w.put_u32((datum.value.len() as u32).saturating_mul(8));
        w.put_bytes(&datum.value);
        w.put_zeros(datum.padded_len() - datum.value.len());
    }
}

pub fn read_datums(r: &mut PduReader<'_>) -> Result<DatumRecords, DecodeError> {
    let fixed_count = r.u32()? as usize;
    let variable_count = r.u32()? as usize;
    // Both counts are validated against the remaining bytes before allocating.
    r.ensure(
        fixed_count
            .saturating_mul(FIXED_DATUM_LEN)
            .saturating_add(variable_count.saturating_mul(VARIABLE_DATUM_HEADER_LEN)),
    )?;

    let mut fixed = Vec::with_capacity(fixed_count);
    for _ in 0..fixed_count {
        fixed.push(FixedDatum {
            id: r.u32()?,
            value: r.u32()?,
        });
    }

    let mut variable = Vec::with_capacity(variable_count);
    for _ in 0..variable_count {
        let id = r.u32()?;
        let bits = r.u32()? as usize;
        let len = bits.div_ceil(8);
        let padded = len.div_ceil(8) * 8;
        r.ensure(padded)?;
        let value = r.take(len)?.to_vec();
        r.skip(padded - len)?;
        variable.push(VariableDatum { id, value });
    }

    Ok(DatumRecords { fixed, variable })
}

pub fn write_emission_system(w: &mut PduWriter, system: &EmissionSystem) {
    w.put_u8(words(system.wire_len()));
    w.put_u8(system.beams.len() as u8);
    w.put_u16(0);
    system.emitter.write(w);
    system.location.write(w);
    for beam in &system.beams {
        w.put_u8(words(beam.wire_len()));
        w.put_u8(beam.beam_id);
        w.put_u16(beam.parameter_index);
        beam.fundamental.write(w);
        beam.geometry.write(w);
        w.put_u8(beam.beam_function);
        w.put_u8(beam.targets.len() as u8);
        w.put_u8(beam.high_density_track_jam);
        w.put_u8(beam.beam_status);
        w.put_bytes(&beam.jamming_technique);
        write_records(w, &beam.targets);
    }
}

pub fn read_emission_system(r: &mut PduReader<'_>) -> Result<EmissionSystem, DecodeError> {
    let start = r.position();
    let declared = usize::from(r.u8()?) * 4;
    let beam_count = usize::from(r.u8()?);
    r.skip(2)?;
    let emitter = EmitterSystem::read(r)?;
    let location = Vector3Float::read(r)?;

    let mut beams = Vec::with_capacity(beam_count);
    for _ in 0..beam_count {
        beams.push(read_emission_beam(r)?);
    }

    // Skip any trailing extension data the declared length covers.
    let consumed = r.position() - start;
    if declared > consumed {
        r.skip(declared - consumed)?;
    }

    Ok(EmissionSystem {
        emitter,
        location,
        beams,
    })
}

fn read_emission_beam(r: &mut PduReader<'_>) -> Result<EmissionBeam, DecodeError> {
    let start = r.position();
    let declared = usize::from(r.u8()?) * 4;
    let beam_id = r.u8()?;
    let parameter_index = r.u16()?;
    let fundamental = FundamentalParameters::read(r)?;
    let geometry = BeamGeometry::read(r)?;
    let beam_function = r.u8()?;
    let target_count = usize::from(r.u8()?);
    let high_density_track_jam = r.u8()?;
    let beam_status = r.u8()?;
    let jamming_technique = r.bytes::<4>()?;
    let targets = read_records(r, target_count, TRACK_JAM_LEN)?;

    let consumed = r.position() - start;
    if declared > consumed {
        r.skip(declared - consumed)?;
    }

    Ok(EmissionBeam {
        beam_id,
        parameter_index,
        fundamental,
        geometry,
        beam_function,
        high_density_track_jam,
        beam_status,
        jamming_technique,
        targets,
    })
}

// Record lengths in 32-bit words, saturating at the u8 field width.
fn words(bytes: usize) -> u8 {
    u8::try_from(bytes / 4).unwrap_or(u8::MAX)
}
