use crate::domain::pdu::{MunitionDescriptor, PduKind};
use crate::domain::state::EntityType;

/// Base probabilities for the secondary event kinds and the payload constants
/// their PDUs carry.
///
/// A probability is the chance of one event per nominal emission interval;
/// the scheduler scales it by elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct EventTuning {
    pub fire: f64,
    pub detonation: f64,
    pub collision: f64,
    pub data: f64,
    pub action_request: f64,
    pub start_resume: f64,
    pub set_data: f64,
    pub designator: f64,
    pub emission: f64,

    /// Munition carried by Fire and Detonation PDUs.
    pub munition: MunitionDescriptor,
    /// Launch speed in m/s along the firer-to-target line.
    pub muzzle_speed: f32,

    /// Laser designator output in watts and wavelength in microns.
    pub designator_power: f32,
    pub designator_wavelength: f32,

    /// Emitter name, function and nominal frequency for emission PDUs.
    pub emitter_name: u16,
    pub emitter_function: u8,
    pub emitter_frequency: f32,

    /// Mass in kilograms reported by Collision PDUs.
    pub collision_mass: f32,
}

impl EventTuning {
    /// Base probability for `kind`. EntityState is rate limited, not sampled.
    pub fn probability(&self, kind: PduKind) -> f64 {
        match kind {
            PduKind::EntityState => 0.0,
            PduKind::Fire => self.fire,
            PduKind::Detonation => self.detonation,
            PduKind::Collision => self.collision,
            PduKind::Data => self.data,
            PduKind::ActionRequest => self.action_request,
            PduKind::StartResume => self.start_resume,
            PduKind::SetData => self.set_data,
            PduKind::Designator => self.designator,
            PduKind::ElectromagneticEmission => self.emission,
        }
    }

    /// Same table with every secondary kind switched off.
    pub fn silent() -> Self {
        Self {
            fire: 0.0,
            detonation: 0.0,
            collision: 0.0,
            data: 0.0,
            action_request: 0.0,
            start_resume: 0.0,
            set_data: 0.0,
            designator: 0.0,
            emission: 0.0,
            ..Self::default()
        }
    }
}

impl Default for EventTuning {
    fn default() -> Self {
        Self {
            fire: 0.05,
            detonation: 0.05,
            collision: 0.01,
            data: 0.02,
            action_request: 0.02,
            start_resume: 0.005,
            set_data: 0.01,
            designator: 0.02,
            emission: 0.03,
            munition: MunitionDescriptor {
                munition_type: EntityType {
                    kind: 2,
                    domain: 2,
                    country: 225,
                    category: 2,
                    subcategory: 1,
                    specific: 0,
                    extra: 0,
                },
                warhead: 1000,
                fuse: 1000,
                quantity: 1,
                rate: 0,
            },
            muzzle_speed: 300.0,
            designator_power: 1000.0,
            designator_wavelength: 1.064,
            emitter_name: 1505,
            emitter_function: 2,
            emitter_frequency: 9.5e9,
            collision_mass: 20_000.0,
        }
    }
}
