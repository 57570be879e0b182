// Domain-level simulated entities and the DIS identity records they carry.

use std::fmt;
use std::ops::{Add, Mul};

/// Double-precision triple used for ECEF positions, Euler angles and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON {
            self * (1.0 / len)
        } else {
            Vec3::ZERO
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

/// Site/application/entity triple naming an entity within an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EntityIdentifier {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityIdentifier {
    /// Wildcard addressing every entity in the exercise.
    pub const ALL: EntityIdentifier = EntityIdentifier::new(0xFFFF, 0xFFFF, 0xFFFF);
    /// "No entity" marker used for untracked munitions and spot designations.
    pub const NONE: EntityIdentifier = EntityIdentifier::new(0, 0, 0);

    pub const fn new(site: u16, application: u16, entity: u16) -> Self {
        Self {
            site,
            application,
            entity,
        }
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.site, self.application, self.entity)
    }
}

/// Platform classification (kind, domain, nationality, model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityType {
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

pub const MARKING_LEN: usize = 11;
pub const MARKING_CHARSET_ASCII: u8 = 1;

/// Fixed-width entity label: one character-set byte plus 11 space-padded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marking {
    pub character_set: u8,
    pub chars: [u8; MARKING_LEN],
}

impl Marking {
    /// Builds an ASCII marking, truncating to 11 bytes and space-padding.
    pub fn new(label: &str) -> Self {
        let mut chars = [b' '; MARKING_LEN];
        for (slot, byte) in chars.iter_mut().zip(label.bytes()) {
            *slot = byte;
        }
        Self {
            character_set: MARKING_CHARSET_ASCII,
            chars,
        }
    }

    /// Label with trailing spaces and NULs removed.
    pub fn text(&self) -> String {
        let end = self
            .chars
            .iter()
            .rposition(|b| *b != b' ' && *b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.chars[..end]).into_owned()
    }
}

impl Default for Marking {
    fn default() -> Self {
        Marking::new("")
    }
}

/// Mutable simulation record for one entity; owned by the simulation roster.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub id: EntityIdentifier,
    pub entity_type: EntityType,
    pub force_id: u8,
    pub marking: Marking,

    // Kinematic state (ECEF meters, psi/theta/phi radians, m/s).
    pub position: Vec3,
    pub orientation: Vec3,
    pub velocity: Vec3,

    // Simulation seconds at which the last EntityState PDU went out.
    pub last_sent_at: f64,
}

impl EntityState {
    pub fn new(id: EntityIdentifier, entity_type: EntityType, force_id: u8, label: &str) -> Self {
        Self {
            id,
            entity_type,
            force_id,
            marking: Marking::new(label),
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            last_sent_at: 0.0,
        }
    }
}
