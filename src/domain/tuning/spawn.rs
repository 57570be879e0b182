use crate::domain::state::EntityType;

/// Roster layout at startup.
///
/// Keep this separate from runtime/server configuration (ids, rates, etc.).
#[derive(Debug, Clone)]
pub struct SpawnTuning {
    /// Geodetic origin of the exercise area in degrees and meters.
    pub origin_lat_deg: f64,
    pub origin_lon_deg: f64,
    pub origin_alt_m: f64,

    /// Half the side length of the ECEF box entities stay inside, in meters.
    pub half_extent_m: f64,

    /// Per-axis speed cap for spawned velocities in m/s.
    pub max_speed: f64,

    /// Entity numbers count up from here.
    pub first_entity_id: u16,

    /// Marking is `<prefix><index>`, cut to eleven bytes.
    pub marking_prefix: String,

    pub entity_type: EntityType,
    pub force_id: u8,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            // Monterey, CA.
            origin_lat_deg: 36.6,
            origin_lon_deg: -121.9,
            origin_alt_m: 1.0,
            half_extent_m: 5000.0,
            max_speed: 40.0,
            first_entity_id: 1000,
            marking_prefix: "Igor".to_string(),
            entity_type: EntityType {
                kind: 1,
                domain: 1,
                country: 225,
                category: 1,
                subcategory: 0,
                specific: 0,
                extra: 0,
            },
            force_id: 1,
        }
    }
}
