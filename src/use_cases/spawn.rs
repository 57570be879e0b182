// Initial roster: ids, markings, positions and velocities around the origin.

use crate::domain::geodetic::GeodeticPose;
use crate::domain::pdu::DIS_VERSION_6;
use crate::domain::ports::GeodeticConverter;
use crate::domain::state::{EntityIdentifier, EntityState, EntityType, Vec3};
use crate::domain::systems::kinematics::WorldBounds;
use crate::domain::tuning::spawn::SpawnTuning;
use rand::Rng;
use tracing::debug;

/// Identity fields the roster is stamped with.
#[derive(Debug, Clone, Copy)]
pub struct RosterIdentity {
    pub protocol_version: u8,
    pub site_id: u16,
    pub application_id: u16,
    pub entity_count: usize,
}

/// Builds the roster and the box it lives in. Entity numbers that would run
/// past `u16::MAX` are not created.
pub fn spawn_roster<R: Rng>(
    identity: RosterIdentity,
    tuning: &SpawnTuning,
    converter: &dyn GeodeticConverter,
    rng: &mut R,
) -> (Vec<EntityState>, WorldBounds) {
    let origin = converter.to_ecef(&GeodeticPose::from_degrees(
        tuning.origin_lat_deg,
        tuning.origin_lon_deg,
        tuning.origin_alt_m,
    ));
    let bounds = WorldBounds::centered(origin.position, tuning.half_extent_m);

    let (force_id, entity_type) = if identity.protocol_version == DIS_VERSION_6 {
        (0, EntityType::default())
    } else {
        (tuning.force_id, tuning.entity_type)
    };

    let mut roster = Vec::with_capacity(identity.entity_count);
    for index in 0..identity.entity_count {
        let Some(entity_number) = u16::try_from(index)
            .ok()
            .and_then(|i| tuning.first_entity_id.checked_add(i))
        else {
            break;
        };

        let mut entity = EntityState::new(
            EntityIdentifier::new(identity.site_id, identity.application_id, entity_number),
            entity_type,
            force_id,
            &format!("{}{}", tuning.marking_prefix, index),
        );
        entity.position = uniform_in(&bounds, rng);
        entity.velocity = uniform_velocity(tuning.max_speed, rng);
        entity.orientation = origin.orientation;
        // Announce every entity on the first tick.
        entity.last_sent_at = f64::NEG_INFINITY;

        debug!(entity = %entity.id, marking = %entity.marking.text(), "spawned entity");
        roster.push(entity);
    }

    (roster, bounds)
}

fn uniform_in<R: Rng>(bounds: &WorldBounds, rng: &mut R) -> Vec3 {
    Vec3::new(
        sample(bounds.min.x, bounds.max.x, rng),
        sample(bounds.min.y, bounds.max.y, rng),
        sample(bounds.min.z, bounds.max.z, rng),
    )
}

fn uniform_velocity<R: Rng>(max_speed: f64, rng: &mut R) -> Vec3 {
    Vec3::new(
        sample(-max_speed, max_speed, rng),
        sample(-max_speed, max_speed, rng),
        sample(-max_speed, max_speed, rng),
    )
}

fn sample<R: Rng>(lo: f64, hi: f64, rng: &mut R) -> f64 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geodetic::Wgs84;
    use crate::domain::pdu::DIS_VERSION_7;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn identity(version: u8, count: usize) -> RosterIdentity {
        RosterIdentity {
            protocol_version: version,
            site_id: 18,
            application_id: 23,
            entity_count: count,
        }
    }

    #[test]
    fn roster_gets_sequential_ids_and_markings_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(9);

        let (roster, bounds) = spawn_roster(
            identity(DIS_VERSION_7, 5),
            &SpawnTuning::default(),
            &Wgs84,
            &mut rng,
        );

        assert_eq!(roster.len(), 5);
        for (i, e) in roster.iter().enumerate() {
            assert_eq!(e.id, EntityIdentifier::new(18, 23, 1000 + i as u16));
            assert_eq!(e.marking.text(), format!("Igor{i}"));
            assert!(bounds.contains(e.position));
            assert!(e.velocity.x.abs() <= 40.0);
            assert_eq!(e.force_id, 1);
            assert_eq!(e.entity_type.country, 225);
        }
    }

    #[test]
    fn version_six_roster_has_no_force_or_type() {
        let mut rng = StdRng::seed_from_u64(9);

        let (roster, _) = spawn_roster(
            identity(DIS_VERSION_6, 2),
            &SpawnTuning::default(),
            &Wgs84,
            &mut rng,
        );

        assert!(roster.iter().all(|e| e.force_id == 0));
        assert!(roster.iter().all(|e| e.entity_type == EntityType::default()));
    }

    #[test]
    fn when_ids_would_overflow_then_roster_stops_short() {
        let tuning = SpawnTuning {
            first_entity_id: u16::MAX - 1,
            ..SpawnTuning::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let (roster, _) = spawn_roster(identity(DIS_VERSION_7, 5), &tuning, &Wgs84, &mut rng);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].id.entity, u16::MAX);
    }

    #[test]
    fn same_seed_spawns_same_roster() {
        let spawn = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            spawn_roster(
                identity(DIS_VERSION_7, 3),
                &SpawnTuning::default(),
                &Wgs84,
                &mut rng,
            )
            .0
        };

        assert_eq!(spawn(5), spawn(5));
    }
}
