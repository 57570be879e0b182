use crate::domain::state::{EntityState, Vec3};

/// Axis-aligned ECEF box the roster is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBounds {
    /// Cube of side `2 * half_extent` centered on `center`.
    pub fn centered(center: Vec3, half_extent: f64) -> Self {
        let half = Vec3::new(half_extent, half_extent, half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

/// First-order position step followed by per-axis boundary reflection.
pub fn advance(e: &mut EntityState, dt: f64, bounds: &WorldBounds) {
    e.position = e.position + e.velocity * dt;

    reflect_axis(&mut e.position.x, &mut e.velocity.x, bounds.min.x, bounds.max.x);
    reflect_axis(&mut e.position.y, &mut e.velocity.y, bounds.min.y, bounds.max.y);
    reflect_axis(&mut e.position.z, &mut e.velocity.z, bounds.min.z, bounds.max.z);
}

// Clamp onto the violated face and point the component back inward. A
// component already heading inward keeps its sign.
fn reflect_axis(pos: &mut f64, vel: &mut f64, min: f64, max: f64) {
    if *pos < min {
        *pos = min;
        *vel = vel.abs();
    } else if *pos > max {
        *pos = max;
        *vel = -vel.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{EntityIdentifier, EntityType};

    fn entity_at(position: Vec3, velocity: Vec3) -> EntityState {
        let mut e = EntityState::new(
            EntityIdentifier::new(18, 23, 1000),
            EntityType::default(),
            1,
            "T",
        );
        e.position = position;
        e.velocity = velocity;
        e
    }

    fn unit_box() -> WorldBounds {
        WorldBounds {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(10.0, 10.0, 10.0),
        }
    }

    #[test]
    fn when_inside_bounds_then_position_advances_linearly() {
        let mut e = entity_at(Vec3::new(5.0, 5.0, 5.0), Vec3::new(1.0, -2.0, 0.5));

        advance(&mut e, 0.5, &unit_box());

        assert_eq!(e.position, Vec3::new(5.5, 4.0, 5.25));
        assert_eq!(e.velocity, Vec3::new(1.0, -2.0, 0.5));
    }

    #[test]
    fn when_crossing_min_then_clamped_and_velocity_flips_positive() {
        let mut e = entity_at(Vec3::new(1.0, 5.0, 5.0), Vec3::new(-4.0, 0.0, 0.0));

        advance(&mut e, 1.0, &unit_box());

        assert_eq!(e.position.x, 0.0);
        assert_eq!(e.velocity.x, 4.0);
    }

    #[test]
    fn when_crossing_max_then_clamped_and_velocity_flips_negative() {
        let mut e = entity_at(Vec3::new(9.0, 5.0, 5.0), Vec3::new(0.0, 0.0, 3.0));
        e.position.z = 9.0;

        advance(&mut e, 1.0, &unit_box());

        assert_eq!(e.position.z, 10.0);
        assert_eq!(e.velocity.z, -3.0);
    }

    #[test]
    fn when_outside_but_moving_inward_then_sign_is_kept() {
        // Starts far below min on x and still lands below it after the step.
        let mut e = entity_at(Vec3::new(-10.0, 5.0, 5.0), Vec3::new(2.0, 0.0, 0.0));

        advance(&mut e, 1.0, &unit_box());

        assert_eq!(e.position.x, 0.0);
        assert_eq!(e.velocity.x, 2.0);
    }

    #[test]
    fn axes_reflect_independently() {
        let mut e = entity_at(Vec3::new(9.5, 0.5, 5.0), Vec3::new(1.0, -1.0, 1.0));

        advance(&mut e, 1.0, &unit_box());

        assert_eq!(e.position, Vec3::new(10.0, 0.0, 6.0));
        assert_eq!(e.velocity, Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn centered_bounds_contain_their_center() {
        let center = Vec3::new(-2_700_000.0, -4_300_000.0, 3_780_000.0);
        let bounds = WorldBounds::centered(center, 5000.0);

        assert!(bounds.contains(center));
        assert!(!bounds.contains(center + Vec3::new(5000.1, 0.0, 0.0)));
        assert_eq!(bounds.max.x - bounds.min.x, 10_000.0);
    }
}
