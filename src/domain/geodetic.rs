// WGS-84 geodetic to ECEF conversion, including DIS body orientation.

use crate::domain::ports::GeodeticConverter;
use crate::domain::state::Vec3;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Position in radians/meters plus local-level attitude (roll, pitch, yaw in
/// radians, yaw measured clockwise from true north).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeodeticPose {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl GeodeticPose {
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt: f64) -> Self {
        Self {
            lat: lat_deg.to_radians(),
            lon: lon_deg.to_radians(),
            alt,
            ..Default::default()
        }
    }
}

/// ECEF position in meters and DIS Euler angles (x = psi, y = theta, z = phi).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EcefPose {
    pub position: Vec3,
    pub orientation: Vec3,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84;

impl GeodeticConverter for Wgs84 {
    fn to_ecef(&self, pose: &GeodeticPose) -> EcefPose {
        EcefPose {
            position: position(pose.lat, pose.lon, pose.alt),
            orientation: orientation(pose),
        }
    }
}

fn position(lat: f64, lon: f64, alt: f64) -> Vec3 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Vec3::new(
        (n + alt) * cos_lat * cos_lon,
        (n + alt) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + alt) * sin_lat,
    )
}

// Rotates the body axes out of the local north/east/down frame into ECEF and
// reads the DIS psi/theta/phi sequence back off them.
fn orientation(pose: &GeodeticPose) -> Vec3 {
    let (sin_lat, cos_lat) = pose.lat.sin_cos();
    let (sin_lon, cos_lon) = pose.lon.sin_cos();

    let north = Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = Vec3::new(-sin_lon, cos_lon, 0.0);
    let down = Vec3::new(-cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat);

    let (sp, cp) = pose.roll.sin_cos();
    let (st, ct) = pose.pitch.sin_cos();
    let (sy, cy) = pose.yaw.sin_cos();

    let x_body = north * (ct * cy) + east * (ct * sy) + down * (-st);
    let y_body =
        north * (sp * st * cy - cp * sy) + east * (sp * st * sy + cp * cy) + down * (sp * ct);
    let z_body =
        north * (cp * st * cy + sp * sy) + east * (cp * st * sy - sp * cy) + down * (cp * ct);

    let psi = x_body.y.atan2(x_body.x);
    let theta = -x_body.z.clamp(-1.0, 1.0).asin();
    let phi = y_body.z.atan2(z_body.z);

    Vec3::new(psi, theta, phi)
}
