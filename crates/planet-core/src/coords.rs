//! Geographic coordinate types. All coordinate math uses f64 radians;
//! degrees only appear at API edges that want them (none, currently).

use serde::{Deserialize, Serialize};

use crate::sphere::Vec3;

/// A point on a planet's surface in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in radians, -pi/2 to +pi/2.
    pub lat: f64,
    /// Longitude in radians, -pi to +pi.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians())
    }

    /// Unrotated surface direction for this (lat, lon), before any axis tilt
    /// is applied. `OrbitGeometry::latitude_longitude_to_vector` applies the
    /// planet's axis rotation on top of this.
    pub fn to_unrotated_vector(self) -> Vec3 {
        Vec3::new(
            self.lat.cos() * self.lon.sin(),
            self.lat.sin(),
            self.lat.cos() * self.lon.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrotated_vector_is_unit_length() {
        for (lat, lon) in [(0.0, 0.0), (0.5, 1.2), (-0.9, -2.5)] {
            let v = LatLon::new(lat, lon).to_unrotated_vector();
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn equator_prime_meridian_is_plus_z() {
        let v = LatLon::new(0.0, 0.0).to_unrotated_vector();
        assert!((v.z - 1.0).abs() < 1e-12);
        assert!(v.x.abs() < 1e-12);
        assert!(v.y.abs() < 1e-12);
    }

    #[test]
    fn north_pole_is_plus_y() {
        let v = LatLon::new(std::f64::consts::FRAC_PI_2, 0.0).to_unrotated_vector();
        assert!((v.y - 1.0).abs() < 1e-9);
    }
}
