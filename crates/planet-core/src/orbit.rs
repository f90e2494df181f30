//! Orbit data model and the axis/orbit geometry operations of spec §4.3:
//! latitude/longitude ↔ surface vector, solar declination, solstice true
//! anomalies, and proportion-of-year.

use serde::{Deserialize, Serialize};

use crate::sphere::{angle_between, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_periapsis: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub true_anomaly: f64,
    pub period_s: f64,
    pub orbited_mass_kg: f64,
}

impl Orbit {
    pub fn apoapsis_m(&self) -> f64 {
        self.semi_major_axis_m * (1.0 + self.eccentricity)
    }

    pub fn periapsis_m(&self) -> f64 {
        self.semi_major_axis_m * (1.0 - self.eccentricity)
    }

    /// Distance from the orbited body at true anomaly `tau`.
    pub fn distance_at(&self, tau: f64) -> f64 {
        let e = self.eccentricity;
        self.semi_major_axis_m * (1.0 - e * e) / (1.0 + e * tau.cos())
    }

    /// Ecliptic longitude at true anomaly `tau`: true anomaly plus the
    /// argument of periapsis and longitude of ascending node.
    pub fn ecliptic_longitude(&self, tau: f64) -> f64 {
        (tau + self.argument_of_periapsis + self.longitude_of_ascending_node) % std::f64::consts::TAU
    }

    /// Summer solstice true anomaly: `(π/2 − Ω) mod 2π`.
    pub fn summer_solstice_true_anomaly(&self) -> f64 {
        wrap_tau(std::f64::consts::FRAC_PI_2 - self.longitude_of_ascending_node)
    }

    /// Winter solstice true anomaly: `(3π/2 − Ω) mod 2π`.
    pub fn winter_solstice_true_anomaly(&self) -> f64 {
        wrap_tau(3.0 * std::f64::consts::FRAC_PI_2 - self.longitude_of_ascending_node)
    }

    /// Proportion of year elapsed since the winter solstice, in `[0, 1)`.
    pub fn proportion_of_year(&self, tau: f64) -> f64 {
        wrap_tau(tau - self.winter_solstice_true_anomaly()) / std::f64::consts::TAU
    }
}

fn wrap_tau(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    ((angle % tau) + tau) % tau
}

/// `axis`: unit polar axis. `axis_rotation` conceptually maps world Y onto
/// `axis`; we apply it via the simpler equivalent rotation-by-axis-angle
/// this crate stores for serialization (spec §3's "conjugate quaternion"),
/// computed in `planet::axis_rotation_for`.
pub struct OrbitGeometry<'a> {
    pub axis: Vec3,
    pub rotate_to_axis: &'a dyn Fn(Vec3) -> Vec3,
    pub rotate_from_axis: &'a dyn Fn(Vec3) -> Vec3,
}

impl<'a> OrbitGeometry<'a> {
    /// Unit surface direction for `(lat, lon)`, after applying the inverse
    /// axis rotation (spec §4.3).
    pub fn latitude_longitude_to_vector(&self, lat: f64, lon: f64) -> Vec3 {
        let unrotated = Vec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos());
        (self.rotate_to_axis)(unrotated)
    }

    pub fn vector_to_latitude(&self, v: Vec3) -> f64 {
        std::f64::consts::FRAC_PI_2 - angle_between(self.axis, v)
    }

    pub fn vector_to_longitude(&self, v: Vec3) -> f64 {
        let u = (self.rotate_from_axis)(v);
        u.x.atan2(u.z)
    }
}

/// Solar declination at true anomaly `tau` (spec §4.3); `0` when the planet
/// has no orbit.
pub fn solar_declination(axial_tilt: f64, orbit: Option<&Orbit>, tau: f64) -> f64 {
    match orbit {
        Some(o) => ((-axial_tilt).sin() * o.ecliptic_longitude(tau).sin()).asin(),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(v: Vec3) -> Vec3 {
        v
    }

    fn sample_orbit() -> Orbit {
        Orbit {
            semi_major_axis_m: 1.496e11,
            eccentricity: 0.0167,
            inclination: 0.0,
            longitude_of_periapsis: 0.0,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            true_anomaly: 0.0,
            period_s: 365.25 * 86_400.0,
            orbited_mass_kg: 1.989e30,
        }
    }

    #[test]
    fn round_trip_lat_lon_without_axis_tilt() {
        let geo = OrbitGeometry { axis: Vec3::UNIT_Y, rotate_to_axis: &identity, rotate_from_axis: &identity };
        for (lat, lon) in [(0.3, 1.1), (-0.6, -2.0), (0.0, 0.0)] {
            let v = geo.latitude_longitude_to_vector(lat, lon);
            assert!((geo.vector_to_latitude(v) - lat).abs() < 1e-9);
            assert!((geo.vector_to_longitude(v) - lon).abs() < 1e-9);
        }
    }

    #[test]
    fn proportion_of_year_at_solstices() {
        let orbit = sample_orbit();
        let winter = orbit.winter_solstice_true_anomaly();
        let summer = orbit.summer_solstice_true_anomaly();
        assert!(orbit.proportion_of_year(winter).abs() < 1e-9);
        assert!((orbit.proportion_of_year(summer) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn apoapsis_exceeds_periapsis() {
        let orbit = sample_orbit();
        assert!(orbit.apoapsis_m() > orbit.periapsis_m());
    }

    #[test]
    fn zero_tilt_declination_is_zero() {
        let orbit = sample_orbit();
        assert_eq!(solar_declination(0.0, Some(&orbit), 1.2), 0.0);
    }

    #[test]
    fn no_orbit_declination_is_zero() {
        assert_eq!(solar_declination(0.4, None, 1.2), 0.0);
    }
}
