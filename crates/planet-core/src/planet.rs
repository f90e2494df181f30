//! The `Planet` root record (spec §3): immutable after generation except
//! for the explicitly-mutating setters, which invalidate the cached
//! thermal fields they affect.

use serde::{Deserialize, Serialize};

use crate::atmosphere::Atmosphere;
use crate::material::{Composite, MaterialLayer};
use crate::orbit::Orbit;
use crate::resources::ResourceDeposit;
use crate::rings::RingSystem;
use crate::sphere::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetType {
    Terrestrial,
    Carbon,
    GasGiant,
    IceGiant,
    Dwarf,
    Asteroid,
    Comet,
}

impl PlanetType {
    pub fn is_giant(self) -> bool {
        matches!(self, PlanetType::GasGiant | PlanetType::IceGiant)
    }

    pub fn has_crust(self) -> bool {
        !matches!(self, PlanetType::GasGiant | PlanetType::IceGiant)
    }

    pub fn has_hydrosphere(self) -> bool {
        matches!(self, PlanetType::Terrestrial)
    }
}

/// Cached derived thermal fields; reset by the mutating setters (spec §3
/// Lifecycles).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThermalCache {
    pub average_surface_temperature_k: Option<f64>,
    pub greenhouse_effect_k: Option<f64>,
    pub insolation_factor_equatorial: Option<f64>,
    pub insolation_factor_polar: Option<f64>,
    pub max_surface_temperature_k: Option<f64>,
    pub min_surface_temperature_k: Option<f64>,
}

impl ThermalCache {
    pub fn invalidate(&mut self) {
        *self = ThermalCache::default();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub seed: u32,
    pub noise_seeds: [u32; 5],
    pub planet_type: PlanetType,

    // Geometry
    pub radius_m: f64,
    pub flattening: f64,
    pub position: Vec3,
    pub axis: Vec3,
    /// Quaternion `(w, [x, y, z])` mapping world Y onto `axis` via
    /// precession + tilt (spec §3).
    pub axis_rotation: (f64, [f64; 3]),
    pub angle_of_rotation: f64,
    pub axial_precession: f64,
    pub orbit: Option<Orbit>,

    // Thermal state
    pub albedo: f64,
    pub surface_albedo: f64,
    pub blackbody_temperature_k: f64,
    pub surface_temperature_at_apoapsis_k: f64,
    pub surface_temperature_at_periapsis_k: f64,
    pub average_blackbody_temperature_k: f64,
    pub thermal_cache: ThermalCache,

    // Composition
    pub material: Composite,
    pub hydrosphere: Option<MaterialLayer>,
    pub atmosphere: Atmosphere,
    pub resources: Vec<ResourceDeposit>,
    pub rings: RingSystem,

    // Sea
    pub normalized_sea_level: f64,
    pub sea_level_m: f64,

    pub mass_kg: f64,
    pub surface_gravity: f64,
    pub has_biosphere: bool,
}

impl Planet {
    /// `200 km / surface_gravity` (spec Glossary).
    pub fn max_elevation_m(&self) -> f64 {
        200_000.0 / self.surface_gravity.max(1e-6)
    }

    pub fn has_liquid_water(&self) -> bool {
        self.hydrosphere.is_some() && self.atmosphere.water_ratio > 0.0
    }

    /// Sets atmospheric pressure and invalidates temperature-dependent
    /// caches (spec §3 Lifecycles).
    pub fn set_atmospheric_pressure(&mut self, pressure_kpa: f64) {
        self.atmosphere.pressure_kpa = pressure_kpa;
        self.thermal_cache.invalidate();
    }

    /// Sets axial tilt (as `angle_of_rotation`'s tilt component) and
    /// invalidates temperature-dependent caches.
    pub fn set_axial_tilt(&mut self, tilt_radians: f64) {
        self.angle_of_rotation = tilt_radians;
        self.axis = axis_from_tilt_and_precession(tilt_radians, self.axial_precession);
        self.axis_rotation = axis_rotation_quaternion(self.axis);
        self.thermal_cache.invalidate();
    }

    pub fn set_orbit(&mut self, orbit: Option<Orbit>) {
        self.orbit = orbit;
        self.thermal_cache.invalidate();
    }

    pub fn rotate_unrotated_to_world(&self, v: Vec3) -> Vec3 {
        Vec3::from_array(quaternion::rotate_vector(self.axis_rotation, v.to_array()))
    }

    pub fn rotate_world_to_unrotated(&self, v: Vec3) -> Vec3 {
        let conj = quaternion::conj(self.axis_rotation);
        Vec3::from_array(quaternion::rotate_vector(conj, v.to_array()))
    }
}

/// Axis vector from tilt (rotation about X) + precession (rotation about
/// Y) applied to world-up, matching `axis_rotation`'s intent (spec §3, §4.5
/// step 4).
pub fn axis_from_tilt_and_precession(tilt_radians: f64, precession_radians: f64) -> Vec3 {
    let tilted = Vec3::new(0.0, tilt_radians.cos(), tilt_radians.sin());
    // Rotate about Y by the precession angle.
    Vec3::new(
        tilted.x * precession_radians.cos() + tilted.z * precession_radians.sin(),
        tilted.y,
        -tilted.x * precession_radians.sin() + tilted.z * precession_radians.cos(),
    )
    .normalize()
}

/// Quaternion mapping world Y onto `axis` (the conjugate used by
/// `OrbitGeometry::latitude_longitude_to_vector`, spec §3).
pub fn axis_rotation_quaternion(axis: Vec3) -> (f64, [f64; 3]) {
    quaternion::rotation_from_to([0.0, 1.0, 0.0], axis.to_array())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_from_zero_tilt_and_precession_is_unit_y() {
        let axis = axis_from_tilt_and_precession(0.0, 0.0);
        assert!((axis.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn axis_is_unit_length() {
        for tilt in [0.1, 0.4, 1.0] {
            for prec in [0.0, 1.5, 3.0] {
                let axis = axis_from_tilt_and_precession(tilt, prec);
                assert!((axis.length() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn axis_rotation_quaternion_maps_y_to_axis() {
        let axis = axis_from_tilt_and_precession(0.4, 1.1);
        let q = axis_rotation_quaternion(axis);
        let rotated = quaternion::rotate_vector(q, [0.0, 1.0, 0.0]);
        assert!((rotated[0] - axis.x).abs() < 1e-9);
        assert!((rotated[1] - axis.y).abs() < 1e-9);
        assert!((rotated[2] - axis.z).abs() < 1e-9);
    }

    #[test]
    fn planet_type_has_crust_excludes_giants() {
        assert!(!PlanetType::GasGiant.has_crust());
        assert!(PlanetType::Terrestrial.has_crust());
    }
}
