//! Generation configuration (spec §6): Earth-calibrated defaults plus the
//! habitability requirement set queries are checked against.

use serde::{Deserialize, Serialize};

use crate::substances::Substance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetParams {
    pub earth_axial_tilt: f64,
    pub earth_rotational_period_s: f64,
    pub earth_revolution_period_s: f64,
    pub earth_atmospheric_pressure_kpa: f64,
    pub earth_surface_temperature_k: f64,
    pub earth_water_ratio: f64,
    pub earth_water_vapor_ratio: f64,
    pub earth_albedo: f64,
    pub earth_radius_m: f64,
    pub earth_surface_gravity: f64,
    pub earth_eccentricity: f64,
}

impl Default for PlanetParams {
    fn default() -> Self {
        Self {
            earth_axial_tilt: 23.44f64.to_radians(),
            earth_rotational_period_s: 86_164.1,
            earth_revolution_period_s: 365.256 * 86_400.0,
            earth_atmospheric_pressure_kpa: 101.325,
            earth_surface_temperature_k: 288.0,
            earth_water_ratio: 0.71,
            earth_water_vapor_ratio: 0.01,
            earth_albedo: 0.3,
            earth_radius_m: 6_371_000.0,
            earth_surface_gravity: 9.80665,
            earth_eccentricity: 0.0167,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphericRequirement {
    pub substance: Substance,
    pub min_proportion: f64,
    pub max_proportion: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitabilityRequirements {
    pub require_liquid_water: bool,
    pub atmospheric_requirements: Vec<AtmosphericRequirement>,
    pub min_temperature_k: f64,
    pub max_temperature_k: f64,
    pub min_pressure_kpa: f64,
    pub max_pressure_kpa: f64,
    pub min_gravity: f64,
    pub max_gravity: f64,
}

impl Default for HabitabilityRequirements {
    fn default() -> Self {
        Self {
            require_liquid_water: true,
            atmospheric_requirements: vec![
                AtmosphericRequirement { substance: Substance::Oxygen, min_proportion: 0.16, max_proportion: Some(0.30) },
                AtmosphericRequirement { substance: Substance::CarbonDioxide, min_proportion: 0.0, max_proportion: Some(0.01) },
            ],
            min_temperature_k: 260.0,
            max_temperature_k: 310.0,
            min_pressure_kpa: 50.0,
            max_pressure_kpa: 200.0,
            min_gravity: 4.0,
            max_gravity: 15.0,
        }
    }
}
