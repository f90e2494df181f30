//! Illumination, sunrise/sunset, satellite phase, and habitability
//! (spec §4.7). These read a finished `Planet` and, where stellar geometry
//! matters, the caller-supplied stars/satellites — they never mutate
//! state and always return a value for any finite input (spec §7).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::collaborators::{Satellite, Star};
use crate::params::{HabitabilityRequirements, PlanetParams};
use crate::planet::Planet;
use crate::sphere::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitabilityFailure {
    NoWater,
    UnbreathableAtmosphere,
    TooCold,
    TooHot,
    LowPressure,
    HighPressure,
    LowGravity,
    HighGravity,
}

fn solar_elevation(axis: Vec3, surface_normal: Vec3, star_direction: Vec3) -> f64 {
    let _ = axis;
    std::f64::consts::FRAC_PI_2 - crate::sphere::angle_between(surface_normal, star_direction)
}

/// Sum over system stars of `luminous_flux * sin(solar_elevation)` for
/// positive elevations, plus reflected satellite flux (spec §4.7).
pub fn illumination(planet: &Planet, stars: &[Star], satellites: &[Satellite], lat: f64, lon: f64) -> f64 {
    let unrotated = crate::coords::LatLon::new(lat, lon).to_unrotated_vector();
    let surface_normal = planet.rotate_unrotated_to_world(unrotated);

    let mut total = 0.0;
    for star in stars {
        let to_star = star.position.sub(planet.position);
        let distance = to_star.length().max(1.0);
        let direction = to_star.normalize();
        let elevation = solar_elevation(planet.axis, surface_normal, direction);
        if elevation > 0.0 {
            let luminous_flux = star.luminosity_w / (4.0 * std::f64::consts::PI * distance * distance);
            total += luminous_flux * elevation.sin();
        }
    }

    for sat in satellites {
        let to_sat = sat.position.sub(planet.position);
        let distance = to_sat.length().max(1.0);
        let direction = to_sat.normalize();
        let elevation = solar_elevation(planet.axis, surface_normal, direction);
        if elevation > 0.0 {
            if let Some(star) = stars.first() {
                let star_to_sat = sat.position.sub(star.position);
                let phase_angle = crate::sphere::angle_between(star_to_sat.scale(-1.0), to_sat.scale(-1.0));
                let lit_fraction = (1.0 + phase_angle.cos()) / 2.0;
                let reflected = star.luminosity_w / (4.0 * std::f64::consts::PI * distance * distance)
                    * sat.albedo
                    * lit_fraction;
                total += reflected;
            }
        }
    }

    total
}

pub struct SunriseSunset {
    pub sunrise: Option<f64>,
    pub sunset: Option<f64>,
}

/// Sunrise/sunset as a proportion of the rotational period (spec §4.7).
/// Returns `None` for both endpoints when there is no nearest star.
pub fn sunrise_sunset(planet: &Planet, nearest_star: Option<&Star>, lat: f64, rotational_period_s: f64) -> SunriseSunset {
    let Some(_star) = nearest_star else {
        return SunriseSunset { sunrise: None, sunset: None };
    };
    let true_anomaly = planet.orbit.as_ref().map(|o| o.true_anomaly).unwrap_or(0.0);
    let declination = crate::orbit::solar_declination(planet.angle_of_rotation, planet.orbit.as_ref(), true_anomaly);

    let d = declination.cos() * lat.cos();
    if d.abs() < 1e-9 {
        // Polar night or midnight sun: decide by the sign of sin(declination)*sin(latitude).
        // Exactly one endpoint is null — the other carries the degenerate-day sentinel.
        return if declination.sin() * lat.sin() > 0.0 {
            SunriseSunset { sunrise: Some(0.0), sunset: None }
        } else {
            SunriseSunset { sunrise: None, sunset: Some(0.0) }
        };
    }

    let angular_velocity = std::f64::consts::TAU / rotational_period_s;
    let cos_h = (-declination.sin() * lat.sin() / d).clamp(-1.0, 1.0);
    let h = cos_h.acos() / angular_velocity;
    let half_period = rotational_period_s / 2.0;
    let sunrise = ((half_period - h).rem_euclid(rotational_period_s)) / rotational_period_s;
    let sunset = ((h + half_period).rem_euclid(rotational_period_s)) / rotational_period_s;
    SunriseSunset { sunrise: Some(sunrise), sunset: Some(sunset) }
}

pub struct SatellitePhase {
    pub illuminated_fraction: f64,
    pub waxing: Option<bool>,
}

/// Satellite phase (spec §4.7): elongation from the planet's point of view,
/// phase angle, and illuminated fraction. `waxing` is only meaningful with
/// exactly one star.
pub fn satellite_phase(planet: &Planet, stars: &[Star], satellite: &Satellite, observer_lat: f64, observer_lon: f64) -> SatellitePhase {
    let unrotated = crate::coords::LatLon::new(observer_lat, observer_lon).to_unrotated_vector();
    let observer = planet.rotate_unrotated_to_world(unrotated);

    let Some(star) = stars.first() else {
        return SatellitePhase { illuminated_fraction: 0.5, waxing: None };
    };

    let to_sat = satellite.position.sub(planet.position);
    let to_star = star.position.sub(planet.position);
    let d_sat = to_sat.length().max(1.0);
    let d_star = to_star.length().max(1.0);

    // Elongation as seen by the observer: angle planet-to-satellite vs
    // planet-to-star, subtending the same angle `le` used for phase angle.
    let le = crate::sphere::angle_between(to_star, to_sat);
    let _elongation = crate::sphere::angle_between(observer, to_sat);
    let phase_angle = (d_sat - d_star * le.cos()).atan2(d_star * le.sin());
    let illuminated_fraction = (1.0 + phase_angle.cos()) / 2.0;

    let waxing = if stars.len() == 1 {
        let star_ra = to_star.x.atan2(to_star.z);
        let sat_ra = to_sat.x.atan2(to_sat.z);
        Some(wrap_pi(sat_ra - star_ra) > 0.0)
    } else {
        None
    };

    SatellitePhase { illuminated_fraction, waxing }
}

fn wrap_pi(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let wrapped = ((angle + std::f64::consts::PI) % tau + tau) % tau - std::f64::consts::PI;
    wrapped
}

/// Habitability check against a requirement set (spec §4.7): coldest is
/// the minimum equatorial temperature at apoapsis minus diurnal variation,
/// hottest is the maximum polar temperature at periapsis.
pub fn habitability(planet: &Planet, requirements: &HabitabilityRequirements, params: &PlanetParams) -> HashSet<HabitabilityFailure> {
    let mut failures = HashSet::new();

    if requirements.require_liquid_water && !planet.has_liquid_water() {
        failures.insert(HabitabilityFailure::NoWater);
    }

    for req in &requirements.atmospheric_requirements {
        let proportion = planet.atmosphere.material.proportion_of(req.substance);
        let value = rust_decimal::prelude::ToPrimitive::to_f64(&proportion).unwrap_or(0.0);
        let below = value < req.min_proportion;
        let above = req.max_proportion.map(|max| value > max).unwrap_or(false);
        if below || above {
            failures.insert(HabitabilityFailure::UnbreathableAtmosphere);
        }
    }

    let diurnal_variation_k = 10.0;
    let coldest = planet.surface_temperature_at_apoapsis_k - diurnal_variation_k;
    let hottest = planet.surface_temperature_at_periapsis_k + diurnal_variation_k;
    if coldest < requirements.min_temperature_k {
        failures.insert(HabitabilityFailure::TooCold);
    }
    if hottest > requirements.max_temperature_k {
        failures.insert(HabitabilityFailure::TooHot);
    }

    if planet.atmosphere.pressure_kpa < requirements.min_pressure_kpa {
        failures.insert(HabitabilityFailure::LowPressure);
    }
    if planet.atmosphere.pressure_kpa > requirements.max_pressure_kpa {
        failures.insert(HabitabilityFailure::HighPressure);
    }

    if planet.surface_gravity < requirements.min_gravity {
        failures.insert(HabitabilityFailure::LowGravity);
    }
    if planet.surface_gravity > requirements.max_gravity {
        failures.insert(HabitabilityFailure::HighGravity);
    }

    let _ = params;
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::planet::PlanetType;

    fn sunlike_star() -> Star {
        Star { luminosity_w: 3.828e26, mass_kg: 1.989e30, position: Vec3::ZERO, temperature_k: 5778.0 }
    }

    #[test]
    fn no_water_planet_fails_habitability_with_no_water() {
        let mut params = PlanetParams::default();
        params.earth_water_ratio = 0.0;
        let planet = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let reqs = HabitabilityRequirements::default();
        let failures = habitability(&planet, &reqs, &params);
        assert!(failures.contains(&HabitabilityFailure::NoWater));
    }

    #[test]
    fn illumination_is_non_negative_for_any_configuration() {
        let params = PlanetParams::default();
        let planet = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let value = illumination(&planet, &[sunlike_star()], &[], 0.2, 0.5);
        assert!(value >= 0.0);
    }

    #[test]
    fn satellite_phase_fraction_in_unit_interval() {
        let params = PlanetParams::default();
        let planet = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let sat = Satellite { position: Vec3::new(3.844e8, 0.0, 0.0), albedo: 0.12, radius_m: 1.737e6 };
        let phase = satellite_phase(&planet, &[sunlike_star()], &sat, 0.0, 0.0);
        assert!((0.0..=1.0).contains(&phase.illuminated_fraction));
    }

    #[test]
    fn no_nearest_star_gives_null_sunrise_sunset() {
        let params = PlanetParams::default();
        let planet = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let result = sunrise_sunset(&planet, None, 0.0, 86_400.0);
        assert!(result.sunrise.is_none());
        assert!(result.sunset.is_none());
    }
}
