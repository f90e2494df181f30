//! Blackbody/greenhouse/insolation factors, lapse rates, and the barometric
//! formula (spec §4.4).

/// Dry air specific heat at constant pressure, J/(kg*K).
pub const CP_DRY_AIR: f64 = 1004.68506;
/// Universal gas constant, J/(mol*K).
pub const GAS_CONSTANT: f64 = 8.31446;
/// Earth-air molar mass, kg/mol (declared approximation per spec §4.4).
pub const EARTH_AIR_MOLAR_MASS: f64 = 0.0289644;
/// cos(polar latitude) used by the air-mass approximation.
pub const COS_POLAR_LATITUDE: f64 = 0.095;
/// Stefan-Boltzmann constant, W/(m^2*K^4).
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;
/// Solar constant scaling term from spec §4.4's insolation formula.
const INSOLATION_LUMINOSITY_TERM: f64 = 1_320_000.0;

/// Air mass traversed by a ray entering at the polar limb, relative to the
/// zenith path, as a function of scale height `h` (planet radii).
pub fn polar_air_mass(scale_height_radii: f64) -> f64 {
    let r_over_h = COS_POLAR_LATITUDE / scale_height_radii.max(1e-12);
    (r_over_h * r_over_h + 2.0 * (1.0 / scale_height_radii.max(1e-12)) + 1.0).sqrt() - r_over_h
}

/// Insolation factor at atmospheric mass `m` (kg) and scale height (planet
/// radii), optionally at the pole.
pub fn insolation_factor(atmospheric_mass_kg: f64, scale_height_radii: f64, planet_mass_kg: f64, polar: bool) -> f64 {
    let attenuation = if polar {
        0.7f64.powf(polar_air_mass(scale_height_radii).powf(0.678))
    } else {
        0.7
    };
    let ratio = INSOLATION_LUMINOSITY_TERM * atmospheric_mass_kg * attenuation / planet_mass_kg.max(1e-12);
    ratio.max(0.0).powf(0.25)
}

/// Greenhouse effect in Kelvin: additive warming above blackbody equilibrium.
pub fn greenhouse_effect(avg_blackbody_k: f64, insolation: f64, greenhouse_factor: f64) -> f64 {
    (avg_blackbody_k * insolation * greenhouse_factor - avg_blackbody_k).max(0.0)
}

/// Blackbody equilibrium temperature from incident flux at distance `d`
/// (meters) from a star of luminosity `l` (watts), with surface albedo.
pub fn blackbody_temperature(luminosity_w: f64, distance_m: f64, albedo: f64) -> f64 {
    if distance_m < 1.0 {
        return 0.0;
    }
    let flux = luminosity_w / (4.0 * std::f64::consts::PI * distance_m * distance_m);
    let absorbed = flux * (1.0 - albedo).max(0.0);
    (absorbed / STEFAN_BOLTZMANN).max(0.0).powf(0.25)
}

/// Dry adiabatic lapse rate, K/m.
pub fn dry_lapse_rate(surface_gravity: f64) -> f64 {
    surface_gravity / CP_DRY_AIR
}

/// Moist adiabatic lapse rate (standard approximation, dry-air constants
/// per spec §4.4's "documented approximation"). `water_vapor_ratio` is the
/// atmosphere's water-vapor mass fraction.
pub fn moist_lapse_rate(surface_gravity: f64, temperature_k: f64, water_vapor_ratio: f64) -> f64 {
    let dry = dry_lapse_rate(surface_gravity);
    let latent_heat_vaporization = 2.501e6; // J/kg
    let r_v = GAS_CONSTANT / 0.018015; // water vapor specific gas constant
    let mixing_ratio = water_vapor_ratio.max(0.0);
    let numerator = 1.0 + (latent_heat_vaporization * mixing_ratio) / (r_v * temperature_k.max(1.0));
    let denominator = 1.0
        + (latent_heat_vaporization.powi(2) * mixing_ratio)
            / (CP_DRY_AIR * r_v * temperature_k.max(1.0).powi(2));
    dry * (numerator / denominator.max(1e-12))
}

/// Temperature at elevation `h` (meters) above `surface_temperature_k`
/// (spec §4.4): clamps at the atmosphere's top and blends toward the
/// surface value near ground level to model convective mixing.
pub fn temperature_at_elevation(
    surface_temperature_k: f64,
    avg_blackbody_k: f64,
    h: f64,
    atmospheric_height: f64,
    max_elevation: f64,
    surface_gravity: f64,
    water_vapor_ratio: f64,
) -> f64 {
    if h >= atmospheric_height {
        return avg_blackbody_k;
    }
    if h <= 0.0 {
        return surface_temperature_k;
    }
    let lapse = |t: f64| moist_lapse_rate(surface_gravity, t, water_vapor_ratio);
    let t_prime = surface_temperature_k - h * lapse(surface_temperature_k);
    let t_double_prime = surface_temperature_k - h * lapse(t_prime);
    let weight = (4.0 * h / max_elevation.max(1e-12)).min(1.0);
    surface_temperature_k * (1.0 - weight) + t_double_prime * weight
}

/// Barometric formula: pressure in kPa at elevation `h` (meters).
pub fn pressure_at_elevation(surface_pressure_kpa: f64, h: f64, temperature_k: f64, surface_gravity: f64) -> f64 {
    let exponent = -(surface_gravity * EARTH_AIR_MOLAR_MASS * h) / (GAS_CONSTANT * temperature_k.max(1.0));
    surface_pressure_kpa * exponent.exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_at_zero_elevation_is_surface() {
        let t = temperature_at_elevation(288.0, 255.0, 0.0, 100_000.0, 20_000.0, 9.81, 0.01);
        assert_eq!(t, 288.0);
    }

    #[test]
    fn temperature_above_atmosphere_is_blackbody() {
        let t = temperature_at_elevation(288.0, 255.0, 100_000.0, 100_000.0, 20_000.0, 9.81, 0.01);
        assert_eq!(t, 255.0);
    }

    #[test]
    fn temperature_decreases_with_altitude() {
        let low = temperature_at_elevation(288.0, 255.0, 1000.0, 100_000.0, 20_000.0, 9.81, 0.01);
        let high = temperature_at_elevation(288.0, 255.0, 8000.0, 100_000.0, 20_000.0, 9.81, 0.01);
        assert!(low > high);
        assert!(high < 288.0);
    }

    #[test]
    fn pressure_decreases_with_altitude() {
        let p0 = pressure_at_elevation(101.325, 0.0, 288.0, 9.81);
        let p1 = pressure_at_elevation(101.325, 8000.0, 288.0, 9.81);
        assert!(p1 < p0);
        assert!(p1 > 0.0);
    }

    #[test]
    fn greenhouse_effect_is_never_negative() {
        assert_eq!(greenhouse_effect(255.0, 0.9, 1.0), 0.0);
        assert!(greenhouse_effect(255.0, 1.2, 1.3) > 0.0);
    }

    #[test]
    fn insolation_factor_lower_at_pole() {
        let eq = insolation_factor(5.1e18, 0.01, 5.97e24, false);
        let po = insolation_factor(5.1e18, 0.01, 5.97e24, true);
        assert!(po <= eq);
    }
}
