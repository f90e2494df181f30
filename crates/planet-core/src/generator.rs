//! The generator orchestrator (spec §4.5): the one piece of the system with
//! genuinely interesting control flow — a damped fixed-point iteration
//! that brings surface temperature and atmospheric composition into
//! agreement, followed by a phase cascade and a carbon-silicate sink that
//! can kick the loop's assumptions out from under it.

use log::{debug, trace};

use crate::atmosphere::{calculate_phases, carbon_silicate_sink, Atmosphere};
use crate::collaborators::Star;
use crate::hydrosphere::derive_hydrosphere;
use crate::material::{
    carbon_crust_constituents, constituents_from_fractions, terrestrial_crust_constituents, Composite, LayerKind,
    MaterialLayer, Shape,
};
use crate::noise::NoiseField;
use crate::orbit::Orbit;
use crate::params::PlanetParams;
use crate::planet::{axis_from_tilt_and_precession, axis_rotation_quaternion, Planet, PlanetType, ThermalCache};
use crate::rehydrator::{index, Rehydrator};
use crate::resources::enumerate_resources;
use crate::rings::generate_rings;
use crate::substances::Substance;
use crate::thermodynamics::{blackbody_temperature, greenhouse_effect, insolation_factor};
use rust_decimal::Decimal;

const MAX_CONVERGENCE_ITERATIONS: u32 = 10;
const CONVERGENCE_TOLERANCE_K: f64 = 0.5;

/// Type-specific mass bounds (kg), used to clamp the gravity-derived draw
/// at generation step 1.
fn mass_bounds(planet_type: PlanetType) -> (f64, f64) {
    match planet_type {
        PlanetType::Terrestrial => (3.3e23, 1.3e25),
        PlanetType::Carbon => (3.3e23, 1.3e25),
        PlanetType::GasGiant => (1.0e26, 4.0e27),
        PlanetType::IceGiant => (5.0e25, 3.0e26),
        PlanetType::Dwarf => (1.0e20, 1.0e22),
        PlanetType::Asteroid => (1.0e15, 1.0e20),
        PlanetType::Comet => (1.0e12, 1.0e16),
    }
}

fn radius_bounds(planet_type: PlanetType) -> (f64, f64) {
    match planet_type {
        PlanetType::Terrestrial | PlanetType::Carbon => (3.0e6, 9.0e6),
        PlanetType::GasGiant => (5.0e7, 9.0e7),
        PlanetType::IceGiant => (2.0e7, 3.0e7),
        PlanetType::Dwarf => (2.0e5, 1.5e6),
        PlanetType::Asteroid => (1.0e3, 2.0e5),
        PlanetType::Comet => (1.0e2, 2.0e4),
    }
}

pub struct Generator;

impl Generator {
    /// One invocation per seed, per spec §4.5.
    pub fn generate(
        seed: u32,
        planet_type: PlanetType,
        params: &PlanetParams,
        provided_orbit: Option<Orbit>,
        stars: &[Star],
    ) -> Planet {
        let r = Rehydrator::new(seed);
        debug!("generating planet seed={seed} type={planet_type:?}");

        // Step 1: rehydrate.
        let axial_precession = r.next_double(index::AXIS_PRECESSION, 0.0, std::f64::consts::TAU);
        let density = r.next_double(9, 3000.0, 8000.0);
        let flattening = r.next_double(index::SHAPE_FLATTENING, 0.0, 0.1);
        let (r_min, r_max) = radius_bounds(planet_type);
        let radius_m = r.next_double(8, r_min, r_max);
        let (m_min, m_max) = mass_bounds(planet_type);
        let gravity_mass = density * (4.0 / 3.0) * std::f64::consts::PI * radius_m.powi(3);
        let mass_kg = gravity_mass.clamp(m_min, m_max);
        let surface_gravity = 6.674_3e-11 * mass_kg / (radius_m * radius_m);

        // Step 2: compose material by type.
        let noise_field_seeds = [
            r.next_u32(index::NOISE_SEED_1),
            r.next_u32(index::NOISE_SEED_2),
            r.next_u32(index::NOISE_SEED_3),
            r.next_u32(index::NOISE_SEED_4),
            r.next_u32(index::NOISE_SEED_5),
        ];
        let material = compose_material(planet_type, radius_m, mass_kg, &r);

        // Step 3: orbit.
        let orbit = provided_orbit.or_else(|| Some(assign_orbit(planet_type, &r, params)));

        // Step 4: axis.
        let inclination = orbit.as_ref().map(|o| o.inclination).unwrap_or(0.0);
        let angle_of_rotation = (params.earth_axial_tilt + inclination) % std::f64::consts::PI;
        let axis = axis_from_tilt_and_precession(angle_of_rotation, axial_precession);
        let axis_rotation = axis_rotation_quaternion(axis);

        // Step 5: temperatures at position / apoapsis / periapsis.
        let albedo = params.earth_albedo;
        let (bb_here, bb_apo, bb_peri) = match &orbit {
            Some(o) => (
                summed_blackbody(stars, o.semi_major_axis_m, albedo),
                summed_blackbody(stars, o.apoapsis_m(), albedo),
                summed_blackbody(stars, o.periapsis_m(), albedo),
            ),
            None => (0.0, 0.0, 0.0),
        };
        let average_blackbody_temperature_k = (bb_apo + bb_peri) / 2.0;

        // Step 6: hydrosphere (terrestrial only).
        let max_elevation_m = 200_000.0 / surface_gravity.max(1e-6);
        let hydro = if planet_type.has_hydrosphere() {
            Some(derive_hydrosphere(params.earth_water_ratio, max_elevation_m, radius_m, &r))
        } else {
            None
        };
        let (normalized_sea_level, sea_level_m, mut hydrosphere_layer) = match hydro {
            Some(h) => (h.normalized_sea_level, h.sea_level_m, h.layer),
            None => (-1.1, -1.1 * max_elevation_m, None),
        };

        // Step 7: atmosphere.
        let mut atmosphere = compose_atmosphere(planet_type, radius_m, mass_kg, params, &r);

        let mut surface_albedo = albedo;
        let mut average_surface_temperature_k = bb_here;
        let mut greenhouse = 0.0;

        // Step 8+9: convergence loop with the phase cascade folded into each
        // pass (terrestrial only), so surface albedo tracks that pass's
        // ice/cloud state rather than only being corrected once afterward.
        if planet_type == PlanetType::Terrestrial {
            let outcome = run_convergence_loop(
                bb_here,
                average_blackbody_temperature_k,
                max_elevation_m,
                surface_gravity,
                mass_kg,
                &mut atmosphere,
                hydrosphere_layer.as_mut(),
                params,
            );
            average_surface_temperature_k = outcome.surface_temperature_k;
            greenhouse = outcome.greenhouse_k;
            surface_albedo = outcome.surface_albedo;
        }

        // Step 10: carbon-silicate sink.
        let mut has_biosphere = false;
        if carbon_silicate_sink(&mut atmosphere, &r) {
            trace!("carbon-silicate sink fired for seed {seed}");
            greenhouse = 0.0;
        }

        // Step 11: life hook.
        let liquid_water_present = hydrosphere_layer.is_some() && atmosphere.water_ratio > 0.0;
        if liquid_water_present {
            has_biosphere = true;
        }

        // Step 12: breathability top-up (clamp O2/CO2 into a breathable band).
        top_up_breathability(&mut atmosphere);

        // Step 13: resources.
        let resources = enumerate_resources(&material, surface_gravity > 6.0, &r);

        // Step 14: rings.
        let rings = generate_rings(
            planet_type.is_giant(),
            radius_m,
            density,
            orbit.as_ref().map(|o| o.semi_major_axis_m).unwrap_or(radius_m * 100.0),
            mass_kg,
            orbit.as_ref().map(|o| o.orbited_mass_kg).unwrap_or(1.989e30),
            &r,
        );

        Planet {
            seed,
            noise_seeds: noise_field_seeds,
            planet_type,
            radius_m,
            flattening,
            position: crate::sphere::Vec3::ZERO,
            axis,
            axis_rotation,
            angle_of_rotation,
            axial_precession,
            orbit,
            albedo,
            surface_albedo,
            blackbody_temperature_k: bb_here,
            surface_temperature_at_apoapsis_k: bb_apo,
            surface_temperature_at_periapsis_k: bb_peri,
            average_blackbody_temperature_k,
            thermal_cache: ThermalCache {
                average_surface_temperature_k: Some(average_surface_temperature_k),
                greenhouse_effect_k: Some(greenhouse),
                ..ThermalCache::default()
            },
            material,
            hydrosphere: hydrosphere_layer,
            atmosphere,
            resources,
            rings,
            normalized_sea_level,
            sea_level_m,
            mass_kg,
            surface_gravity,
            has_biosphere,
        }
    }

    /// Builds the `NoiseField` for a generated planet's noise seeds.
    pub fn noise_field(planet: &Planet) -> NoiseField {
        let [s1, s2, s3, s4, s5] = planet.noise_seeds;
        NoiseField::new(s1, s2, s3, s4, s5)
    }
}

fn summed_blackbody(stars: &[Star], distance_m: f64, albedo: f64) -> f64 {
    if stars.is_empty() {
        return 0.0;
    }
    // L/d^2 summed across stars, each contributing its own blackbody term
    // combined as (sum of T^4-equivalent fluxes)^0.25.
    let flux_sum: f64 = stars
        .iter()
        .map(|s| blackbody_temperature(s.luminosity_w, distance_m, albedo).powi(4))
        .sum();
    flux_sum.max(0.0).powf(0.25)
}

fn compose_material(planet_type: PlanetType, radius_m: f64, mass_kg: f64, r: &Rehydrator) -> Composite {
    let core_fraction = 0.15;
    let core_radius = radius_m * core_fraction.cbrt();
    let core_shape = Shape::Sphere { radius_m: core_radius };
    let mantle_shape = Shape::HollowSphere { inner_radius_m: core_radius, outer_radius_m: radius_m * 0.95 };
    let crust_shape = Shape::HollowSphere { inner_radius_m: radius_m * 0.95, outer_radius_m: radius_m };

    match planet_type {
        PlanetType::Terrestrial => {
            let core = MaterialLayer::new(
                LayerKind::Core,
                core_shape,
                mass_kg * 0.15,
                constituents_from_fractions(vec![(Substance::IronNickel, Decimal::ONE)]),
            );
            let mantle = MaterialLayer::new(
                LayerKind::Mantle,
                mantle_shape,
                mass_kg * 0.70,
                constituents_from_fractions(vec![(Substance::Peridotite, Decimal::ONE)]),
            );
            let crust = MaterialLayer::new(LayerKind::Crust, crust_shape, mass_kg * 0.15, terrestrial_crust_constituents(r));
            Composite { layers: vec![core, mantle, crust] }
        }
        PlanetType::Carbon => {
            let core = MaterialLayer::new(
                LayerKind::Core,
                core_shape,
                mass_kg * 0.15,
                constituents_from_fractions(vec![(Substance::IronSteelNickel, Decimal::ONE)]),
            );
            let mantle = MaterialLayer::new(
                LayerKind::Mantle,
                mantle_shape,
                mass_kg * 0.70,
                constituents_from_fractions(vec![
                    (Substance::SiliconCarbide, Decimal::new(6, 1)),
                    (Substance::Diamond, Decimal::ZERO),
                ]),
            );
            let crust = MaterialLayer::new(LayerKind::Crust, crust_shape, mass_kg * 0.15, carbon_crust_constituents(r));
            Composite { layers: vec![core, mantle, crust] }
        }
        PlanetType::GasGiant => {
            // Fe-Ni inner core, chondritic outer core, metallic-H lower
            // mantle, supercritical H/He/trace upper layer: fractions sum
            // to 1.0 (spec §4.5 step 2).
            let inner_core = MaterialLayer::new(
                LayerKind::Core,
                core_shape,
                mass_kg * 0.03,
                constituents_from_fractions(vec![(Substance::IronNickel, Decimal::ONE)]),
            );
            let outer_core = MaterialLayer::new(
                LayerKind::Core,
                Shape::HollowSphere { inner_radius_m: core_radius, outer_radius_m: radius_m * 0.2 },
                mass_kg * 0.07,
                constituents_from_fractions(vec![(Substance::Chondrite, Decimal::ONE)]),
            );
            let lower_mantle = MaterialLayer::new(
                LayerKind::Mantle,
                Shape::HollowSphere { inner_radius_m: radius_m * 0.2, outer_radius_m: radius_m * 0.95 },
                mass_kg * 0.80,
                constituents_from_fractions(vec![(Substance::MetallicHydrogen, Decimal::ONE)]),
            );
            let upper_layer = MaterialLayer::new(
                LayerKind::Mantle,
                crust_shape,
                mass_kg * 0.10,
                constituents_from_fractions(vec![
                    (Substance::Hydrogen, Decimal::new(85, 2)),
                    (Substance::Helium, Decimal::ZERO),
                ]),
            );
            Composite { layers: vec![inner_core, outer_core, lower_mantle, upper_layer] }
        }
        PlanetType::IceGiant => {
            // Diamond lower mantle and water-ammonia supercritical upper
            // layer, kept as distinct mantle layers; fractions sum to 1.0.
            let core = MaterialLayer::new(
                LayerKind::Core,
                core_shape,
                mass_kg * 0.10,
                constituents_from_fractions(vec![(Substance::IronNickel, Decimal::ONE)]),
            );
            let diamond_mantle = MaterialLayer::new(
                LayerKind::Mantle,
                Shape::HollowSphere { inner_radius_m: core_radius, outer_radius_m: radius_m * 0.6 },
                mass_kg * 0.35,
                constituents_from_fractions(vec![(Substance::Diamond, Decimal::ONE)]),
            );
            let supercritical_upper = MaterialLayer::new(
                LayerKind::Mantle,
                Shape::HollowSphere { inner_radius_m: radius_m * 0.6, outer_radius_m: radius_m },
                mass_kg * 0.55,
                constituents_from_fractions(vec![(Substance::WaterAmmonia, Decimal::ONE)]),
            );
            Composite { layers: vec![core, diamond_mantle, supercritical_upper] }
        }
        PlanetType::Dwarf | PlanetType::Asteroid => {
            let crust = MaterialLayer::new(
                LayerKind::Crust,
                Shape::Sphere { radius_m },
                mass_kg,
                constituents_from_fractions(vec![
                    (Substance::Chondrite, Decimal::new(7, 1)),
                    (Substance::WaterIce, Decimal::ZERO),
                ]),
            );
            Composite { layers: vec![crust] }
        }
        PlanetType::Comet => {
            let crust = MaterialLayer::new(
                LayerKind::Crust,
                Shape::Sphere { radius_m },
                mass_kg,
                constituents_from_fractions(vec![
                    (Substance::WaterIce, Decimal::new(6, 1)),
                    (Substance::DryIce, Decimal::ZERO),
                ]),
            );
            Composite { layers: vec![crust] }
        }
    }
}

fn assign_orbit(planet_type: PlanetType, r: &Rehydrator, params: &PlanetParams) -> Orbit {
    let eccentricity = match planet_type {
        PlanetType::Comet => r.next_double(40, 0.6, 0.95),
        PlanetType::Asteroid => r.next_double(40, 0.05, 0.3),
        _ => r.next_double(40, 0.0, 0.05),
    };
    let true_anomaly = if planet_type == PlanetType::Comet {
        // Seeded around apoapsis (spec §4.5 step 3).
        std::f64::consts::PI + r.next_double(41, -0.2, 0.2)
    } else {
        r.next_double(41, 0.0, std::f64::consts::TAU)
    };
    Orbit {
        semi_major_axis_m: params.earth_radius_m * 23_500.0,
        eccentricity,
        inclination: r.next_double(42, 0.0, 0.05),
        longitude_of_periapsis: r.next_double(43, 0.0, std::f64::consts::TAU),
        longitude_of_ascending_node: r.next_double(44, 0.0, std::f64::consts::TAU),
        argument_of_periapsis: r.next_double(45, 0.0, std::f64::consts::TAU),
        true_anomaly,
        period_s: params.earth_revolution_period_s,
        orbited_mass_kg: 1.989e30,
    }
}

fn compose_atmosphere(planet_type: PlanetType, radius_m: f64, mass_kg: f64, params: &PlanetParams, r: &Rehydrator) -> Atmosphere {
    match planet_type {
        PlanetType::Terrestrial => {
            Atmosphere::earth_like(radius_m, params.earth_atmospheric_pressure_kpa, mass_kg * 1e-6)
        }
        PlanetType::GasGiant | PlanetType::IceGiant => Atmosphere::gas_giant(radius_m, mass_kg * 0.01, r),
        _ => Atmosphere::thin_volatile(radius_m, mass_kg * 1e-8, r),
    }
}

struct ConvergenceOutcome {
    surface_temperature_k: f64,
    greenhouse_k: f64,
    surface_albedo: f64,
}

/// A rough ice-area proxy from surface temperature alone: saturates at 1.0
/// a full 40K below freezing, zero at or above freezing. Used to drive the
/// phase cascade's ice/cloud albedo term each convergence pass; it is not
/// a real ice-sheet model.
fn ice_area_fraction_estimate(surface_temperature_k: f64) -> f64 {
    ((WATER_MELTING_POINT_K - surface_temperature_k) / 40.0).clamp(0.0, 1.0)
}

const WATER_MELTING_POINT_K: f64 = 273.15;
const DEFAULT_CLOUD_COVER_FRACTION: f64 = 0.3;

/// The convergence loop (spec §4.5 step 8): a damped fixed-point search
/// for a surface albedo that makes the elevation-corrected equatorial
/// temperature match a target derived from Earth's calibration, with
/// anti-oscillation halving and a runaway guard that resets the target if
/// the residual grows while its sign holds steady. Each pass also runs the
/// phase cascade (spec §4.5 step 9) against the pass's temperature
/// estimate, so surface albedo tracks that pass's ice/cloud state and the
/// next pass's blackbody term is rescaled by the resulting albedo change
/// (the `(1 - a)^(1/4)` relationship a full inverse-blackbody solve would
/// use) instead of only being corrected once after the loop exits.
fn run_convergence_loop(
    blackbody_k: f64,
    average_blackbody_k: f64,
    max_elevation_m: f64,
    surface_gravity: f64,
    planet_mass_kg: f64,
    atmosphere: &mut Atmosphere,
    mut hydrosphere: Option<&mut MaterialLayer>,
    params: &PlanetParams,
) -> ConvergenceOutcome {
    let lapse_dry = crate::thermodynamics::dry_lapse_rate(surface_gravity);
    let avg_elevation = 0.04 * max_elevation_m;
    let target_equatorial = params.earth_surface_temperature_k * 1.06 + avg_elevation * lapse_dry;
    let original_effective_target =
        target_equatorial - greenhouse_effect(average_blackbody_k, 1.0, atmosphere.greenhouse_factor);
    let mut target = original_effective_target;

    let mut surface_albedo = params.earth_albedo;
    let mut prev_delta: Option<f64> = None;
    let mut step = 1.0;
    let mut greenhouse = 0.0;
    let mut surface_temp = blackbody_k;

    for _ in 0..MAX_CONVERGENCE_ITERATIONS {
        let albedo_scale = ((1.0 - surface_albedo) / (1.0 - params.earth_albedo).max(1e-6)).max(0.0).powf(0.25);
        let effective_average_blackbody_k = average_blackbody_k * albedo_scale;

        let insolation = insolation_factor(mass_kg_guess(atmosphere), atmosphere.scale_height, planet_mass_kg, false);
        greenhouse = greenhouse_effect(effective_average_blackbody_k, insolation, atmosphere.greenhouse_factor);
        surface_temp = target + greenhouse;

        let current = crate::thermodynamics::temperature_at_elevation(
            surface_temp,
            effective_average_blackbody_k,
            avg_elevation,
            20_000.0,
            max_elevation_m,
            surface_gravity,
            atmosphere.water_ratio,
        );

        let ice_area_fraction = ice_area_fraction_estimate(current);
        let (_, new_albedo) = calculate_phases(
            atmosphere,
            hydrosphere.as_deref_mut(),
            current,
            ice_area_fraction,
            DEFAULT_CLOUD_COVER_FRACTION,
            surface_albedo,
        );
        surface_albedo = new_albedo;

        let delta = target_equatorial - current;

        if let Some(prev) = prev_delta {
            if prev.signum() != delta.signum() && prev != 0.0 {
                step *= 0.5;
            } else if delta.abs() > prev.abs() {
                target = original_effective_target;
                step = 1.0;
            }
        }

        if delta.abs() <= CONVERGENCE_TOLERANCE_K {
            prev_delta = Some(delta);
            break;
        }

        target += delta * step;
        prev_delta = Some(delta);
    }

    ConvergenceOutcome { surface_temperature_k: surface_temp, greenhouse_k: greenhouse, surface_albedo }
}

fn mass_kg_guess(atmosphere: &Atmosphere) -> f64 {
    atmosphere.material.mass_kg.max(1.0)
}

fn top_up_breathability(atmosphere: &mut Atmosphere) {
    let o2 = atmosphere.material.proportion_of(Substance::Oxygen);
    let min_o2 = Decimal::new(16, 2);
    let max_o2 = Decimal::new(30, 2);
    if o2 < min_o2 {
        atmosphere.material.constituents.insert(Substance::Oxygen, min_o2);
    } else if o2 > max_o2 {
        atmosphere.material.constituents.insert(Substance::Oxygen, max_o2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PlanetParams;

    fn sunlike_star() -> Star {
        Star {
            luminosity_w: 3.828e26,
            mass_kg: 1.989e30,
            position: crate::sphere::Vec3::ZERO,
            temperature_k: 5778.0,
        }
    }

    #[test]
    fn terrestrial_seed_one_is_deterministic() {
        let params = PlanetParams::default();
        let a = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let b = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.noise_seeds, b.noise_seeds);
        assert_eq!(a.mass_kg, b.mass_kg);
        assert_eq!(a.sea_level_m, b.sea_level_m);
    }

    #[test]
    fn gas_giant_skips_hydrosphere_and_has_no_crust() {
        let params = PlanetParams::default();
        let planet = Generator::generate(42, PlanetType::GasGiant, &params, None, &[sunlike_star()]);
        assert!(planet.hydrosphere.is_none());
        assert!(planet.material.layer(LayerKind::Crust).is_none());
        assert!(planet.atmosphere.material.mass_kg > 0.0);
    }

    #[test]
    fn carbon_world_has_diamond_bearing_crust() {
        let params = PlanetParams::default();
        let planet = Generator::generate(7, PlanetType::Carbon, &params, None, &[sunlike_star()]);
        let crust = planet.material.layer(LayerKind::Crust).unwrap();
        assert!(crust.proportion_of(Substance::Diamond) > Decimal::ZERO);
    }

    #[test]
    fn zero_water_ratio_has_no_liquid_water() {
        let mut params = PlanetParams::default();
        params.earth_water_ratio = 0.0;
        let planet = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        assert!(!planet.has_liquid_water());
    }

    #[test]
    fn mass_conservation_holds() {
        let params = PlanetParams::default();
        let planet = Generator::generate(3, PlanetType::Terrestrial, &params, None, &[sunlike_star()]);
        let layer_mass: f64 = planet.material.total_mass_kg();
        assert!((layer_mass - planet.mass_kg).abs() < 1e-6 * planet.mass_kg);
    }

    #[test]
    fn gas_giant_mass_conservation_holds() {
        let params = PlanetParams::default();
        let planet = Generator::generate(5, PlanetType::GasGiant, &params, None, &[sunlike_star()]);
        let layer_mass: f64 = planet.material.total_mass_kg();
        assert!((layer_mass - planet.mass_kg).abs() < 1e-6 * planet.mass_kg);
    }

    #[test]
    fn ice_giant_mass_conservation_holds() {
        let params = PlanetParams::default();
        let planet = Generator::generate(6, PlanetType::IceGiant, &params, None, &[sunlike_star()]);
        let layer_mass: f64 = planet.material.total_mass_kg();
        assert!((layer_mass - planet.mass_kg).abs() < 1e-6 * planet.mass_kg);
    }
}
