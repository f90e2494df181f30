//! Ring system generation (spec §4.5 step 14): icy/rocky Roche-limit
//! bands, bounded by the Hill sphere, split into alternating bands by
//! indexed coin flips.

use serde::{Deserialize, Serialize};

use crate::rehydrator::Rehydrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingComposition {
    Icy,
    Rocky,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingBand {
    pub inner_radius_m: f64,
    pub outer_radius_m: f64,
    pub composition: RingComposition,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RingSystem {
    pub bands: Vec<RingBand>,
}

const ICY_RING_DENSITY_KG_M3: f64 = 900.0;
const ROCKY_RING_DENSITY_KG_M3: f64 = 3000.0;

/// Roche-limit-like ring distance: `1.26 * R * (rho_planet / rho_ring)^(1/3)`.
fn roche_like_limit(planet_radius_m: f64, planet_density_kg_m3: f64, ring_density_kg_m3: f64) -> f64 {
    1.26 * planet_radius_m * (planet_density_kg_m3 / ring_density_kg_m3).cbrt()
}

/// Hill sphere radius for a body of mass `m` orbiting a mass `orbited_mass`
/// at distance `a`.
pub fn hill_sphere_radius_m(semi_major_axis_m: f64, planet_mass_kg: f64, orbited_mass_kg: f64) -> f64 {
    if orbited_mass_kg <= 0.0 {
        return 0.0;
    }
    semi_major_axis_m * (planet_mass_kg / (3.0 * orbited_mass_kg)).cbrt()
}

/// Probability a planet of this coarse kind gets a ring system (spec §4.5
/// step 14): 10% terrestrial, 90% giants.
pub fn ring_probability(is_giant: bool) -> f64 {
    if is_giant {
        0.9
    } else {
        0.1
    }
}

/// Generates a ring system for a planet, or an empty one if the indexed
/// draw says no rings form.
pub fn generate_rings(
    is_giant: bool,
    planet_radius_m: f64,
    planet_density_kg_m3: f64,
    semi_major_axis_m: f64,
    planet_mass_kg: f64,
    orbited_mass_kg: f64,
    r: &Rehydrator,
) -> RingSystem {
    let roll = r.next_double(70, 0.0, 1.0);
    if roll >= ring_probability(is_giant) {
        return RingSystem::default();
    }

    let icy_limit = roche_like_limit(planet_radius_m, planet_density_kg_m3, ICY_RING_DENSITY_KG_M3);
    let rocky_limit = roche_like_limit(planet_radius_m, planet_density_kg_m3, ROCKY_RING_DENSITY_KG_M3);
    let hill = hill_sphere_radius_m(semi_major_axis_m, planet_mass_kg, orbited_mass_kg);
    let outer_cap = (hill / 3.0).max(planet_radius_m);
    let outer_limit = icy_limit.max(rocky_limit).min(outer_cap);
    let inner_limit = planet_radius_m * 1.05;

    if outer_limit <= inner_limit {
        return RingSystem::default();
    }

    let band_count = 3 + (r.next_u32(71) % 4) as usize;
    let span = outer_limit - inner_limit;
    let mut bands = Vec::with_capacity(band_count);
    for i in 0..band_count {
        let inner = inner_limit + span * (i as f64 / band_count as f64);
        let outer = inner_limit + span * ((i + 1) as f64 / band_count as f64);
        let composition = if r.next_bool(72 + i as u32) { RingComposition::Icy } else { RingComposition::Rocky };
        bands.push(RingBand { inner_radius_m: inner, outer_radius_m: outer, composition });
    }
    RingSystem { bands }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn giant_rings_more_likely_than_terrestrial() {
        assert!(ring_probability(true) > ring_probability(false));
    }

    #[test]
    fn bands_are_bounded_by_hill_sphere_cap() {
        let r = Rehydrator::new(1);
        let system = generate_rings(true, 7.0e7, 1300.0, 7.8e11, 1.9e27, 1.989e30, &r);
        let hill = hill_sphere_radius_m(7.8e11, 1.9e27, 1.989e30);
        for band in &system.bands {
            assert!(band.outer_radius_m <= (hill / 3.0).max(7.0e7) + 1e-3);
        }
    }

    #[test]
    fn bands_are_contiguous_and_ordered() {
        let r = Rehydrator::new(2);
        let system = generate_rings(true, 6.0e7, 700.0, 5.0e11, 5.7e26, 1.989e30, &r);
        for w in system.bands.windows(2) {
            assert!((w[0].outer_radius_m - w[1].inner_radius_m).abs() < 1e-6);
        }
    }

    #[test]
    fn no_rings_when_roll_fails() {
        // A deterministic seed whose index-70 roll lands above any giant
        // probability will yield no bands; terrestrial odds are low enough
        // that most seeds produce an empty system.
        let mut saw_empty = false;
        for seed in 0..20u32 {
            let r = Rehydrator::new(seed);
            let system = generate_rings(false, 6.371e6, 5514.0, 1.496e11, 5.97e24, 1.989e30, &r);
            if system.bands.is_empty() {
                saw_empty = true;
            }
        }
        assert!(saw_empty);
    }
}
