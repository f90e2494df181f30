//! Atmosphere composition, Earth-calibrated defaults, and the phase
//! cascade that moves mass between atmosphere and hydrosphere as
//! temperature and pressure evolve (spec §4.5 steps 7 and 9).

use std::collections::BTreeMap;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::material::{constituents_from_fractions, LayerKind, MaterialLayer, Shape};
use crate::rehydrator::Rehydrator;
use crate::substances::Substance;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atmosphere {
    pub material: MaterialLayer,
    pub pressure_kpa: f64,
    pub greenhouse_factor: f64,
    pub scale_height: f64,
    pub max_precipitation: f64,
    pub max_snowfall: f64,
    pub water_ratio: f64,
    pub average_precipitation: f64,
    pub snow_to_rain_ratio: f64,
}

impl Atmosphere {
    fn d(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
    }

    /// Earth-composition atmosphere with 12 named constituents at fixed
    /// fractions, scaled to `pressure_kpa` / `mass_kg`.
    pub fn earth_like(radius_m: f64, pressure_kpa: f64, mass_kg: f64) -> Self {
        let constituents = constituents_from_fractions(vec![
            (Substance::Nitrogen, Self::d(0.780_840)),
            (Substance::Oxygen, Self::d(0.209_460)),
            (Substance::Argon, Self::d(0.009_340)),
            (Substance::CarbonDioxide, Self::d(0.000_420)),
            (Substance::Neon, Self::d(0.000_018_2)),
            (Substance::Helium, Self::d(0.000_005_24)),
            (Substance::Methane, Self::d(0.000_001_9)),
            (Substance::Krypton, Self::d(0.000_001_14)),
            (Substance::Hydrogen, Self::d(0.000_000_5)),
            (Substance::Xenon, Self::d(0.000_000_087)),
            (Substance::SulfurDioxide, Self::d(0.000_000_01)),
            (Substance::WaterVapor, Decimal::ZERO), // remainder
        ]);
        let shape = Shape::HollowSphere { inner_radius_m: radius_m, outer_radius_m: radius_m + 100_000.0 };
        Self {
            material: MaterialLayer::new(LayerKind::Atmosphere, shape, mass_kg, constituents),
            pressure_kpa,
            greenhouse_factor: 1.15,
            scale_height: 0.0013,
            max_precipitation: 2000.0,
            max_snowfall: 1000.0,
            water_ratio: 0.01,
            average_precipitation: 1100.0,
            snow_to_rain_ratio: 0.1,
        }
    }

    /// Type-specific tables for dwarfs/small bodies/giants (spec §4.5 step
    /// 7), with draws at indices 47..53 reserved for per-type trace gases.
    pub fn thin_volatile(radius_m: f64, mass_kg: f64, r: &Rehydrator) -> Self {
        let co2 = r.next_double(47, 0.5, 0.95);
        let n2 = r.next_double(48, 0.02, 0.3);
        let ar = r.next_double(49, 0.0, 0.02);
        let constituents = constituents_from_fractions(vec![
            (Substance::CarbonDioxide, Self::d(co2)),
            (Substance::Nitrogen, Self::d(n2)),
            (Substance::Argon, Self::d(ar)),
            (Substance::WaterVapor, Decimal::ZERO),
        ]);
        let shape = Shape::HollowSphere { inner_radius_m: radius_m, outer_radius_m: radius_m + 10_000.0 };
        Self {
            material: MaterialLayer::new(LayerKind::Atmosphere, shape, mass_kg, constituents),
            pressure_kpa: r.next_double(50, 0.1, 5.0),
            greenhouse_factor: 1.0,
            scale_height: 0.002,
            max_precipitation: 0.0,
            max_snowfall: 0.0,
            water_ratio: 0.0,
            average_precipitation: 0.0,
            snow_to_rain_ratio: 0.0,
        }
    }

    pub fn gas_giant(radius_m: f64, mass_kg: f64, r: &Rehydrator) -> Self {
        let h2 = r.next_double(51, 0.85, 0.92);
        let he = 1.0 - h2;
        let constituents = constituents_from_fractions(vec![
            (Substance::Hydrogen, Self::d(h2)),
            (Substance::Helium, Self::d(he)),
            (Substance::Methane, Decimal::ZERO),
        ]);
        let shape = Shape::HollowSphere { inner_radius_m: radius_m * 0.9, outer_radius_m: radius_m };
        Self {
            material: MaterialLayer::new(LayerKind::Atmosphere, shape, mass_kg, constituents),
            pressure_kpa: r.next_double(52, 500.0, 2000.0),
            greenhouse_factor: 1.4,
            scale_height: 0.05,
            max_precipitation: 0.0,
            max_snowfall: 0.0,
            water_ratio: 0.0,
            average_precipitation: 0.0,
            snow_to_rain_ratio: 0.0,
        }
    }

    /// `|Σ water vapor partial pressure| ≥ 1% of saturation` test used by
    /// the carbon-silicate sink.
    pub fn water_vapor_partial_pressure_kpa(&self) -> f64 {
        let fraction = self.material.proportion_of(Substance::WaterVapor).to_f64().unwrap_or(0.0);
        fraction * self.pressure_kpa
    }

    pub fn co2_proportion(&self) -> Decimal {
        self.material.proportion_of(Substance::CarbonDioxide)
    }

    pub fn has_liquid_water(&self, hydrosphere_mass_kg: f64) -> bool {
        hydrosphere_mass_kg > 0.0 && self.water_ratio > 0.0
    }
}

/// Per-gas condensation/evaporation outcome for one cascade step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseOutcome {
    Condensed { moved_to_hydrosphere: bool },
    Evaporated,
    Unchanged,
}

/// The phase cascade (spec §4.5 step 9): walks the seven gases in fixed
/// order, condensing mass out of the atmosphere when the surface is colder
/// than the gas's saturation point and wetter than its vapor pressure,
/// evaporating it back in otherwise. Condensed water above its melting
/// point is transferred into `hydrosphere`'s mass; condensed water below
/// melting, and every other condensing gas (no generic ice/frost reservoir
/// is modeled for non-water substances), simply leaves the atmosphere.
/// Evaporation draws water mass back out of the hydrosphere, capped by
/// what it has. `atmosphere.material.mass_kg` and `atmosphere.pressure_kpa`
/// are both updated to reflect the net mass change, and every remaining
/// constituent's proportion is renormalized against the new total mass.
pub fn calculate_phases(
    atmosphere: &mut Atmosphere,
    hydrosphere: Option<&mut MaterialLayer>,
    surface_temperature_k: f64,
    ice_area_fraction: f64,
    cloud_cover_fraction: f64,
    prior_albedo: f64,
) -> (Vec<(Substance, PhaseOutcome)>, f64) {
    let mut outcomes = Vec::with_capacity(7);
    let original_mass_kg = atmosphere.material.mass_kg;
    let mut masses: BTreeMap<Substance, f64> = atmosphere
        .material
        .constituents
        .iter()
        .map(|(s, p)| (*s, p.to_f64().unwrap_or(0.0) * original_mass_kg))
        .collect();
    let mut hydrosphere = hydrosphere;

    for substance in Substance::cascade_order() {
        let vapor_pressure = substance.vapor_pressure_kpa(surface_temperature_k);
        let current_mass = masses.get(&substance).copied().unwrap_or(0.0);
        let partial_pressure = if original_mass_kg > 0.0 {
            (current_mass / original_mass_kg) * atmosphere.pressure_kpa
        } else {
            0.0
        };

        let outcome = match vapor_pressure {
            Some(p_vap) if atmosphere.pressure_kpa > 0.0 && partial_pressure > p_vap => {
                let equilibrium_mass = (p_vap / atmosphere.pressure_kpa) * original_mass_kg;
                let condensed_mass = (current_mass - equilibrium_mass).max(0.0);
                let below_melting =
                    substance.melting_point_k().map(|mp| surface_temperature_k < mp).unwrap_or(false);
                let moved_to_hydrosphere = !below_melting && substance == Substance::WaterVapor && hydrosphere.is_some();

                if let Some(mass) = masses.get_mut(&substance) {
                    *mass -= condensed_mass;
                }
                if moved_to_hydrosphere {
                    if let Some(h) = hydrosphere.as_deref_mut() {
                        h.mass_kg += condensed_mass;
                    }
                }

                PhaseOutcome::Condensed { moved_to_hydrosphere }
            }
            Some(p_vap) => {
                let denom = atmosphere.pressure_kpa.max(1e-9);
                let equilibrium_mass = (p_vap / denom) * original_mass_kg;
                let deficit = (equilibrium_mass - current_mass).max(0.0);
                if deficit > 0.0 && substance == Substance::WaterVapor {
                    if let Some(h) = hydrosphere.as_deref_mut() {
                        let evaporated = deficit.min(h.mass_kg);
                        h.mass_kg -= evaporated;
                        if let Some(mass) = masses.get_mut(&substance) {
                            *mass += evaporated;
                        }
                    }
                }
                PhaseOutcome::Evaporated
            }
            None => PhaseOutcome::Unchanged,
        };
        outcomes.push((substance, outcome));
    }

    let new_total_mass: f64 = masses.values().sum();
    if new_total_mass > 0.0 && original_mass_kg > 0.0 {
        let keys: Vec<Substance> = atmosphere.material.constituents.keys().copied().collect();
        if let Some((last, rest)) = keys.split_last() {
            let mut assigned = Decimal::ZERO;
            for substance in rest {
                let mass = masses.get(substance).copied().unwrap_or(0.0);
                let proportion = Decimal::from_f64(mass / new_total_mass).unwrap_or(Decimal::ZERO);
                atmosphere.material.constituents.insert(*substance, proportion);
                assigned += proportion;
            }
            atmosphere.material.constituents.insert(*last, (Decimal::ONE - assigned).max(Decimal::ZERO));
        }
        atmosphere.pressure_kpa *= new_total_mass / original_mass_kg;
        atmosphere.material.mass_kg = new_total_mass;
    }

    let max_ice_or_cloud = ice_area_fraction.max(cloud_cover_fraction).clamp(0.0, 1.0);
    let surface_albedo = if max_ice_or_cloud >= 1.0 {
        0.0
    } else {
        ((prior_albedo - 0.9 * max_ice_or_cloud) / (1.0 - max_ice_or_cloud)).clamp(0.0, 1.0)
    };

    (outcomes, surface_albedo)
}

/// Carbon-silicate sink (spec §4.5 step 10): once the surface is wet enough
/// and CO2 isn't already trace, crush it down to a drawn trace value and
/// backfill with N2 plus small noble-gas draws. Returns whether it fired
/// (callers must invalidate greenhouse + cached temperatures when it does).
pub fn carbon_silicate_sink(atmosphere: &mut Atmosphere, r: &Rehydrator) -> bool {
    let water_vapor_saturated_enough = {
        let p_vap = Substance::WaterVapor.vapor_pressure_kpa(288.0).unwrap_or(1.0);
        atmosphere.water_vapor_partial_pressure_kpa() >= 0.01 * p_vap
    };
    let co2 = atmosphere.co2_proportion();
    if !water_vapor_saturated_enough || co2 < Decimal::new(1, 3) {
        return false;
    }

    let trace = r.next_double(60, 15e-6, 1e-3);
    let ar = r.next_double(61, 0.0, 0.001);
    let kr = r.next_double(62, 0.0, 0.0001);
    let xe = r.next_double(63, 0.0, 0.00001);
    let ne = r.next_double(64, 0.0, 0.0001);

    let trace_d = Atmosphere::d(trace);
    let freed = co2 - trace_d;
    let drawn_total = Atmosphere::d(ar + kr + xe + ne);
    let n2_gain = (freed - drawn_total).max(Decimal::ZERO);

    let c = &mut atmosphere.material.constituents;
    c.insert(Substance::CarbonDioxide, trace_d);
    *c.entry(Substance::Nitrogen).or_insert(Decimal::ZERO) += n2_gain;
    *c.entry(Substance::Argon).or_insert(Decimal::ZERO) += Atmosphere::d(ar);
    *c.entry(Substance::Krypton).or_insert(Decimal::ZERO) += Atmosphere::d(kr);
    *c.entry(Substance::Xenon).or_insert(Decimal::ZERO) += Atmosphere::d(xe);
    *c.entry(Substance::Neon).or_insert(Decimal::ZERO) += Atmosphere::d(ne);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_like_sums_to_one() {
        let atm = Atmosphere::earth_like(6_371_000.0, 101.325, 5.1e18);
        let sum: Decimal = atm.material.constituents.values().copied().sum();
        assert!((sum - Decimal::ONE).abs() < Decimal::new(1, 9));
    }

    #[test]
    fn hot_planet_evaporates_water() {
        let mut atm = Atmosphere::earth_like(6_371_000.0, 101.325, 5.1e18);
        let (outcomes, _) = calculate_phases(&mut atm, None, 400.0, 0.0, 0.0, 0.3);
        let water = outcomes.iter().find(|(s, _)| *s == Substance::WaterVapor).unwrap();
        assert_eq!(water.1, PhaseOutcome::Evaporated);
    }

    #[test]
    fn surface_albedo_clamped_to_unit_interval() {
        let mut atm = Atmosphere::earth_like(6_371_000.0, 101.325, 5.1e18);
        let (_, albedo) = calculate_phases(&mut atm, None, 250.0, 1.0, 1.0, 0.3);
        assert!((0.0..=1.0).contains(&albedo));
    }

    #[test]
    fn condensing_water_above_melting_point_moves_mass_to_hydrosphere() {
        let shape = Shape::HollowSphere { inner_radius_m: 6_371_000.0, outer_radius_m: 6_471_000.0 };
        let constituents = constituents_from_fractions(vec![
            (Substance::WaterVapor, Decimal::new(9, 1)),
            (Substance::Nitrogen, Decimal::ZERO),
        ]);
        let mut atm = Atmosphere {
            material: MaterialLayer::new(LayerKind::Atmosphere, shape, 5.1e18, constituents),
            pressure_kpa: 10_000.0,
            greenhouse_factor: 1.0,
            scale_height: 0.01,
            max_precipitation: 0.0,
            max_snowfall: 0.0,
            water_ratio: 0.05,
            average_precipitation: 0.0,
            snow_to_rain_ratio: 0.0,
        };
        let mut hydrosphere = MaterialLayer::new(
            LayerKind::Hydrosphere,
            Shape::Sphere { radius_m: 1.0 },
            1.0e15,
            BTreeMap::new(),
        );
        let hydrosphere_mass_before = hydrosphere.mass_kg;
        let atmosphere_mass_before = atm.material.mass_kg;
        let pressure_before = atm.pressure_kpa;
        let (outcomes, _) = calculate_phases(&mut atm, Some(&mut hydrosphere), 280.0, 0.0, 0.0, 0.3);
        let water = outcomes.iter().find(|(s, _)| *s == Substance::WaterVapor).unwrap();
        assert_eq!(water.1, PhaseOutcome::Condensed { moved_to_hydrosphere: true });
        assert!(hydrosphere.mass_kg > hydrosphere_mass_before);
        assert!(atm.material.mass_kg < atmosphere_mass_before);
        assert!(atm.pressure_kpa < pressure_before);
    }

    #[test]
    fn carbon_silicate_sink_crushes_co2() {
        let mut atm = Atmosphere::earth_like(6_371_000.0, 101.325, 5.1e18);
        atm.material.constituents.insert(Substance::CarbonDioxide, Decimal::new(5, 2));
        atm.material.constituents.insert(Substance::WaterVapor, Decimal::new(3, 2));
        atm.pressure_kpa = 101.325;
        let r = Rehydrator::new(3);
        let fired = carbon_silicate_sink(&mut atm, &r);
        assert!(fired);
        assert!(atm.co2_proportion() < Decimal::new(1, 3));
    }
}
