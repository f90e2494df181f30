//! Hydrosphere mass and sea-level derivation from a water ratio (spec §4.5
//! step 6), terrestrial planets only.

use std::collections::BTreeMap;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::material::{LayerKind, MaterialLayer, Shape};
use crate::rehydrator::Rehydrator;
use crate::substances::Substance;

/// Empirically calibrated map-elevation scaling factor (spec §4.5 step 6).
pub const RANDOM_MAP_ELEVATION_FACTOR: f64 = 0.33975;

/// Half-volume constant (m^3) for the hemispherical sea-level integral,
/// carried verbatim from the source system.
pub const HALF_VOLUME_CONSTANT: f64 = 85_183_747_862_278.266;

pub struct HydrosphereResult {
    pub normalized_sea_level: f64,
    pub sea_level_m: f64,
    pub layer: Option<MaterialLayer>,
}

/// Sentinel normalized sea level meaning "no hydrosphere" (spec §3).
pub const NO_HYDROSPHERE_SENTINEL: f64 = -1.1;

/// Derives sea level and the hydrosphere material layer from `water_ratio
/// ∈ [0, 1]` and the planet's `MaxElevation` (spec §4.5 step 6, §8
/// boundary behaviors).
pub fn derive_hydrosphere(
    water_ratio: f64,
    max_elevation_m: f64,
    radius_m: f64,
    r: &Rehydrator,
) -> HydrosphereResult {
    if water_ratio <= 0.0 {
        return HydrosphereResult {
            normalized_sea_level: NO_HYDROSPHERE_SENTINEL,
            sea_level_m: NO_HYDROSPHERE_SENTINEL * max_elevation_m,
            layer: None,
        };
    }
    if water_ratio >= 1.0 {
        return HydrosphereResult {
            normalized_sea_level: 1.0,
            sea_level_m: max_elevation_m,
            layer: Some(full_ocean_layer(radius_m, max_elevation_m, r)),
        };
    }

    let variance = ((water_ratio - 0.5).abs().exp() - 1.0) * RANDOM_MAP_ELEVATION_FACTOR;
    let sign = if water_ratio >= 0.5 { 1.0 } else { -1.0 };
    let normalized_sea_level = sign * variance;
    let sea_level_m = normalized_sea_level * max_elevation_m;

    let mass_kg = HALF_VOLUME_CONSTANT * variance * seawater_density(r);
    let shape = Shape::HollowSphere {
        inner_radius_m: (radius_m + sea_level_m).max(0.0),
        outer_radius_m: radius_m,
    };
    let layer = MaterialLayer::new(LayerKind::Hydrosphere, shape, mass_kg.abs(), seawater_constituents(r));

    HydrosphereResult { normalized_sea_level, sea_level_m, layer: Some(layer) }
}

fn full_ocean_layer(radius_m: f64, max_elevation_m: f64, r: &Rehydrator) -> MaterialLayer {
    let shape = Shape::HollowSphere { inner_radius_m: radius_m, outer_radius_m: radius_m + max_elevation_m };
    let mass_kg = shape.volume_m3() * seawater_density(r);
    MaterialLayer::new(LayerKind::Hydrosphere, shape, mass_kg, seawater_constituents(r))
}

fn seawater_density(_r: &Rehydrator) -> f64 {
    1027.0
}

/// Salt + fresh water split, normal-sampled at μ=0.945, σ=0.015 (spec §4.5
/// step 6).
fn seawater_constituents(r: &Rehydrator) -> BTreeMap<Substance, Decimal> {
    let sea_fraction = r.normal_sample(30, 0.945, 0.015, Some(0.0)).min(1.0);
    let mut map = BTreeMap::new();
    map.insert(Substance::SeaWater, Decimal::from_f64(sea_fraction).unwrap_or(Decimal::ZERO));
    map.insert(Substance::FreshWater, Decimal::ONE - map[&Substance::SeaWater]);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_water_ratio_is_sentinel() {
        let r = Rehydrator::new(1);
        let result = derive_hydrosphere(0.0, 20_000.0, 6_371_000.0, &r);
        assert_eq!(result.normalized_sea_level, NO_HYDROSPHERE_SENTINEL);
        assert!(result.layer.is_none());
    }

    #[test]
    fn full_water_ratio_reaches_max_elevation() {
        let r = Rehydrator::new(1);
        let result = derive_hydrosphere(1.0, 20_000.0, 6_371_000.0, &r);
        assert_eq!(result.normalized_sea_level, 1.0);
        assert_eq!(result.sea_level_m, 20_000.0);
        assert!(result.layer.is_some());
    }

    #[test]
    fn half_water_ratio_gives_small_variance() {
        let r = Rehydrator::new(1);
        let result = derive_hydrosphere(0.5, 20_000.0, 6_371_000.0, &r);
        assert!(result.normalized_sea_level.abs() < 1e-9);
    }

    #[test]
    fn sea_level_never_exceeds_max_elevation() {
        let r = Rehydrator::new(9);
        for ratio in [0.1, 0.3, 0.7, 0.9, 0.99] {
            let result = derive_hydrosphere(ratio, 20_000.0, 6_371_000.0, &r);
            assert!(result.sea_level_m <= 20_000.0 + 1e-6);
        }
    }

    #[test]
    fn seawater_split_sums_to_one() {
        let r = Rehydrator::new(4);
        let map = seawater_constituents(&r);
        let sum: Decimal = map.values().copied().sum();
        assert_eq!(sum, Decimal::ONE);
    }
}
