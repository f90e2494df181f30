//! Layered material composition: core/mantle/crust/hydrosphere/atmosphere,
//! each with mass, density, shape, optional temperature, and constituent
//! proportions that must sum to exactly one (spec §3, §9).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rehydrator::Rehydrator;
use crate::substances::Substance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere { radius_m: f64 },
    HollowSphere { inner_radius_m: f64, outer_radius_m: f64 },
}

impl Shape {
    pub fn volume_m3(self) -> f64 {
        match self {
            Shape::Sphere { radius_m } => (4.0 / 3.0) * std::f64::consts::PI * radius_m.powi(3),
            Shape::HollowSphere { inner_radius_m, outer_radius_m } => {
                (4.0 / 3.0) * std::f64::consts::PI * (outer_radius_m.powi(3) - inner_radius_m.powi(3))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Core,
    Mantle,
    Crust,
    Hydrosphere,
    Atmosphere,
}

/// One material layer. `constituents` proportions are kept as `Decimal` so
/// their sum is exactly one rather than drifting under binary-float error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialLayer {
    pub kind: LayerKind,
    pub density_kg_m3: f64,
    pub mass_kg: f64,
    pub shape: Shape,
    pub temperature_k: Option<f64>,
    pub constituents: BTreeMap<Substance, Decimal>,
}

impl MaterialLayer {
    pub fn new(kind: LayerKind, shape: Shape, mass_kg: f64, constituents: BTreeMap<Substance, Decimal>) -> Self {
        let density_kg_m3 = mass_kg / shape.volume_m3().max(1e-12);
        Self { kind, density_kg_m3, mass_kg, shape, temperature_k: None, constituents }
    }

    /// `|Σ proportion − 1| < 1e-9` (spec §8).
    pub fn proportions_sum_to_one(&self) -> bool {
        let sum: Decimal = self.constituents.values().copied().sum();
        (sum - Decimal::ONE).abs() < Decimal::new(1, 9)
    }

    pub fn proportion_of(&self, substance: Substance) -> Decimal {
        self.constituents.get(&substance).copied().unwrap_or(Decimal::ZERO)
    }
}

/// A layered body: the planet's core/mantle/crust stack, or a hydrosphere
/// modeled as one or two layers (surface + subsurface ocean).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composite {
    pub layers: Vec<MaterialLayer>,
}

impl Composite {
    pub fn total_mass_kg(&self) -> f64 {
        self.layers.iter().map(|l| l.mass_kg).sum()
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&MaterialLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Builds a constituent map from `(substance, proportion)` pairs, assigning
/// the final entry the exact remainder so the map sums to `Decimal::ONE`
/// regardless of upstream rounding in the earlier draws.
pub fn constituents_from_fractions(mut fractions: Vec<(Substance, Decimal)>) -> BTreeMap<Substance, Decimal> {
    if fractions.is_empty() {
        return BTreeMap::new();
    }
    let last_idx = fractions.len() - 1;
    let sum_without_last: Decimal = fractions[..last_idx].iter().map(|(_, p)| *p).sum();
    fractions[last_idx].1 = (Decimal::ONE - sum_without_last).max(Decimal::ZERO);
    fractions.into_iter().collect()
}

/// Trace-mineral draws for a terrestrial crust: normally-distributed
/// fractions at fixed rehydrator indices so the same seed always yields the
/// same minerals (spec §4.5 step 2).
pub fn terrestrial_crust_constituents(r: &Rehydrator) -> BTreeMap<Substance, Decimal> {
    let halite = r.positive_normal(20, 0.02, 0.01).min(0.05);
    let sulfur = r.positive_normal(21, 0.01, 0.005).min(0.03);
    let beryl = r.positive_normal(22, 0.002, 0.001).min(0.01);
    let gold = r.positive_normal(23, 0.0005, 0.0003).min(0.002);
    let silver = r.positive_normal(24, 0.001, 0.0005).min(0.004);
    let copper = r.positive_normal(25, 0.004, 0.002).min(0.01);
    let to_decimal = |v: f64| Decimal::from_f64_retain(v).unwrap_or(Decimal::ZERO);
    constituents_from_fractions(vec![
        (Substance::Halite, to_decimal(halite)),
        (Substance::Sulfur, to_decimal(sulfur)),
        (Substance::Beryl, to_decimal(beryl)),
        (Substance::GoldOre, to_decimal(gold)),
        (Substance::SilverOre, to_decimal(silver)),
        (Substance::CopperOre, to_decimal(copper)),
        (Substance::Peridotite, Decimal::ZERO), // remainder assigned below
    ])
}

/// Carbon-world crust: graphite + coal + oil + gas + diamond, with diamond
/// drawn and the hydrocarbons splitting the remainder (spec scenario 4).
pub fn carbon_crust_constituents(r: &Rehydrator) -> BTreeMap<Substance, Decimal> {
    let diamond = r.positive_normal(26, 0.05, 0.02).min(0.2);
    let graphite = r.positive_normal(27, 0.15, 0.05).min(0.4);
    let coal = r.positive_normal(28, 0.1, 0.04).min(0.3);
    let oil = r.positive_normal(29, 0.1, 0.04).min(0.3);
    let to_decimal = |v: f64| Decimal::from_f64_retain(v).unwrap_or(Decimal::ZERO);
    constituents_from_fractions(vec![
        (Substance::Diamond, to_decimal(diamond)),
        (Substance::Graphite, to_decimal(graphite)),
        (Substance::Coal, to_decimal(coal)),
        (Substance::Oil, to_decimal(oil)),
        (Substance::Gas, Decimal::ZERO), // remainder
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constituents_from_fractions_sums_to_one() {
        let to_decimal = |v: f64| Decimal::from_f64_retain(v).unwrap();
        let map = constituents_from_fractions(vec![
            (Substance::Halite, to_decimal(0.1)),
            (Substance::Sulfur, to_decimal(0.2)),
            (Substance::Peridotite, Decimal::ZERO),
        ]);
        let sum: Decimal = map.values().copied().sum();
        assert_eq!(sum, Decimal::ONE);
    }

    #[test]
    fn terrestrial_crust_sums_to_one() {
        let r = Rehydrator::new(42);
        let map = terrestrial_crust_constituents(&r);
        let sum: Decimal = map.values().copied().sum();
        assert!((sum - Decimal::ONE).abs() < Decimal::new(1, 9));
    }

    #[test]
    fn carbon_crust_has_positive_diamond_and_sums_to_one() {
        let r = Rehydrator::new(7);
        let map = carbon_crust_constituents(&r);
        let sum: Decimal = map.values().copied().sum();
        assert!((sum - Decimal::ONE).abs() < Decimal::new(1, 9));
        assert!(map.get(&Substance::Diamond).copied().unwrap_or_default() > Decimal::ZERO);
        let hydrocarbons = map.get(&Substance::Coal).copied().unwrap_or_default()
            + map.get(&Substance::Oil).copied().unwrap_or_default()
            + map.get(&Substance::Gas).copied().unwrap_or_default();
        assert!(hydrocarbons > Decimal::ZERO);
    }

    #[test]
    fn layer_mass_and_density_are_consistent() {
        let shape = Shape::Sphere { radius_m: 1_000.0 };
        let layer = MaterialLayer::new(LayerKind::Core, shape, 1.0e18, BTreeMap::new());
        assert!((layer.density_kg_m3 * shape.volume_m3() - layer.mass_kg).abs() / layer.mass_kg < 1e-9);
    }
}
