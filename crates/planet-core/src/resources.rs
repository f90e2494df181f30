//! Resource vein/deposit enumeration (spec §4.5 step 13): every surface
//! constituent that reads as gemstone/metal-ore becomes a vein deposit,
//! hydrocarbons become non-vein deposits, and a handful of always-checked
//! extras (halite, sulfur, gemstones, diamond) get their own normal-sampled
//! abundance and a deterministic per-resource noise seed for spatial
//! sampling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::material::Composite;
use crate::rehydrator::Rehydrator;
use crate::substances::Substance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    pub substance: Substance,
    pub proportion: Decimal,
    pub is_vein: bool,
    pub noise_seed: u32,
}

/// Fixed rehydrator index base for per-resource noise seeds; each resource
/// claims one index past this, in the order it's discovered, so seeds stay
/// a pure function of the resource's position in `crust` iteration order.
const RESOURCE_NOISE_SEED_BASE: u32 = 80;

/// Walks the crust layer's constituents and the extra always-checked
/// substances, producing the resource list (spec §4.5 step 13).
pub fn enumerate_resources(crust: &Composite, has_magnetosphere: bool, r: &Rehydrator) -> Vec<ResourceDeposit> {
    let mut deposits = Vec::new();
    let mut next_index = RESOURCE_NOISE_SEED_BASE;

    if let Some(layer) = crust.layers.first() {
        for (&substance, &proportion) in &layer.constituents {
            if proportion <= Decimal::ZERO {
                continue;
            }
            if substance.is_gemstone() || substance.is_metal_ore() {
                deposits.push(ResourceDeposit {
                    substance,
                    proportion,
                    is_vein: true,
                    noise_seed: r.next_u32(next_index),
                });
                next_index += 1;
            } else if substance.is_hydrocarbon() {
                deposits.push(ResourceDeposit {
                    substance,
                    proportion,
                    is_vein: false,
                    noise_seed: r.next_u32(next_index),
                });
                next_index += 1;
            }
        }
    }

    push_extra(&mut deposits, &mut next_index, Substance::Halite, r, 0.01, 0.005);
    if has_magnetosphere {
        push_extra(&mut deposits, &mut next_index, Substance::Sulfur, r, 0.005, 0.002);
    }
    for gem in [
        Substance::Beryl,
        Substance::Emerald,
        Substance::Corundum,
        Substance::Ruby,
        Substance::Sapphire,
        Substance::Diamond,
    ] {
        push_extra(&mut deposits, &mut next_index, gem, r, 0.001, 0.0005);
    }

    deposits
}

fn push_extra(
    deposits: &mut Vec<ResourceDeposit>,
    next_index: &mut u32,
    substance: Substance,
    r: &Rehydrator,
    mu: f64,
    sigma: f64,
) {
    let abundance = r.positive_normal(*next_index, mu, sigma);
    if abundance > 0.0 {
        deposits.push(ResourceDeposit {
            substance,
            proportion: Decimal::try_from(abundance).unwrap_or(Decimal::ZERO),
            is_vein: substance.is_gemstone() || substance.is_metal_ore(),
            noise_seed: r.next_u32(*next_index + 1),
        });
    }
    *next_index += 2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{carbon_crust_constituents, LayerKind, MaterialLayer, Shape};

    #[test]
    fn carbon_crust_yields_hydrocarbon_and_gem_deposits() {
        let r = Rehydrator::new(7);
        let shape = Shape::HollowSphere { inner_radius_m: 6e6, outer_radius_m: 6.37e6 };
        let layer = MaterialLayer::new(LayerKind::Crust, shape, 1e22, carbon_crust_constituents(&r));
        let crust = Composite { layers: vec![layer] };
        let deposits = enumerate_resources(&crust, true, &r);
        assert!(deposits.iter().any(|d| d.substance.is_hydrocarbon()));
        assert!(deposits.iter().any(|d| d.substance == Substance::Diamond || d.is_vein));
    }

    #[test]
    fn deposit_noise_seeds_are_deterministic() {
        let r = Rehydrator::new(3);
        let shape = Shape::HollowSphere { inner_radius_m: 6e6, outer_radius_m: 6.37e6 };
        let layer = MaterialLayer::new(LayerKind::Crust, shape, 1e22, carbon_crust_constituents(&r));
        let crust = Composite { layers: vec![layer] };
        let a = enumerate_resources(&crust, false, &r);
        let b = enumerate_resources(&crust, false, &r);
        assert_eq!(a, b);
    }
}
