//! The catalog of named materials a planet's layers, atmosphere, and
//! resource veins are built from.

use serde::{Deserialize, Serialize};

/// A named constituent substance. Melting points are in Kelvin at 1 atm;
/// vapor pressure constants are a simplified Antoine-equation fit
/// (`log10(P_kPa) = a - b / (T + c)`) used by the phase cascade for the
/// seven atmospheric gases spec §4.5 step 9 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Substance {
    // Cores / mantles / crusts
    IronNickel,
    IronSteelNickel,
    Peridotite,
    SiliconCarbide,
    Diamond,
    Graphite,
    Coal,
    Oil,
    Gas,
    Chondrite,
    MetallicHydrogen,
    WaterAmmonia,

    // Ices / volatiles
    WaterIce,
    DryIce,
    AmmoniaIce,
    MethaneIce,

    // Crustal minerals / resources
    Halite,
    Sulfur,
    Beryl,
    Emerald,
    Corundum,
    Ruby,
    Sapphire,
    GoldOre,
    SilverOre,
    CopperOre,

    // Hydrosphere
    FreshWater,
    SeaWater,

    // Atmospheric gases
    Methane,
    CarbonMonoxide,
    CarbonDioxide,
    Nitrogen,
    Oxygen,
    SulfurDioxide,
    WaterVapor,
    Argon,
    Krypton,
    Xenon,
    Neon,
    Hydrogen,
    Helium,
    Ammonia,
}

impl Substance {
    /// Melting point in Kelvin, where meaningful (`None` for substances that
    /// don't undergo a phase cascade, e.g. structural silicates).
    pub fn melting_point_k(self) -> Option<f64> {
        use Substance::*;
        match self {
            Methane => Some(90.7),
            CarbonMonoxide => Some(68.1),
            CarbonDioxide => Some(216.6),
            Nitrogen => Some(63.2),
            Oxygen => Some(54.4),
            SulfurDioxide => Some(197.6),
            WaterVapor | FreshWater | SeaWater | WaterIce => Some(273.15),
            Ammonia | AmmoniaIce => Some(195.4),
            MethaneIce => Some(90.7),
            DryIce => Some(216.6),
            Sulfur => Some(388.4),
            Halite => Some(1074.0),
            _ => None,
        }
    }

    /// Simplified Antoine-equation coefficients `(a, b, c)` for the seven
    /// gases the phase cascade iterates over. Returns `None` for substances
    /// outside that set.
    pub fn antoine_constants(self) -> Option<(f64, f64, f64)> {
        use Substance::*;
        match self {
            Methane => Some((6.610, 389.93, -5.0)),
            CarbonMonoxide => Some((6.368, 291.08, -5.0)),
            CarbonDioxide => Some((6.810, 1307.0, -3.5)),
            Nitrogen => Some((6.494, 255.68, -6.6)),
            Oxygen => Some((6.692, 319.01, -6.5)),
            SulfurDioxide => Some((7.282, 1782.1, -48.0)),
            WaterVapor => Some((8.070, 1750.3, 235.0)),
            _ => None,
        }
    }

    /// Simplified Antoine vapor pressure in kPa at temperature `t_k`.
    pub fn vapor_pressure_kpa(self, t_k: f64) -> Option<f64> {
        self.antoine_constants().map(|(a, b, c)| {
            let log10_p_mmhg = a - b / (t_k + c);
            let p_mmhg = 10f64.powf(log10_p_mmhg);
            p_mmhg * 0.133_322_4
        })
    }

    /// Whether this substance belongs to the ordered phase-cascade set
    /// `{CH4, CO, CO2, N2, O2, SO2, H2O}` (spec §4.5 step 9).
    pub fn is_cascade_gas(self) -> bool {
        self.antoine_constants().is_some()
    }

    /// Fixed evaluation order for the phase cascade.
    pub fn cascade_order() -> [Substance; 7] {
        use Substance::*;
        [Methane, CarbonMonoxide, CarbonDioxide, Nitrogen, Oxygen, SulfurDioxide, WaterVapor]
    }

    pub fn is_gemstone(self) -> bool {
        matches!(
            self,
            Substance::Beryl
                | Substance::Emerald
                | Substance::Corundum
                | Substance::Ruby
                | Substance::Sapphire
                | Substance::Diamond
        )
    }

    pub fn is_metal_ore(self) -> bool {
        matches!(self, Substance::GoldOre | Substance::SilverOre | Substance::CopperOre)
    }

    pub fn is_hydrocarbon(self) -> bool {
        matches!(self, Substance::Coal | Substance::Oil | Substance::Gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_order_matches_spec_sequence() {
        let order = Substance::cascade_order();
        assert_eq!(order[0], Substance::Methane);
        assert_eq!(order[6], Substance::WaterVapor);
        for s in order {
            assert!(s.is_cascade_gas());
        }
    }

    #[test]
    fn vapor_pressure_increases_with_temperature() {
        let low = Substance::WaterVapor.vapor_pressure_kpa(250.0).unwrap();
        let high = Substance::WaterVapor.vapor_pressure_kpa(320.0).unwrap();
        assert!(high > low);
    }

    #[test]
    fn non_cascade_substance_has_no_vapor_pressure() {
        assert!(Substance::Diamond.vapor_pressure_kpa(300.0).is_none());
    }

    #[test]
    fn resource_classification_is_disjoint() {
        assert!(Substance::Ruby.is_gemstone());
        assert!(!Substance::Ruby.is_metal_ore());
        assert!(Substance::Oil.is_hydrocarbon());
        assert!(!Substance::Oil.is_gemstone());
    }
}
