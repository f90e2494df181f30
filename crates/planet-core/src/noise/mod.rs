//! Five independent noise channels driving elevation, the mountain mask,
//! and precipitation, plus the composition formulas that turn them into
//! surface fields.

pub mod fbm;

use fbm::{FractalKind, FractalNoise};

use crate::rehydrator::{index, Rehydrator};
use crate::sphere::Vec3;

/// Water's melting point, used as the precipitation humidity pivot and the
/// snow/rain split.
pub const WATER_MELTING_POINT_K: f64 = 273.15;

const ARCTIC_BAND_HALF_WIDTH: f64 = std::f64::consts::FRAC_PI_8 / 2.0;
const ARCTIC_BAND: f64 = std::f64::consts::FRAC_PI_2 - ARCTIC_BAND_HALF_WIDTH;
const HORSE_LATITUDE: f64 = std::f64::consts::PI / 5.0;
const ITCZ_BAND: f64 = std::f64::consts::FRAC_PI_8;

/// A sampled precipitation/snowfall pair (spec §9: tuple out-params become
/// structs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precipitation {
    pub precipitation_mm_hr: f64,
    pub snowfall_mm_hr: f64,
}

/// The five fractal/simplex channels, keyed off a planet's noise seeds.
pub struct NoiseField {
    n1: FractalNoise,
    n2: FractalNoise,
    n3: FractalNoise,
    n4: FractalNoise,
    n5: FractalNoise,
}

impl NoiseField {
    /// Draws the five independent noise seeds from the rehydrator at indices
    /// 0..4 (spec §4.1) and builds the field table of §4.2.
    pub fn from_rehydrator(r: &Rehydrator) -> Self {
        let seed1 = r.next_u32(index::NOISE_SEED_1);
        let seed2 = r.next_u32(index::NOISE_SEED_2);
        let seed3 = r.next_u32(index::NOISE_SEED_3);
        let seed4 = r.next_u32(index::NOISE_SEED_4);
        let seed5 = r.next_u32(index::NOISE_SEED_5);
        Self::new(seed1, seed2, seed3, seed4, seed5)
    }

    pub fn new(seed1: u32, seed2: u32, seed3: u32, seed4: u32, seed5: u32) -> Self {
        Self {
            n1: FractalNoise::new(seed1, FractalKind::Standard, 0.8, 6),
            n2: FractalNoise::new(seed2, FractalKind::Billow, 0.6, 6),
            n3: FractalNoise::single(seed3, 1.2),
            n4: FractalNoise::single(seed4, 1.0),
            n5: FractalNoise::new(seed5, FractalKind::Standard, 3.0, 3),
        }
    }

    /// Elevation composition (spec §4.2), unscaled: roughly `[-1, 1]`,
    /// interpreted relative to `MaxElevation`.
    pub fn elevation(&self, v: Vec3) -> f64 {
        let (x, y, z) = (v.x, v.y, v.z);
        let base = self.n1.sample(x, y, z);
        let n2 = self.n2.sample(x, y, z);
        let mtn = (-n2 - 0.25) * (4.0 / 3.0);
        let scaled = base * (0.25 + mtn * 0.0625) - 0.04;
        let mask = (self.n3.sample(x, y, z) + 1.0).clamp(0.0, 1.0);
        let mtn_masked = mtn * mask;
        let mtn_shaped = mtn_masked.signum() * mtn_masked.powi(2) * (0.525 + base * 0.13125);
        scaled + mtn_shaped
    }

    /// Precipitation composition (spec §4.2). `avg_precipitation` and
    /// `snow_to_rain_ratio` come from the planet's atmosphere.
    pub fn precipitation(
        &self,
        v: Vec3,
        latitude: f64,
        seasonal_latitude: f64,
        temperature_k: f64,
        avg_precipitation: f64,
        snow_to_rain_ratio: f64,
    ) -> Precipitation {
        let (x, y, z) = (v.x, v.y, v.z);
        let r1 = 1.25 + 0.75 * self.n4.sample(x, y, z);
        let r2 = 0.675 + 0.75 * self.n5.sample(x, y, z);
        let r = r1 * r2;

        let abs_lat = latitude.abs();
        let mut h = 0.0;
        if abs_lat > ARCTIC_BAND {
            h += -3.0 * ((abs_lat - ARCTIC_BAND) / ARCTIC_BAND_HALF_WIDTH);
        }
        if abs_lat < HORSE_LATITUDE {
            h += 2.0 * (r1 - 2.0) * ((HORSE_LATITUDE - abs_lat) / HORSE_LATITUDE);
        }
        let abs_seasonal = seasonal_latitude.abs();
        if abs_seasonal < ITCZ_BAND {
            let frac = (ITCZ_BAND - abs_seasonal) / ITCZ_BAND;
            h += 10.0 * r * frac.powi(3);
        }

        let humidity_gate = ((temperature_k - (WATER_MELTING_POINT_K - 48.0)) / 16.0).clamp(0.0, 1.0);
        let humidity = (r + h) * humidity_gate;
        let precipitation_mm_hr = avg_precipitation * humidity.max(0.0);
        let snowfall_mm_hr = if temperature_k <= WATER_MELTING_POINT_K {
            precipitation_mm_hr * snow_to_rain_ratio
        } else {
            0.0
        };
        Precipitation { precipitation_mm_hr, snowfall_mm_hr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::LatLon;

    #[test]
    fn elevation_respects_clamp_tolerance() {
        let field = NoiseField::new(1, 2, 3, 4, 5);
        for i in 0..5000 {
            let lat = (i as f64 * 0.0011).sin() * std::f64::consts::FRAC_PI_2;
            let lon = (i as f64 * 0.0029) % std::f64::consts::TAU - std::f64::consts::PI;
            let v = LatLon::new(lat, lon).to_unrotated_vector();
            assert!(field.elevation(v).abs() <= 1.1, "elevation out of tolerance at i={i}");
        }
    }

    #[test]
    fn same_seeds_are_deterministic() {
        let a = NoiseField::new(1, 2, 3, 4, 5);
        let b = NoiseField::new(1, 2, 3, 4, 5);
        let v = Vec3::new(0.3, 0.5, 0.8).normalize();
        assert_eq!(a.elevation(v), b.elevation(v));
    }

    #[test]
    fn snowfall_zero_above_melting_point() {
        let field = NoiseField::new(1, 2, 3, 4, 5);
        let v = Vec3::new(0.0, 0.0, 1.0);
        let p = field.precipitation(v, 0.0, 0.0, WATER_MELTING_POINT_K + 10.0, 100.0, 0.1);
        assert_eq!(p.snowfall_mm_hr, 0.0);
    }

    #[test]
    fn precipitation_never_negative() {
        let field = NoiseField::new(7, 8, 9, 10, 11);
        for i in 0..500 {
            let lat = (i as f64 * 0.004) - 1.0;
            let v = LatLon::new(lat.clamp(-1.5, 1.5), 0.2).to_unrotated_vector();
            let p = field.precipitation(v, lat, lat, 280.0, 50.0, 0.2);
            assert!(p.precipitation_mm_hr >= 0.0);
            assert!(p.snowfall_mm_hr >= 0.0);
        }
    }
}
