//! Per-(lat, lon) scalar field sampling (spec §4.6): elevation, seasonal
//! temperature, precipitation/snowfall, and atmospheric pressure/density,
//! plus 2D map generation over an equirectangular grid.

use crate::coords::LatLon;
use crate::noise::Precipitation;
use crate::orbit::solar_declination;
use crate::planet::Planet;
use crate::thermodynamics::{pressure_at_elevation, temperature_at_elevation};

/// Default vertical resolution for generated maps (spec §4.6).
pub const DEFAULT_MAP_HEIGHT: usize = 320;

#[derive(Debug, Clone)]
pub struct Grid2D {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Grid2D {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, values: vec![0.0; width * height] }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    fn set(&mut self, row: usize, col: usize, v: f64) {
        self.values[row * self.width + col] = v;
    }
}

pub struct SurfaceSampler<'a> {
    planet: &'a Planet,
    noise: crate::noise::NoiseField,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(planet: &'a Planet) -> Self {
        let [s1, s2, s3, s4, s5] = planet.noise_seeds;
        Self { planet, noise: crate::noise::NoiseField::new(s1, s2, s3, s4, s5) }
    }

    fn unrotated_vector(&self, lat: f64, lon: f64) -> crate::sphere::Vec3 {
        LatLon::new(lat, lon).to_unrotated_vector()
    }

    fn world_vector(&self, lat: f64, lon: f64) -> crate::sphere::Vec3 {
        self.planet.rotate_unrotated_to_world(self.unrotated_vector(lat, lon))
    }

    pub fn vector_to_lat_lon(&self, v: crate::sphere::Vec3) -> (f64, f64) {
        let lat = std::f64::consts::FRAC_PI_2 - crate::sphere::angle_between(self.planet.axis, v);
        let unrotated = self.planet.rotate_world_to_unrotated(v);
        let lon = unrotated.x.atan2(unrotated.z);
        (lat, lon)
    }

    /// Elevation relative to sea level, in meters.
    pub fn elevation(&self, lat: f64, lon: f64) -> f64 {
        let v = self.world_vector(lat, lon);
        let e = self.noise.elevation(v) * self.planet.max_elevation_m();
        e - self.planet.sea_level_m
    }

    fn seasonal_latitude(&self, lat: f64, true_anomaly: f64) -> f64 {
        let decl = solar_declination(self.planet.angle_of_rotation, self.planet.orbit.as_ref(), true_anomaly);
        (lat + decl).clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2)
    }

    /// Temperature at (lat, lon) for a given `proportion_of_year ∈ [0, 1]`
    /// (spec §4.6): interpolates between the winter- and summer-solstice
    /// analytic fields.
    pub fn temperature(&self, lat: f64, lon: f64, proportion_of_year: f64) -> f64 {
        let true_anomaly = match &self.planet.orbit {
            Some(o) => {
                let winter = o.winter_solstice_true_anomaly();
                winter + proportion_of_year * std::f64::consts::TAU
            }
            None => 0.0,
        };
        let seasonal_lat = self.seasonal_latitude(lat, true_anomaly);

        let polar = lat.abs() > std::f64::consts::FRAC_PI_2 - 0.01;
        let insolation = crate::thermodynamics::insolation_factor(
            self.planet.atmosphere.material.mass_kg,
            self.planet.atmosphere.scale_height,
            self.planet.mass_kg,
            polar,
        );
        let t_bb = self.planet.average_blackbody_temperature_k;
        let greenhouse = self.planet.thermal_cache.greenhouse_effect_k.unwrap_or(0.0);
        let t_eff = t_bb * insolation + greenhouse;

        let equatorial = self.planet.thermal_cache.average_surface_temperature_k.unwrap_or(t_eff);
        let weight = (2.5 * seasonal_lat.abs().sqrt()).sin() / 1.75;
        let weight = weight.clamp(-1.0, 1.0);
        t_eff * (1.0 - weight) + equatorial * weight
    }

    /// Precipitation/snowfall at (lat, lon, proportion_of_year) (spec §4.6):
    /// samples temperature first, then the precipitation noise formula.
    pub fn precipitation(&self, lat: f64, lon: f64, proportion_of_year: f64) -> Precipitation {
        let v = self.world_vector(lat, lon);
        let temperature = self.temperature(lat, lon, proportion_of_year);
        let true_anomaly = match &self.planet.orbit {
            Some(o) => o.winter_solstice_true_anomaly() + proportion_of_year * std::f64::consts::TAU,
            None => 0.0,
        };
        let seasonal_lat = self.seasonal_latitude(lat, true_anomaly);
        self.noise.precipitation(
            v,
            lat,
            seasonal_lat,
            temperature,
            self.planet.atmosphere.average_precipitation,
            self.planet.atmosphere.snow_to_rain_ratio,
        )
    }

    /// Atmospheric pressure (kPa) at `altitude_m` above the surface (or at
    /// the surface itself if `at_surface` is true).
    pub fn atmospheric_pressure(&self, lat: f64, lon: f64, proportion_of_year: f64, altitude_m: f64, at_surface: bool) -> f64 {
        let h = if at_surface { 0.0 } else { altitude_m };
        let temperature = self.temperature(lat, lon, proportion_of_year);
        pressure_at_elevation(self.planet.atmosphere.pressure_kpa, h, temperature, self.planet.surface_gravity)
    }

    /// Atmospheric density (kg/m^3) via the ideal gas law, Earth-air molar
    /// mass approximation.
    pub fn atmospheric_density(&self, lat: f64, lon: f64, proportion_of_year: f64, altitude_m: f64, at_surface: bool) -> f64 {
        let pressure_kpa = self.atmospheric_pressure(lat, lon, proportion_of_year, altitude_m, at_surface);
        let temperature = self.temperature(lat, lon, proportion_of_year);
        let pressure_pa = pressure_kpa * 1000.0;
        pressure_pa * crate::thermodynamics::EARTH_AIR_MOLAR_MASS
            / (crate::thermodynamics::GAS_CONSTANT * temperature.max(1.0))
    }

    /// Temperature-at-elevation convenience, reusing the planet's surface
    /// temperature and atmospheric column height.
    pub fn temperature_at_altitude(&self, lat: f64, lon: f64, proportion_of_year: f64, altitude_m: f64) -> f64 {
        let surface_t = self.temperature(lat, lon, proportion_of_year);
        temperature_at_elevation(
            surface_t,
            self.planet.average_blackbody_temperature_k,
            altitude_m,
            20_000.0,
            self.planet.max_elevation_m(),
            self.planet.surface_gravity,
            self.planet.atmosphere.water_ratio,
        )
    }

    /// Generates an elevation grid at the given resolution, sampling pixel
    /// centers under an equirectangular projection (spec §4.6).
    pub fn generate_elevation_map(&self, width: usize, height: usize) -> Grid2D {
        let mut grid = Grid2D::new(width, height);
        for row in 0..height {
            let lat = row_to_latitude(row, height);
            for col in 0..width {
                let lon = col_to_longitude(col, width);
                grid.set(row, col, self.elevation(lat, lon));
            }
        }
        grid
    }

    pub fn generate_temperature_map(&self, proportion_of_year: f64, width: usize, height: usize) -> Grid2D {
        let mut grid = Grid2D::new(width, height);
        for row in 0..height {
            let lat = row_to_latitude(row, height);
            for col in 0..width {
                let lon = col_to_longitude(col, width);
                grid.set(row, col, self.temperature(lat, lon, proportion_of_year));
            }
        }
        grid
    }

    /// Produces `frame_count` evenly spaced precipitation frames in `[0,
    /// 1]`; `sample_at` linearly interpolates between the two nearest
    /// frames (spec §4.6).
    pub fn generate_precipitation_frames(&self, frame_count: usize, width: usize, height: usize) -> Vec<Grid2D> {
        let frame_count = frame_count.max(2);
        (0..frame_count)
            .map(|i| {
                let proportion = i as f64 / (frame_count - 1) as f64;
                let mut grid = Grid2D::new(width, height);
                for row in 0..height {
                    let lat = row_to_latitude(row, height);
                    for col in 0..width {
                        let lon = col_to_longitude(col, width);
                        grid.set(row, col, self.precipitation(lat, lon, proportion).precipitation_mm_hr);
                    }
                }
                grid
            })
            .collect()
    }
}

fn row_to_latitude(row: usize, height: usize) -> f64 {
    let t = (row as f64 + 0.5) / height as f64;
    std::f64::consts::FRAC_PI_2 - t * std::f64::consts::PI
}

fn col_to_longitude(col: usize, width: usize) -> f64 {
    let t = (col as f64 + 0.5) / width as f64;
    t * std::f64::consts::TAU - std::f64::consts::PI
}

/// Linearly interpolates between the two frames nearest `proportion` in a
/// set of evenly spaced `[0, 1]` frames.
pub fn interpolate_frames(frames: &[Grid2D], proportion: f64) -> Grid2D {
    let n = frames.len();
    if n == 1 {
        return frames[0].clone();
    }
    let scaled = proportion.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = scaled - lo as f64;
    let mut out = frames[lo].clone();
    for (i, v) in out.values.iter_mut().enumerate() {
        *v = frames[lo].values[i] * (1.0 - frac) + frames[hi].values[i] * frac;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::params::PlanetParams;
    use crate::planet::PlanetType;

    fn sample_planet() -> crate::planet::Planet {
        let star = crate::collaborators::Star {
            luminosity_w: 3.828e26,
            mass_kg: 1.989e30,
            position: crate::sphere::Vec3::ZERO,
            temperature_k: 5778.0,
        };
        Generator::generate(1, PlanetType::Terrestrial, &PlanetParams::default(), None, &[star])
    }

    #[test]
    fn elevation_within_clamp_tolerance_of_max_elevation() {
        let planet = sample_planet();
        let sampler = SurfaceSampler::new(&planet);
        let max_elev = planet.max_elevation_m();
        for i in 0..200 {
            let lat = ((i as f64 * 0.031).sin()) * std::f64::consts::FRAC_PI_2;
            let lon = (i as f64 * 0.057) % std::f64::consts::TAU - std::f64::consts::PI;
            let e = sampler.elevation(lat, lon);
            assert!(e.abs() <= 1.1 * max_elev + planet.sea_level_m.abs() + 1.0);
        }
    }

    #[test]
    fn same_planet_produces_identical_elevation_maps() {
        let planet = sample_planet();
        let sampler = SurfaceSampler::new(&planet);
        let a = sampler.generate_elevation_map(320, 160);
        let b = sampler.generate_elevation_map(320, 160);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn same_seed_twice_gives_byte_identical_maps() {
        let star = crate::collaborators::Star {
            luminosity_w: 3.828e26,
            mass_kg: 1.989e30,
            position: crate::sphere::Vec3::ZERO,
            temperature_k: 5778.0,
        };
        let params = PlanetParams::default();
        let a = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[star]);
        let b = Generator::generate(1, PlanetType::Terrestrial, &params, None, &[star]);
        let sampler_a = SurfaceSampler::new(&a);
        let sampler_b = SurfaceSampler::new(&b);
        let map_a = sampler_a.generate_elevation_map(320, 160);
        let map_b = sampler_b.generate_elevation_map(320, 160);
        assert_eq!(map_a.values, map_b.values);
    }

    #[test]
    fn interpolate_frames_at_zero_matches_first_frame() {
        let planet = sample_planet();
        let sampler = SurfaceSampler::new(&planet);
        let frames = sampler.generate_precipitation_frames(4, 20, 10);
        let interpolated = interpolate_frames(&frames, 0.0);
        assert_eq!(interpolated.values, frames[0].values);
    }

    #[test]
    fn precipitation_is_never_negative() {
        let planet = sample_planet();
        let sampler = SurfaceSampler::new(&planet);
        for i in 0..100 {
            let lat = (i as f64 * 0.02) - 1.0;
            let p = sampler.precipitation(lat.clamp(-1.5, 1.5), 0.3, 0.25);
            assert!(p.precipitation_mm_hr >= 0.0);
            assert!(p.snowfall_mm_hr >= 0.0);
        }
    }
}
