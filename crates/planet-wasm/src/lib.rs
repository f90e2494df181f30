//! WASM bindings for the planet-core generation pipeline.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use planet_core::collaborators::Star;
use planet_core::params::PlanetParams;
use planet_core::planet::PlanetType;
use planet_core::surface_sampler::SurfaceSampler;
use planet_core::Generator;

#[wasm_bindgen(start)]
pub fn init() {
    // Panic hook wired by the embedding page via console_error_panic_hook.
}

#[derive(Deserialize)]
struct GenerateRequest {
    seed: u32,
    planet_type: String,
    params: Option<PlanetParams>,
    stars: Vec<StarJs>,
}

#[derive(Deserialize, Serialize, Clone, Copy)]
struct StarJs {
    luminosity_w: f64,
    mass_kg: f64,
    temperature_k: f64,
    position: [f64; 3],
}

#[derive(Serialize)]
struct PlanetResultJs {
    seed: u32,
    mass_kg: f64,
    radius_m: f64,
    surface_gravity: f64,
    sea_level_m: f64,
    normalized_sea_level: f64,
    has_biosphere: bool,
    average_surface_temperature_k: Option<f64>,
}

fn parse_planet_type(name: &str) -> PlanetType {
    match name {
        "carbon" => PlanetType::Carbon,
        "gas-giant" => PlanetType::GasGiant,
        "ice-giant" => PlanetType::IceGiant,
        "dwarf" => PlanetType::Dwarf,
        "asteroid" => PlanetType::Asteroid,
        "comet" => PlanetType::Comet,
        _ => PlanetType::Terrestrial,
    }
}

#[wasm_bindgen]
pub fn generate(request_js: JsValue) -> Result<JsValue, JsValue> {
    let request: GenerateRequest = serde_wasm_bindgen::from_value(request_js)
        .map_err(|e| JsValue::from_str(&format!("invalid request: {e}")))?;

    let params = request.params.unwrap_or_default();
    let planet_type = parse_planet_type(&request.planet_type);
    let stars: Vec<Star> = request
        .stars
        .iter()
        .map(|s| Star {
            luminosity_w: s.luminosity_w,
            mass_kg: s.mass_kg,
            position: planet_core::sphere::Vec3::from_array(s.position),
            temperature_k: s.temperature_k,
        })
        .collect();

    let planet = Generator::generate(request.seed, planet_type, &params, None, &stars);

    let result = PlanetResultJs {
        seed: planet.seed,
        mass_kg: planet.mass_kg,
        radius_m: planet.radius_m,
        surface_gravity: planet.surface_gravity,
        sea_level_m: planet.sea_level_m,
        normalized_sea_level: planet.normalized_sea_level,
        has_biosphere: planet.has_biosphere,
        average_surface_temperature_k: planet.thermal_cache.average_surface_temperature_k,
    };

    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&format!("serialization error: {e}")))
}

#[derive(Deserialize)]
struct ElevationMapRequest {
    seed: u32,
    planet_type: String,
    params: Option<PlanetParams>,
    stars: Vec<StarJs>,
    width: usize,
    height: usize,
}

#[wasm_bindgen]
pub fn generate_elevation_map(request_js: JsValue) -> Result<JsValue, JsValue> {
    let request: ElevationMapRequest = serde_wasm_bindgen::from_value(request_js)
        .map_err(|e| JsValue::from_str(&format!("invalid request: {e}")))?;

    let params = request.params.unwrap_or_default();
    let planet_type = parse_planet_type(&request.planet_type);
    let stars: Vec<Star> = request
        .stars
        .iter()
        .map(|s| Star {
            luminosity_w: s.luminosity_w,
            mass_kg: s.mass_kg,
            position: planet_core::sphere::Vec3::from_array(s.position),
            temperature_k: s.temperature_k,
        })
        .collect();

    let planet = Generator::generate(request.seed, planet_type, &params, None, &stars);
    let sampler = SurfaceSampler::new(&planet);
    let grid = sampler.generate_elevation_map(request.width, request.height);

    serde_wasm_bindgen::to_value(&grid.values)
        .map_err(|e| JsValue::from_str(&format!("serialization error: {e}")))
}
