//! Command-line harness for generating a planet from a seed and printing its
//! composed state, or rendering one of its surface fields as a grid of
//! values on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use planet_core::collaborators::Star;
use planet_core::params::PlanetParams;
use planet_core::planet::PlanetType;
use planet_core::sphere::Vec3;
use planet_core::surface_sampler::SurfaceSampler;
use planet_core::Generator;

#[derive(Parser, Debug)]
#[command(name = "planet-cli", about = "Generate and inspect procedural planets")]
struct Args {
    /// Seed driving the deterministic generation pipeline.
    #[arg(short, long, default_value_t = 1)]
    seed: u32,

    /// Planet type to generate.
    #[arg(short = 't', long, default_value = "terrestrial")]
    planet_type: String,

    /// Path to a PlanetParams JSON file; defaults to Earth-calibrated values.
    #[arg(short, long)]
    params: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of the generated planet as JSON.
    Summary,
    /// Render a surface field as a grid of values.
    Map {
        #[arg(value_enum)]
        field: MapField,
        #[arg(long, default_value_t = 640)]
        width: usize,
        #[arg(long, default_value_t = 320)]
        height: usize,
        /// Proportion of the year, 0.0-1.0, for temperature/precipitation fields.
        #[arg(long, default_value_t = 0.0)]
        proportion_of_year: f64,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum MapField {
    Elevation,
    Temperature,
    Precipitation,
}

fn parse_planet_type(name: &str) -> Result<PlanetType> {
    Ok(match name {
        "terrestrial" => PlanetType::Terrestrial,
        "carbon" => PlanetType::Carbon,
        "gas-giant" => PlanetType::GasGiant,
        "ice-giant" => PlanetType::IceGiant,
        "dwarf" => PlanetType::Dwarf,
        "asteroid" => PlanetType::Asteroid,
        "comet" => PlanetType::Comet,
        other => anyhow::bail!("unknown planet type '{other}'"),
    })
}

fn sunlike_star() -> Star {
    Star { luminosity_w: 3.828e26, mass_kg: 1.989e30, position: Vec3::ZERO, temperature_k: 5778.0 }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let planet_type = parse_planet_type(&args.planet_type)?;
    let params = match &args.params {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading params file {path}"))?;
            serde_json::from_str::<PlanetParams>(&text).with_context(|| format!("parsing params file {path}"))?
        }
        None => PlanetParams::default(),
    };

    info!("generating seed={} type={:?}", args.seed, planet_type);
    let planet = Generator::generate(args.seed, planet_type, &params, None, &[sunlike_star()]);

    match args.command {
        Command::Summary => {
            let summary = serde_json::json!({
                "seed": planet.seed,
                "planet_type": format!("{:?}", planet.planet_type),
                "mass_kg": planet.mass_kg,
                "radius_m": planet.radius_m,
                "surface_gravity": planet.surface_gravity,
                "sea_level_m": planet.sea_level_m,
                "normalized_sea_level": planet.normalized_sea_level,
                "has_biosphere": planet.has_biosphere,
                "atmospheric_pressure_kpa": planet.atmosphere.pressure_kpa,
                "average_surface_temperature_k": planet.thermal_cache.average_surface_temperature_k,
                "ring_bands": planet.rings.bands.len(),
                "resource_deposits": planet.resources.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Map { field, width, height, proportion_of_year } => {
            let sampler = SurfaceSampler::new(&planet);
            let grid = match field {
                MapField::Elevation => sampler.generate_elevation_map(width, height),
                MapField::Temperature => sampler.generate_temperature_map(proportion_of_year, width, height),
                MapField::Precipitation => {
                    let frames = sampler.generate_precipitation_frames(1, width, height);
                    frames.into_iter().next().expect("at least one frame")
                }
            };
            for row in 0..height {
                let cells: Vec<String> =
                    (0..width).map(|col| format!("{:.3}", grid.get(row, col))).collect();
                println!("{}", cells.join(","));
            }
        }
    }

    Ok(())
}
