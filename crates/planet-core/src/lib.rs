//! Deterministic procedural planet generation and climate derivation.
//!
//! Given a seed, a [`params::PlanetParams`] configuration, and a
//! [`planet::PlanetType`], [`generator::Generator`] produces a fully
//! composed [`planet::Planet`] — material layers, atmosphere, hydrosphere,
//! orbit, axis geometry, resources, rings. [`surface_sampler::SurfaceSampler`]
//! then reads that planet to answer per-(latitude, longitude) questions
//! about elevation, seasonal temperature, precipitation, and atmospheric
//! pressure/density, and [`queries`] answers illumination, sunrise/sunset,
//! satellite phase, and habitability.
//!
//! Everything in this crate except the [`collaborators`] traits is
//! synchronous and a pure function of its seed.

pub mod atmosphere;
pub mod collaborators;
pub mod coords;
pub mod error;
pub mod generator;
pub mod hydrosphere;
pub mod material;
pub mod noise;
pub mod orbit;
pub mod params;
pub mod planet;
pub mod queries;
pub mod rehydrator;
pub mod resources;
pub mod rings;
pub mod sphere;
pub mod substances;
pub mod surface_sampler;
pub mod thermodynamics;

pub use generator::Generator;
pub use params::{HabitabilityRequirements, PlanetParams};
pub use planet::{Planet, PlanetType};
pub use rehydrator::Rehydrator;
pub use surface_sampler::SurfaceSampler;
