//! External interfaces (spec §6): map storage, object persistence, and the
//! star-system lookup the planet consumes but never owns. Generation and
//! sampling stay synchronous; only these boundaries are async.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MapIoError, StoreError};
use crate::sphere::Vec3;

/// 16-bit grayscale map buffer (spec §6 image format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u16>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; (width * height) as usize] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Elevation,
    Precipitation(u32),
    Snowfall(u32),
    TemperatureSummer,
    TemperatureWinter,
}

impl MapKind {
    pub fn as_key(self) -> String {
        match self {
            MapKind::Elevation => "elevation".to_string(),
            MapKind::Precipitation(i) => format!("precipitation_{i}"),
            MapKind::Snowfall(i) => format!("snowfall_{i}"),
            MapKind::TemperatureSummer => "temperature_summer".to_string(),
            MapKind::TemperatureWinter => "temperature_winter".to_string(),
        }
    }
}

#[async_trait]
pub trait SurfaceMapLoader: Send + Sync {
    async fn save(&self, image: &ImageBuffer, planet_id: u64, kind: MapKind) -> Result<String, MapIoError>;
    async fn load(&self, path: &str) -> Result<ImageBuffer, MapIoError>;
    async fn remove(&self, path: &str) -> Result<bool, MapIoError>;
}

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn get_item<T: DeserializeOwned>(&self, id: u64) -> Result<Option<T>, StoreError>;
    async fn set_item<T: Serialize + Sync>(&self, id: u64, item: &T) -> Result<(), StoreError>;
    async fn remove_item(&self, id: u64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub luminosity_w: f64,
    pub mass_kg: f64,
    pub position: Vec3,
    pub temperature_k: f64,
}

impl Star {
    /// Position at a given instant; stars are treated as stationary points
    /// for the purposes this crate cares about (orbital propagation of the
    /// star system itself is out of scope).
    pub fn position_at(&self, _instant_s: f64) -> Vec3 {
        self.position
    }
}

#[async_trait]
pub trait StarSystemSource: Send + Sync {
    async fn get_stars(&self) -> Result<Vec<Star>, StoreError>;
}

/// A minimal satellite for phase/illumination queries (spec §4.7):
/// orbital mechanics are out of scope, so callers supply position directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Satellite {
    pub position: Vec3,
    pub albedo: f64,
    pub radius_m: f64,
}
