//! Error kinds for the collaborator boundary (spec §7). Generation and
//! sampling themselves never fail — numeric anomalies are clamped locally
//! — so these types only cover I/O and persistence.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapIoError {
    #[error("map not found at {0}")]
    NotFound(String),
    #[error("underlying storage failure: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(u64),
    #[error("underlying storage failure: {0}")]
    Storage(String),
}
