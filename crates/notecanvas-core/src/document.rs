//! JSON documents: the whole block state, keyed by canvas id.

use crate::store::GlobalState;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors reading or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Serialize the state as pretty-printed JSON.
pub fn to_json(state: &GlobalState) -> DocumentResult<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse a document and rebuild every stroke's path.
pub fn from_json(json: &str) -> DocumentResult<GlobalState> {
    let mut state: GlobalState = serde_json::from_str(json)?;
    state.rehydrate();
    Ok(state)
}

/// Write the state to `path`.
pub fn save(state: &GlobalState, path: impl AsRef<Path>) -> DocumentResult<()> {
    let path = path.as_ref();
    fs::write(path, to_json(state)?)?;
    log::info!("Saved {} blocks to {}", state.block_count(), path.display());
    Ok(())
}

/// Read a document from `path`.
pub fn load(path: impl AsRef<Path>) -> DocumentResult<GlobalState> {
    let path = path.as_ref();
    let state = from_json(&fs::read_to_string(path)?)?;
    log::info!("Loaded {} blocks from {}", state.block_count(), path.display());
    Ok(state)
}
