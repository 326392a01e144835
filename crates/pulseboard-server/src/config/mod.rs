//! Configuration loading.

mod schema;

pub use schema::{DashboardSection, ServerConfig, ServerSection, StoreBackend, StoreSection};

use std::path::Path;

use pulseboard_core::{PulseboardError, Result};

/// Parse and validate a YAML document.
pub fn load_from_str(raw: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(raw)
        .map_err(|e| PulseboardError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load a config file, overlay environment variables, validate.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PulseboardError::Internal(format!("read config {}: {e}", path.display()))
    })?;
    let mut cfg: ServerConfig = serde_yaml::from_str(&raw)
        .map_err(|e| PulseboardError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.store.apply_env();
    cfg.validate()?;
    Ok(cfg)
}
