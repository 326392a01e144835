//! Config schema. Unknown keys are rejected everywhere so a typo fails the
//! load instead of silently falling back to a default.

use serde::Deserialize;

use pulseboard_core::{PulseboardError, Result};

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub dashboard: DashboardSection,
    #[serde(default)]
    pub store: StoreSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseboardError::BadRequest(format!(
                "unsupported config version {}, expected 1",
                self.version
            )));
        }
        self.server.validate()?;
        self.dashboard.validate()?;
        self.store.validate()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            dashboard: DashboardSection::default(),
            store: StoreSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl ServerSection {
    fn validate(&self) -> Result<()> {
        self.listen
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                PulseboardError::BadRequest(format!(
                    "server.listen {:?} is not a socket address: {e}",
                    self.listen
                ))
            })
            .map(|_| ())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

impl DashboardSection {
    fn validate(&self) -> Result<()> {
        if !(1_000..=300_000).contains(&self.poll_interval_ms) {
            return Err(PulseboardError::BadRequest(format!(
                "dashboard.poll_interval_ms {} out of range 1000..=300000",
                self.poll_interval_ms
            )));
        }
        if !(1..=168).contains(&self.window_hours) {
            return Err(PulseboardError::BadRequest(format!(
                "dashboard.window_hours {} out of range 1..=168",
                self.window_hours
            )));
        }
        Ok(())
    }
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            window_hours: default_window_hours(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Remote,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub credentials_file: Option<String>,
}

impl StoreSection {
    fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Remote
            && self.project_id.as_deref().map_or(true, str::is_empty)
        {
            return Err(PulseboardError::BadRequest(
                "store.backend 'remote' requires store.project_id".into(),
            ));
        }
        Ok(())
    }

    /// Overlay environment variables onto the file values.
    pub fn apply_env(&mut self) {
        if let Ok(project) = std::env::var("PULSEBOARD_STORE_PROJECT_ID") {
            if !project.is_empty() {
                self.project_id = Some(project);
            }
        }
        if let Ok(credentials) = std::env::var("PULSEBOARD_STORE_CREDENTIALS_FILE") {
            if !credentials.is_empty() {
                self.credentials_file = Some(credentials);
            }
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    10_000
}

fn default_window_hours() -> u32 {
    24
}
