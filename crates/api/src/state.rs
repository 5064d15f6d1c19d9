use std::sync::Arc;
use std::time::Instant;

use certgen_core::generator::DesignGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Design request service, wired to the Gemini client in production.
    pub generator: Arc<DesignGenerator>,
    /// When the process started serving, for the health check's uptime.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, generator: DesignGenerator) -> Self {
        Self {
            config: Arc::new(config),
            generator: Arc::new(generator),
            started_at: Instant::now(),
        }
    }
}
