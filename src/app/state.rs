//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::WorldHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Handle to the single authoritative game world
    pub world: WorldHandle,
}

impl AppState {
    pub fn new(config: Config, world: WorldHandle) -> Self {
        Self {
            config: Arc::new(config),
            world,
        }
    }
}
