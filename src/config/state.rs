// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::handler::WebjarsHandler;

/// Application state
pub struct AppState {
    pub config: Config,
    pub handler: Arc<WebjarsHandler>,
}

impl AppState {
    pub fn new(config: Config, handler: WebjarsHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
