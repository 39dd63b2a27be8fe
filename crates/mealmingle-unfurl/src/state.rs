//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::render::Template;
use crate::store::{self, DocumentStore};

/// Shared application state available to all request handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Share page template, loaded once.
    pub template: Arc<Template>,

    /// Backing store the resolvers read from.
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Load the template and connect the store described by `config`.
    ///
    /// Fails if the template cannot be read; the service must not start
    /// without it.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let template = Template::load(&config.template_path)?;
        let store = store::connect(&config)?;

        tracing::info!(
            store = store.backend(),
            lookup_timeout_ms = config.lookup_timeout.as_millis() as u64,
            "application state initialized"
        );

        Ok(Self::from_parts(config, template, store))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(config: Config, template: Template, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            template: Arc::new(template),
            store,
        }
    }
}
