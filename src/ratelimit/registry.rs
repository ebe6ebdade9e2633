//! Named limiter registry for distinct traffic classes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::error::{FloodgateError, Result};

use super::limiter::{Limiter, LimiterConfig};
use super::store::WindowStore;

/// Registry name for the form submission traffic class.
pub const FORM_SUBMISSION: &str = "form_submission";
/// Registry name for the authentication traffic class.
pub const AUTHENTICATION: &str = "authentication";
/// Registry name for general API traffic.
pub const GENERAL_API: &str = "api";
/// Registry name for the search traffic class.
pub const SEARCH: &str = "search";

/// A fixed set of named limiters constructed once at process start.
///
/// Entries are independent: each limiter namespaces its keys by its own
/// name, so exhausting one class never affects another for the same client.
pub struct LimiterRegistry {
    limiters: HashMap<String, Limiter>,
}

impl LimiterRegistry {
    /// Build a registry with the default traffic classes.
    pub fn new(store: Arc<WindowStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_configs(default_configs(), store, clock)
    }

    /// Build a registry from explicit limiter configurations.
    ///
    /// Fails on the first invalid configuration or duplicate name; a partial
    /// registry is never handed out.
    pub fn with_configs(
        configs: Vec<LimiterConfig>,
        store: Arc<WindowStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut limiters = HashMap::with_capacity(configs.len());
        for config in configs {
            let name = config.name().to_string();
            if limiters.contains_key(&name) {
                return Err(FloodgateError::Config(format!(
                    "duplicate limiter name '{}'",
                    name
                )));
            }

            debug!(
                limiter = %name,
                max = config.max(),
                window = ?config.window(),
                "registering limiter"
            );
            let limiter = Limiter::new(config, Arc::clone(&store), Arc::clone(&clock))?;
            limiters.insert(name, limiter);
        }

        Ok(Self { limiters })
    }

    /// Look up a limiter by name.
    pub fn get(&self, name: &str) -> Option<&Limiter> {
        self.limiters.get(name)
    }

    /// Names of all registered limiters.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.limiters.keys().map(String::as_str)
    }

    /// Number of registered limiters.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    /// The longest window among registered limiters.
    ///
    /// Useful for sizing the sweep interval, which should be materially
    /// longer than any window it cleans up after.
    pub fn longest_window(&self) -> Duration {
        self.limiters
            .values()
            .map(|limiter| limiter.config().window())
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

fn default_configs() -> Vec<LimiterConfig> {
    vec![
        LimiterConfig::new(FORM_SUBMISSION, 5, Duration::from_secs(15 * 60)),
        LimiterConfig::new(AUTHENTICATION, 10, Duration::from_secs(15 * 60)),
        LimiterConfig::new(GENERAL_API, 100, Duration::from_secs(60)),
        LimiterConfig::new(SEARCH, 30, Duration::from_secs(60)),
    ]
}
