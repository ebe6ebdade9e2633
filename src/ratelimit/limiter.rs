//! Configured admission-control limiters.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::clock::Clock;
use crate::error::{FloodgateError, Result};
use crate::request::InboundRequest;

use super::resolver::{resolve_client_key, KeyResolver};
use super::store::{Verdict, WindowStore};

/// Policy for a single traffic class.
///
/// Immutable once a [`Limiter`] is constructed from it. The name doubles as
/// the namespace for every key the limiter writes, so limiters with
/// distinct names never touch each other's counts even for the same client.
#[derive(Clone)]
pub struct LimiterConfig {
    name: String,
    max: u32,
    window: Duration,
    resolver: Option<KeyResolver>,
}

impl LimiterConfig {
    /// Create a policy allowing `max` operations per `window`.
    pub fn new(name: impl Into<String>, max: u32, window: Duration) -> Self {
        Self {
            name: name.into(),
            max,
            window,
            resolver: None,
        }
    }

    /// Replace the default header-chain resolver with a custom one, e.g.
    /// to partition by authenticated user id instead of network address.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&dyn InboundRequest) -> String + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// The limiter name, also its key namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ceiling on admitted operations per window.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl fmt::Debug for LimiterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimiterConfig")
            .field("name", &self.name)
            .field("max", &self.max)
            .field("window", &self.window)
            .field("custom_resolver", &self.resolver.is_some())
            .finish()
    }
}

/// A configured admission check over the shared window store.
///
/// The limiter is stateless; all mutable state lives in the injected
/// [`WindowStore`].
pub struct Limiter {
    config: LimiterConfig,
    store: Arc<WindowStore>,
    clock: Arc<dyn Clock>,
}

impl Limiter {
    /// Create a limiter, validating its configuration.
    ///
    /// Misconfiguration is the only fatal condition in the crate: a zero
    /// `max` or zero window is rejected here, never at check time.
    pub fn new(
        config: LimiterConfig,
        store: Arc<WindowStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if config.max == 0 {
            return Err(FloodgateError::Config(format!(
                "limiter '{}': max must be positive",
                config.name
            )));
        }
        if config.window.is_zero() {
            return Err(FloodgateError::Config(format!(
                "limiter '{}': window duration must be positive",
                config.name
            )));
        }

        Ok(Self {
            config,
            store,
            clock,
        })
    }

    /// Check one inbound request, returning the admission verdict.
    pub fn check(&self, request: &dyn InboundRequest) -> Verdict {
        let client = match &self.config.resolver {
            Some(resolve) => resolve(request),
            None => resolve_client_key(request),
        };
        let key = format!("{}:{}", self.config.name, client);

        trace!(limiter = %self.config.name, client = %client, "checking request");

        self.store.check_and_increment(
            &key,
            self.config.max,
            self.config.window,
            self.clock.now_millis(),
        )
    }

    /// The policy this limiter enforces.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }
}
