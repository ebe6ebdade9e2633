//! Floodgate - In-Process Request Rate Governance
//!
//! This crate implements an in-memory admission-control layer that protects
//! shared endpoints (form submission, authentication, search, general API
//! traffic) from abuse by capping the operations a client identity may
//! perform within a rolling fixed window. The surrounding system runs one
//! check per inbound request and proceeds or rejects based on the returned
//! verdict; all counting state lives in a single shared store that a
//! background sweeper keeps bounded.

pub mod clock;
pub mod error;
pub mod ratelimit;
pub mod request;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FloodgateError, Result};
pub use ratelimit::{
    Limiter, LimiterConfig, LimiterRegistry, Sweeper, SweeperHandle, Verdict, WindowStore,
};
pub use request::InboundRequest;
