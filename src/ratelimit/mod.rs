//! Rate limiting logic and state management.

mod limiter;
mod registry;
mod resolver;
mod store;
mod sweeper;

pub use limiter::{Limiter, LimiterConfig};
pub use registry::{LimiterRegistry, AUTHENTICATION, FORM_SUBMISSION, GENERAL_API, SEARCH};
pub use resolver::{resolve_client_key, KeyResolver, FALLBACK_IDENTITY};
pub use store::{Verdict, WindowStore};
pub use sweeper::{Sweeper, SweeperHandle, DEFAULT_SWEEP_INTERVAL};
