//! Client identity resolution for inbound requests.

use std::sync::Arc;

use crate::request::InboundRequest;

/// Identity assigned when no identifying header is present.
///
/// All unidentified clients share this key, and therefore one counting
/// window.
pub const FALLBACK_IDENTITY: &str = "unknown";

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CLIENT_IP: &str = "cf-connecting-ip";

/// A custom identity resolver.
///
/// When set on a limiter it fully replaces the default header chain rather
/// than augmenting it.
pub type KeyResolver = Arc<dyn Fn(&dyn InboundRequest) -> String + Send + Sync>;

/// Derive a stable identity string for a request.
///
/// Priority order, first non-empty wins:
/// 1. `x-forwarded-for`, first comma-separated token, trimmed
/// 2. `x-real-ip`, verbatim
/// 3. `cf-connecting-ip`, verbatim
/// 4. [`FALLBACK_IDENTITY`]
pub fn resolve_client_key(request: &dyn InboundRequest) -> String {
    if let Some(forwarded) = request.header(FORWARDED_FOR) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(ip) = request.header(REAL_IP) {
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    if let Some(ip) = request.header(CLIENT_IP) {
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    FALLBACK_IDENTITY.to_string()
}
