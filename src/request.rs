//! The inbound request surface consumed from the surrounding system.

use std::collections::HashMap;

/// An inbound request as seen by the governance layer.
///
/// The surrounding system hands in whatever request type it has; the only
/// thing this crate needs from it is header lookup. Implementations must
/// treat header names case-insensitively.
pub trait InboundRequest {
    /// Look up a header value by name.
    fn header(&self, name: &str) -> Option<&str>;
}

impl InboundRequest for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-Forwarded-For".to_string(), "192.168.1.1".to_string());

        assert_eq!(headers.header("x-forwarded-for"), Some("192.168.1.1"));
        assert_eq!(headers.header("X-FORWARDED-FOR"), Some("192.168.1.1"));
        assert_eq!(headers.header("x-Forwarded-For"), Some("192.168.1.1"));
    }

    #[test]
    fn test_missing_header_returns_none() {
        let headers: HashMap<String, String> = HashMap::new();
        assert_eq!(headers.header("x-real-ip"), None);
    }
}
