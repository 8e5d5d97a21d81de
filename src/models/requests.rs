//! Request DTOs for the cache service API
//!
//! Defines the path and query inputs accepted by the handlers.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Query string for the clear-all operation (DELETE /resources)
///
/// # Fields
/// - `preserve_prefix`: keys starting with this survive; defaults to the
///   configured protected prefix
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub preserve_prefix: Option<String>,
}

/// Validates a resource key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
