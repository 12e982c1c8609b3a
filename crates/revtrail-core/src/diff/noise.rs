//! Noise predicate: paths that never count as a change.
//!
//! Matching runs on the normalized dotted path (index brackets removed) and
//! rejects the whole path when any segment is noise.

use serde::{Deserialize, Serialize};

/// Configurable noise name lists
///
/// Exact-name lists compare case-insensitively. Identity suffixes compare
/// case-sensitively so that `paid` or `valid` are not mistaken for ids; a
/// known owner name followed by `id` in any case (`contractid`) is an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoisePolicy {
    /// Segments that are an identity on their own (`id`)
    pub identity_segments: Vec<String>,
    /// Suffixes marking a foreign key (`contractId`, `resellerID`, `order_id`)
    pub identity_suffixes: Vec<String>,
    /// Entity names whose `<name>id` form is a foreign key in any case
    pub identity_owners: Vec<String>,
    /// Child or back-reference collections
    pub collection_segments: Vec<String>,
    /// Suffixes marking child collections (`contracts`, `activeContracts`)
    pub collection_suffixes: Vec<String>,
    /// Credentials and signed-URL parameters
    pub sensitive_segments: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self {
            identity_segments: owned(&["id"]),
            identity_suffixes: owned(&["Id", "ID", "_id"]),
            identity_owners: owned(&["contract", "order", "reseller", "address"]),
            collection_segments: owned(&["orders", "history", "histories"]),
            collection_suffixes: owned(&["contracts"]),
            sensitive_segments: owned(&[
                "password",
                "passwordHash",
                "secret",
                "token",
                "accessToken",
                "refreshToken",
                "credentials",
                "apiKey",
                "signature",
                "x-amz-signature",
                "x-amz-credential",
                "x-amz-security-token",
                "x-amz-date",
                "x-amz-expires",
                "expires",
                "sig",
            ]),
        }
    }
}

impl NoisePolicy {
    /// Whether a flattened path is noise
    pub fn is_noise(&self, path: &str) -> bool {
        normalize_path(path)
            .split('.')
            .filter(|s| !s.is_empty())
            .any(|segment| self.is_noise_segment(segment))
    }

    /// Whether a single field name is noise
    pub fn is_noise_segment(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();

        let identity = self
            .identity_segments
            .iter()
            .any(|s| s.to_lowercase() == lower)
            || self
                .identity_suffixes
                .iter()
                .any(|s| segment.ends_with(s.as_str()))
            || lower.strip_suffix("id").is_some_and(|owner| {
                self.identity_owners
                    .iter()
                    .any(|o| o.to_lowercase() == owner)
            });

        let collection = self
            .collection_segments
            .iter()
            .any(|s| s.to_lowercase() == lower)
            || self
                .collection_suffixes
                .iter()
                .any(|s| lower.ends_with(&s.to_lowercase()));

        identity || collection || self.is_sensitive(segment)
    }

    /// Whether a name is a credential or signed-URL parameter
    pub fn is_sensitive(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.sensitive_segments
            .iter()
            .any(|s| s.to_lowercase() == lower)
    }
}

/// Remove index brackets: `orders[0].status` → `orders.status`
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_index = false;
    for c in path.chars() {
        match c {
            '[' => in_index = true,
            ']' => in_index = false,
            _ if !in_index => out.push(c),
            _ => {}
        }
    }
    out
}

/// Last named segment of a path (`address.zipCode` → `zipCode`)
pub fn last_segment(path: &str) -> &str {
    let base = strip_trailing_indices(path);
    base.rsplit('.').next().unwrap_or(base)
}

fn strip_trailing_indices(path: &str) -> &str {
    let mut end = path;
    while end.ends_with(']') {
        match end.rfind('[') {
            Some(pos) => end = &end[..pos],
            None => break,
        }
    }
    end
}
