//! Identifier sanitizing and display-name derivation.

use lazy_static::lazy_static;
use regex::Regex;

/// Key used when no usable identifier is supplied.
pub const GUEST_KEY: &str = "guest";

/// Display name used when no usable identifier is supplied.
pub const FALLBACK_DISPLAY_NAME: &str = "Guest";

lazy_static! {
    /// Runs of characters that may not appear in a storage key
    static ref NON_KEY_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    /// Token separators for display names
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// The active user as seen by the history store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub raw_identifier: Option<String>,
    /// Sole partition key for history.
    pub key: String,
    pub display_name: String,
}

impl Identity {
    pub fn guest() -> Self {
        Self::from_identifier(None)
    }

    pub fn from_identifier(identifier: Option<&str>) -> Self {
        Self {
            raw_identifier: identifier.map(|s| s.to_string()),
            key: sanitize(identifier),
            display_name: derive_display_name(identifier),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::guest()
    }
}

/// Derive the storage key for an identifier.
///
/// Trims, lower-cases and collapses every run of characters outside
/// `[a-z0-9]` into one `_`. Absent or blank input maps to `GUEST_KEY`.
pub fn sanitize(identifier: Option<&str>) -> String {
    let trimmed = match identifier {
        Some(s) => s.trim().to_lowercase(),
        None => return GUEST_KEY.to_string(),
    };
    if trimmed.is_empty() {
        return GUEST_KEY.to_string();
    }

    let key = NON_KEY_CHARS.replace_all(&trimmed, "_");
    if key.is_empty() {
        GUEST_KEY.to_string()
    } else {
        key.into_owned()
    }
}

/// Derive a display name for an identifier.
///
/// `"jane.doe@example.com"` becomes `"Jane Doe"`. The part after the first
/// `@` is dropped when something precedes it, `_ . -` act as separators and
/// each token is capitalized. If no token survives, the trimmed input is
/// returned upper-cased.
pub fn derive_display_name(identifier: Option<&str>) -> String {
    let trimmed = match identifier.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return FALLBACK_DISPLAY_NAME.to_string(),
    };

    let local_part = match trimmed.find('@') {
        Some(at) if at > 0 => &trimmed[..at],
        _ => trimmed,
    };
    let spaced = local_part.replace(['_', '.', '-'], " ");

    let tokens: Vec<String> = WHITESPACE
        .split(&spaced)
        .filter(|t| !t.is_empty())
        .map(capitalize)
        .collect();

    if tokens.is_empty() {
        trimmed.to_uppercase()
    } else {
        tokens.join(" ")
    }
}

/// Upper-case the first character, lower-case the rest.
pub(crate) fn capitalize(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
