//! Helpers for raw option values.

/// Trim an option value, treating blank input as absent.
///
/// Callers keep their existing value when this returns `None`, so
/// `-d ""` leaves the directory at its default instead of clearing it.
pub fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Apply every occurrence of an option in order; the last non-blank one wins.
pub fn last_normalized<'a>(values: impl IntoIterator<Item = &'a String>) -> Option<String> {
    values.into_iter().filter_map(|v| normalize(v)).last()
}
