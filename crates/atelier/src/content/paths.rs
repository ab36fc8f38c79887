//! Link and asset path normalization.
//!
//! Templates were authored as flat `.html` files with relative links; pages
//! are served on clean routes. Values are rewritten so they keep working from
//! any route.

use super::ValueType;

const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://"];

/// Normalize an image/background/data reference.
#[must_use]
pub fn normalize_asset_path(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_ascii_lowercase();
    if has_prefix(&lower, ABSOLUTE_PREFIXES)
        || has_prefix(&lower, &["data:", "blob:", "//"])
        || trimmed.starts_with('/')
    {
        return trimmed.to_string();
    }

    if trimmed.starts_with("assets/") {
        return format!("/{trimmed}");
    }

    trimmed.to_string()
}

/// Normalize a link target.
///
/// `index.html` becomes `/`; `booking.html` becomes `/booking`.
#[must_use]
pub fn normalize_href(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_ascii_lowercase();
    if has_prefix(&lower, ABSOLUTE_PREFIXES)
        || has_prefix(&lower, &["mailto:", "tel:", "//"])
        || trimmed.starts_with('#')
        || trimmed.starts_with('/')
    {
        return trimmed.to_string();
    }

    if trimmed.starts_with("assets/") {
        return format!("/{trimmed}");
    }

    let cleaned = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if let Some(base) = cleaned.strip_suffix(".html") {
        if base == "index" {
            return "/".to_string();
        }
        return format!("/{base}");
    }

    format!("/{cleaned}")
}

/// Normalize a value according to how it will be applied.
#[must_use]
pub fn normalize_for(value_type: ValueType, value: &str) -> String {
    match value_type {
        ValueType::Href => normalize_href(value),
        ValueType::Src | ValueType::Background | ValueType::Data => normalize_asset_path(value),
        ValueType::Text | ValueType::Meta => value.to_string(),
    }
}

fn has_prefix(lower: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| lower.starts_with(p))
}
