//! Template scanning.
//!
//! Finds the editable elements of a template and the value each one was
//! authored with. The admin editor lists these so every field can be edited
//! even before anything has been saved for it.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::paths::normalize_for;
use super::{
    ContentDefault, Scope, ValueType, DEFAULT_ATTR, HREF_KEY_ATTR, KEY_ATTR, SCOPE_ATTR,
    TARGET_ATTR,
};
use crate::error::{Error, Result};

/// Scan `markup` for the editable fields belonging to `page`.
///
/// Scanning the `global` page returns the elements marked as shared; any
/// other page returns the elements that are not. Keys appear once, in
/// document order, with the first occurrence winning. Link-only markers
/// (`data-content-href-key`) are collected after all primary markers.
///
/// # Errors
///
/// Returns an error if an internal selector fails to parse.
pub fn scan(markup: &str, page: &str) -> Result<Vec<ContentDefault>> {
    scan_scope(markup, Scope::for_page(page))
}

/// Scan `markup` for the editable fields of one scope.
///
/// # Errors
///
/// Returns an error if an internal selector fails to parse.
pub fn scan_scope(markup: &str, scope: Scope) -> Result<Vec<ContentDefault>> {
    let document = Html::parse_document(markup);
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    let primary = selector(&scoped_selector(KEY_ATTR, scope))?;
    for element in document.select(&primary) {
        let Some(key) = non_empty_attr(element, KEY_ATTR) else {
            continue;
        };
        if !seen.insert(key.to_string()) {
            continue;
        }

        let tag = element.value().name();
        let value_type = ValueType::for_element(element.value().attr(TARGET_ATTR), tag);
        let raw = default_value(element, value_type);
        items.push(ContentDefault {
            key: key.to_string(),
            scope,
            value_type,
            default_value: normalize_for(value_type, &raw),
        });
    }

    let links = selector(&scoped_selector(HREF_KEY_ATTR, scope))?;
    for element in document.select(&links) {
        let Some(key) = non_empty_attr(element, HREF_KEY_ATTR) else {
            continue;
        };
        if !seen.insert(key.to_string()) {
            continue;
        }

        let raw = element.value().attr("href").unwrap_or_default();
        items.push(ContentDefault {
            key: key.to_string(),
            scope,
            value_type: ValueType::Href,
            default_value: normalize_for(ValueType::Href, raw),
        });
    }

    debug!(?scope, fields = items.len(), "scanned template");
    Ok(items)
}

fn scoped_selector(marker: &str, scope: Scope) -> String {
    match scope {
        Scope::Global => format!(r#"[{marker}][{SCOPE_ATTR}="global"]"#),
        Scope::Page => format!(r#"[{marker}]:not([{SCOPE_ATTR}="global"])"#),
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::markup(format!("invalid selector {css}: {e:?}")))
}

fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

fn default_value(element: ElementRef<'_>, value_type: ValueType) -> String {
    let attr = |name: &str| element.value().attr(name).unwrap_or_default().to_string();
    match value_type {
        ValueType::Src => attr("src"),
        ValueType::Background => attr(DEFAULT_ATTR),
        ValueType::Meta => attr("content"),
        ValueType::Data => attr("data"),
        ValueType::Href => attr("href"),
        ValueType::Text => element.text().collect::<String>().trim().to_string(),
    }
}
