//! Override resolution and application.
//!
//! A value for a key comes from the page's own override, then the shared
//! `global` override, then whatever the template was authored with. Blank
//! overrides count as missing.

use std::collections::HashMap;

use lol_html::html_content::{ContentType, Element};
use lol_html::{element, rewrite_str, HandlerResult, RewriteStrSettings};
use serde::Serialize;
use tracing::{debug, trace};

use super::paths::{normalize_asset_path, normalize_href};
use super::{ContentDefault, ContentOverride, ValueType, GLOBAL_PAGE, HREF_KEY_ATTR, KEY_ATTR, TARGET_ATTR};
use crate::error::{Error, Result};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Override saved for the page itself.
    Page,
    /// Override shared by every page.
    Global,
    /// Value authored in the template.
    Default,
}

/// The value a field ends up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedValue {
    /// Content key.
    pub key: String,
    /// How the value is applied.
    pub value_type: ValueType,
    /// Final value.
    pub value: String,
    /// Where the value came from.
    pub source: Source,
}

/// Overrides loaded for one page render: the page's rows and the global rows.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    page: String,
    page_rows: HashMap<String, ContentOverride>,
    global_rows: HashMap<String, ContentOverride>,
}

impl OverrideSet {
    /// An empty set for `page`.
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            ..Self::default()
        }
    }

    /// Build the set for `page` from stored rows.
    ///
    /// Rows for other pages and rows with blank values are ignored.
    #[must_use]
    pub fn from_rows(page: &str, rows: impl IntoIterator<Item = ContentOverride>) -> Self {
        let mut set = Self::new(page);
        for row in rows {
            set.insert(row);
        }
        set
    }

    /// Add one stored row.
    pub fn insert(&mut self, row: ContentOverride) {
        if row.value.is_empty() {
            trace!(key = %row.key, "skipping blank override");
            return;
        }
        if row.page == GLOBAL_PAGE {
            self.global_rows.insert(row.key.clone(), row);
        } else if row.page == self.page {
            self.page_rows.insert(row.key.clone(), row);
        }
    }

    /// Page the set was loaded for.
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Number of usable overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.page_rows.len() + self.global_rows.len()
    }

    /// Whether no overrides were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The override that applies to `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<(&ContentOverride, Source)> {
        if let Some(row) = self.page_rows.get(key) {
            return Some((row, Source::Page));
        }
        self.global_rows.get(key).map(|row| (row, Source::Global))
    }

    /// Resolve one scanned field.
    #[must_use]
    pub fn resolve(&self, default: &ContentDefault) -> ResolvedValue {
        match self.lookup(&default.key) {
            Some((row, source)) => ResolvedValue {
                key: default.key.clone(),
                value_type: row.value_type,
                value: row.value.clone(),
                source,
            },
            None => ResolvedValue {
                key: default.key.clone(),
                value_type: default.value_type,
                value: default.default_value.clone(),
                source: Source::Default,
            },
        }
    }

    /// Resolve every scanned field, keeping scan order.
    #[must_use]
    pub fn resolve_all(&self, defaults: &[ContentDefault]) -> Vec<ResolvedValue> {
        defaults.iter().map(|d| self.resolve(d)).collect()
    }
}

/// Apply `overrides` to a template.
///
/// Elements whose key has no override are left exactly as authored.
///
/// # Errors
///
/// Returns an error if the markup cannot be rewritten.
pub fn render(markup: &str, overrides: &OverrideSet) -> Result<String> {
    if overrides.is_empty() {
        return Ok(markup.to_string());
    }

    let output = rewrite_str(
        markup,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("[data-content-key]", |el| apply_keyed(el, overrides)),
                element!("[data-content-href-key]", |el| apply_link(el, overrides)),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| Error::markup(e.to_string()))?;

    debug!(page = overrides.page(), overrides = overrides.len(), "rendered page");
    Ok(output)
}

fn apply_keyed(el: &mut Element, overrides: &OverrideSet) -> HandlerResult {
    let Some(key) = el.get_attribute(KEY_ATTR) else {
        return Ok(());
    };
    let Some((row, _)) = overrides.lookup(&key) else {
        return Ok(());
    };

    let value_type = ValueType::for_element(el.get_attribute(TARGET_ATTR).as_deref(), &el.tag_name());
    let value = row.value.as_str();
    match value_type {
        ValueType::Text => el.set_inner_content(value, ContentType::Text),
        ValueType::Href => el.set_attribute("href", &normalize_href(value))?,
        ValueType::Src => el.set_attribute("src", &normalize_asset_path(value))?,
        ValueType::Background => {
            let style = with_background(el.get_attribute("style"), &normalize_asset_path(value));
            el.set_attribute("style", &style)?;
        }
        ValueType::Meta => el.set_attribute("content", value)?,
        ValueType::Data => el.set_attribute("data", &normalize_asset_path(value))?,
    }
    Ok(())
}

fn apply_link(el: &mut Element, overrides: &OverrideSet) -> HandlerResult {
    let Some(key) = el.get_attribute(HREF_KEY_ATTR) else {
        return Ok(());
    };
    if let Some((row, _)) = overrides.lookup(&key) {
        el.set_attribute("href", &normalize_href(&row.value))?;
    }
    Ok(())
}

/// Replace any `background-image` declaration in `style` with `url`.
fn with_background(style: Option<String>, url: &str) -> String {
    let declaration = format!("background-image: url(\"{}\")", url.replace('"', "%22"));
    let mut kept: Vec<&str> = style
        .as_deref()
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty() && !d.to_ascii_lowercase().starts_with("background-image"))
        .collect();
    kept.push(&declaration);
    kept.join("; ")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::content::{scan, Scope};

    fn row(page: &str, key: &str, value: &str, value_type: ValueType) -> ContentOverride {
        ContentOverride {
            page: page.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type,
            updated_at: Utc::now(),
        }
    }

    fn default(key: &str, value: &str) -> ContentDefault {
        ContentDefault {
            key: key.to_string(),
            scope: Scope::Page,
            value_type: ValueType::Text,
            default_value: value.to_string(),
        }
    }

    #[test]
    fn test_precedence_page_then_global_then_default() {
        let set = OverrideSet::from_rows(
            "booking",
            vec![
                row("global", "both", "global value", ValueType::Text),
                row("booking", "both", "page value", ValueType::Text),
                row("global", "global-only", "shared", ValueType::Text),
                row("faq", "global-only", "other page", ValueType::Text),
            ],
        );

        let both = set.resolve(&default("both", "authored"));
        assert_eq!(both.value, "page value");
        assert_eq!(both.source, Source::Page);

        let shared = set.resolve(&default("global-only", "authored"));
        assert_eq!(shared.value, "shared");
        assert_eq!(shared.source, Source::Global);

        let untouched = set.resolve(&default("none", "authored"));
        assert_eq!(untouched.value, "authored");
        assert_eq!(untouched.source, Source::Default);
    }

    #[test]
    fn test_blank_override_falls_back() {
        let set = OverrideSet::from_rows(
            "home",
            vec![
                row("home", "title", "", ValueType::Text),
                row("global", "title", "Shared title", ValueType::Text),
            ],
        );
        assert_eq!(set.resolve(&default("title", "Authored")).value, "Shared title");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_render_without_overrides_is_identity() {
        let markup = r#"<h1 data-content-key="t">Hi</h1>"#;
        assert_eq!(render(markup, &OverrideSet::new("home")).unwrap(), markup);
    }

    #[test]
    fn test_render_applies_each_type() {
        let markup = concat!(
            r#"<meta name="description" content="old" data-content-key="desc">"#,
            r#"<h1 data-content-key="title">Old <b>title</b></h1>"#,
            r#"<img src="assets/a.jpg" data-content-key="photo">"#,
            r#"<a href="index.html" data-content-key="link" data-content-target="href">Go</a>"#,
            r#"<section style="color: red; background-image: url('x')" data-content-key="bg" data-content-target="background"></section>"#,
            r#"<object data="x.pdf" data-content-key="menu" data-content-target="data"></object>"#,
        );
        let set = OverrideSet::from_rows(
            "home",
            vec![
                row("home", "desc", "New description", ValueType::Meta),
                row("home", "title", "Fish & <Chips>", ValueType::Text),
                row("home", "photo", "assets/b.jpg", ValueType::Src),
                row("home", "link", "booking.html", ValueType::Href),
                row("home", "bg", "https://cdn.test/bg.jpg", ValueType::Background),
                row("home", "menu", "assets/menu.pdf", ValueType::Data),
            ],
        );

        let html = render(markup, &set).unwrap();
        assert!(html.contains(r#"content="New description""#));
        assert!(html.contains("Fish &amp; &lt;Chips&gt;</h1>"));
        assert!(!html.contains("<b>title</b>"));
        assert!(html.contains(r#"src="/assets/b.jpg""#));
        assert!(html.contains(r#"href="/booking""#));
        assert!(html.contains("color: red; background-image: url("));
        assert!(html.contains("https://cdn.test/bg.jpg"));
        assert!(!html.contains("url('x')"));
        assert!(html.contains(r#"data="/assets/menu.pdf""#));
    }

    #[test]
    fn test_render_href_key_marker() {
        let markup = r#"<a href="contact.html" data-content-href-key="cta">Contact</a>"#;
        let set = OverrideSet::from_rows(
            "home",
            vec![row("global", "cta", "index.html", ValueType::Href)],
        );
        let html = render(markup, &set).unwrap();
        assert!(html.contains(r#"href="/""#));
        assert!(html.contains(">Contact</a>"));
    }

    #[test]
    fn test_render_leaves_unmatched_keys() {
        let markup = r#"<p data-content-key="a">A</p><p data-content-key="b">B</p>"#;
        let set = OverrideSet::from_rows("home", vec![row("home", "a", "Z", ValueType::Text)]);
        let html = render(markup, &set).unwrap();
        assert!(html.contains(r#"<p data-content-key="a">Z</p>"#));
        assert!(html.contains(r#"<p data-content-key="b">B</p>"#));
    }

    #[test]
    fn test_scan_then_resolve() {
        let markup = r#"<span data-content-key="brand" data-content-scope="global">Studio</span>
            <h1 data-content-key="title">Welcome</h1>"#;
        let set = OverrideSet::from_rows(
            "home",
            vec![row("global", "title", "Hello from global", ValueType::Text)],
        );
        let resolved = set.resolve_all(&scan(markup, "home").unwrap());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].value, "Hello from global");
    }

    #[test]
    fn test_with_background() {
        assert_eq!(
            with_background(None, "/a.jpg"),
            r#"background-image: url("/a.jpg")"#
        );
        assert_eq!(
            with_background(Some("color: red;".to_string()), "/a.jpg"),
            r#"color: red; background-image: url("/a.jpg")"#
        );
    }
}
