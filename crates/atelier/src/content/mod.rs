//! Editable page content.
//!
//! Page templates mark editable elements with `data-content-key`. The
//! [`scanner`] derives the default value of every marked element, overrides
//! saved through the [`writer`] are stored per `(page, key)`, and the
//! [`resolver`] merges the two when a page is rendered.
//!
//! Overrides saved under the page identifier [`GLOBAL_PAGE`] are shared by all
//! pages (navigation, footer); an override saved for the page itself takes
//! precedence over a global one.

pub mod paths;
pub mod resolver;
pub mod scanner;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use resolver::{render, OverrideSet};
pub use scanner::scan;
pub use writer::{ContentField, ContentWriter, SAVED};

/// Page identifier under which shared overrides are stored.
pub const GLOBAL_PAGE: &str = "global";

/// Marker attribute naming an element's content key.
pub const KEY_ATTR: &str = "data-content-key";

/// Marker attribute naming the key whose value becomes an element's `href`.
pub const HREF_KEY_ATTR: &str = "data-content-href-key";

/// Attribute overriding how a value is applied.
pub const TARGET_ATTR: &str = "data-content-target";

/// Attribute marking an element as shared across pages.
pub const SCOPE_ATTR: &str = "data-content-scope";

/// Attribute holding a background element's default image.
pub const DEFAULT_ATTR: &str = "data-content-default";

/// How a content value is applied to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Element text.
    Text,
    /// Link target.
    Href,
    /// Image source.
    Src,
    /// CSS background image.
    Background,
    /// `content` attribute of a `<meta>` tag.
    Meta,
    /// `data` attribute (embedded objects).
    Data,
}

impl ValueType {
    /// Infer the type of an element that has no explicit target.
    #[must_use]
    pub fn infer(tag_name: &str) -> Self {
        if tag_name.eq_ignore_ascii_case("img") {
            Self::Src
        } else if tag_name.eq_ignore_ascii_case("meta") {
            Self::Meta
        } else {
            Self::Text
        }
    }

    /// The type named by an element's target attribute, falling back to
    /// inference from its tag.
    #[must_use]
    pub fn for_element(target: Option<&str>, tag_name: &str) -> Self {
        target
            .and_then(|t| t.parse().ok())
            .unwrap_or_else(|| Self::infer(tag_name))
    }

    /// Whether values of this type may come from an uploaded file.
    #[must_use]
    pub fn accepts_upload(self) -> bool {
        matches!(self, Self::Src | Self::Background)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Href => "href",
            Self::Src => "src",
            Self::Background => "background",
            Self::Meta => "meta",
            Self::Data => "data",
        };
        f.pad(name)
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "href" => Ok(Self::Href),
            "src" => Ok(Self::Src),
            "background" => Ok(Self::Background),
            "meta" => Ok(Self::Meta),
            "data" => Ok(Self::Data),
            other => Err(Error::UnknownValueType(other.to_string())),
        }
    }
}

/// Whether a marked element belongs to one page or to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Shared across pages.
    Global,
    /// Specific to the page being rendered.
    Page,
}

impl Scope {
    /// Scope of an element given its scope attribute.
    #[must_use]
    pub fn from_attr(value: Option<&str>) -> Self {
        if value == Some(GLOBAL_PAGE) {
            Self::Global
        } else {
            Self::Page
        }
    }

    /// Scope that the admin editor collects for a page identifier.
    #[must_use]
    pub fn for_page(page: &str) -> Self {
        if page == GLOBAL_PAGE {
            Self::Global
        } else {
            Self::Page
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.pad("global"),
            Self::Page => f.pad("page"),
        }
    }
}

/// A stored value replacing a template default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOverride {
    /// Page identifier, or [`GLOBAL_PAGE`].
    pub page: String,
    /// Content key.
    pub key: String,
    /// Replacement value.
    pub value: String,
    /// How the value is applied.
    pub value_type: ValueType,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// A default value found in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDefault {
    /// Content key.
    pub key: String,
    /// Scope the element was marked with.
    pub scope: Scope,
    /// How values for this key are applied.
    pub value_type: ValueType,
    /// The value authored in the template.
    pub default_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_inference() {
        assert_eq!(ValueType::infer("img"), ValueType::Src);
        assert_eq!(ValueType::infer("IMG"), ValueType::Src);
        assert_eq!(ValueType::infer("meta"), ValueType::Meta);
        assert_eq!(ValueType::infer("h1"), ValueType::Text);
    }

    #[test]
    fn test_explicit_target_wins() {
        assert_eq!(
            ValueType::for_element(Some("background"), "section"),
            ValueType::Background
        );
        assert_eq!(ValueType::for_element(Some("bogus"), "img"), ValueType::Src);
        assert_eq!(ValueType::for_element(None, "p"), ValueType::Text);
    }

    #[test]
    fn test_value_type_parse_and_display() {
        for name in ["text", "href", "src", "background", "meta", "data"] {
            let parsed: ValueType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("value".parse::<ValueType>().is_err());
    }

    #[test]
    fn test_scope_from_attr() {
        assert_eq!(Scope::from_attr(Some("global")), Scope::Global);
        assert_eq!(Scope::from_attr(Some("page")), Scope::Page);
        assert_eq!(Scope::from_attr(None), Scope::Page);
        assert_eq!(Scope::for_page("global"), Scope::Global);
        assert_eq!(Scope::for_page("booking"), Scope::Page);
    }

    #[test]
    fn test_accepts_upload() {
        assert!(ValueType::Src.accepts_upload());
        assert!(ValueType::Background.accepts_upload());
        assert!(!ValueType::Text.accepts_upload());
    }
}
