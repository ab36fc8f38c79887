//! Page registry, routing and page rendering.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::content::{render, OverrideSet, GLOBAL_PAGE};
use crate::error::{Error, Result};
use crate::storage::Storage;

/// A page that can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Page identifier stored with overrides.
    pub id: &'static str,
    /// Name shown in the admin page picker.
    pub label: &'static str,
    /// Template file name.
    pub file: &'static str,
}

const fn page(id: &'static str, label: &'static str, file: &'static str) -> PageInfo {
    PageInfo { id, label, file }
}

/// Every editable page, `global` first.
pub const PAGES: &[PageInfo] = &[
    page(GLOBAL_PAGE, "Global (Nav + Footer)", "index.html"),
    page("home", "Home", "index.html"),
    page("our-story", "Our Story", "our-story.html"),
    page("booking", "Booking", "booking.html"),
    page("policies", "Policies", "policies.html"),
    page("faq", "FAQ", "faq.html"),
    page("stylists", "Stylists", "stylists.html"),
    page("stylist-profile", "Stylist Profile", "stylist-profile.html"),
    page("join-our-team", "Join Our Team", "join-our-team.html"),
    page("contact", "Contact", "contact.html"),
    page("store", "Store", "store.html"),
    page("login", "Store Login", "login.html"),
];

/// Look up a page by identifier.
#[must_use]
pub fn page_info(id: &str) -> Option<&'static PageInfo> {
    PAGES.iter().find(|p| p.id == id)
}

/// Whether `id` names an editable page (including `global`).
#[must_use]
pub fn is_known(id: &str) -> bool {
    page_info(id).is_some()
}

/// Template file of a page.
///
/// # Errors
///
/// Returns [`Error::UnknownPage`] for an unregistered identifier.
pub fn template_file(id: &str) -> Result<&'static str> {
    page_info(id).map(|p| p.file).ok_or_else(|| Error::UnknownPage {
        page: id.to_string(),
    })
}

/// Page served at a URL path: `/` and `/index.html` are `home`, `/x` and
/// `/x.html` are `x`. The `global` pseudo-page has no route.
#[must_use]
pub fn page_for_route(path: &str) -> Option<&'static str> {
    let trimmed = path.trim_matches('/');
    let name = trimmed.strip_suffix(".html").unwrap_or(trimmed);
    let id = match name {
        "" | "index" => "home",
        other => other,
    };
    page_info(id).filter(|p| p.id != GLOBAL_PAGE).map(|p| p.id)
}

/// Directory of page templates.
#[derive(Debug, Clone)]
pub struct SiteTemplates {
    dir: PathBuf,
}

impl SiteTemplates {
    /// Templates under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Template directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the template of a page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPage`] for an unregistered page and
    /// [`Error::TemplateLoad`] when the file cannot be read.
    pub fn load(&self, page: &str) -> Result<String> {
        let path = self.dir.join(template_file(page)?);
        debug!(%page, path = %path.display(), "loading template");
        std::fs::read_to_string(&path).map_err(|source| Error::TemplateLoad { path, source })
    }
}

/// Render a page with its own and the global overrides applied.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded, the overrides cannot
/// be read, or the markup cannot be rewritten.
pub fn render_page(storage: &Storage, templates: &SiteTemplates, page: &str) -> Result<String> {
    let markup = templates.load(page)?;
    let rows = storage.content_for_pages(&[GLOBAL_PAGE, page])?;
    let overrides = OverrideSet::from_rows(page, rows);
    render(&markup, &overrides)
}
