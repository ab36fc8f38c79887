//! `site_content` table.

use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::{debug, warn};

use super::{format_timestamp, parse_timestamp, Storage};
use crate::content::{ContentOverride, ValueType};
use crate::error::Result;

impl Storage {
    /// Insert or replace the override for `(page, key)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_content(&self, row: &ContentOverride) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO site_content (page, content_key, content_value, content_type, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (page, content_key) DO UPDATE SET
                content_value = excluded.content_value,
                content_type = excluded.content_type,
                updated_at = excluded.updated_at
            ",
            params![
                row.page,
                row.key,
                row.value,
                row.value_type.to_string(),
                format_timestamp(row.updated_at),
            ],
        )?;
        debug!(page = %row.page, key = %row.key, "saved content override");
        Ok(())
    }

    /// Get the override stored for `(page, key)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_content(&self, page: &str, key: &str) -> Result<Option<ContentOverride>> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT page, content_key, content_value, content_type, updated_at
                FROM site_content WHERE page = ?1 AND content_key = ?2
                ",
                params![page, key],
                Self::row_to_content,
            )
            .optional()?;
        Ok(row)
    }

    /// Get every override stored for any of `pages`, ordered by page then key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn content_for_pages(&self, pages: &[&str]) -> Result<Vec<ContentOverride>> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; pages.len()].join(", ");
        let sql = format!(
            "SELECT page, content_key, content_value, content_type, updated_at
             FROM site_content WHERE page IN ({placeholders})
             ORDER BY page, content_key"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(pages.iter()), Self::row_to_content)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Remove the override for `(page, key)`. Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_content(&self, page: &str, key: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM site_content WHERE page = ?1 AND content_key = ?2",
            params![page, key],
        )?;
        Ok(affected > 0)
    }

    fn row_to_content(row: &rusqlite::Row) -> rusqlite::Result<ContentOverride> {
        let type_str: String = row.get(3)?;
        let updated_at: String = row.get(4)?;

        let value_type = type_str.parse().unwrap_or_else(|_| {
            warn!("Unknown content type: {}, defaulting to text", type_str);
            ValueType::Text
        });

        Ok(ContentOverride {
            page: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            value_type,
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(page: &str, key: &str, value: &str) -> ContentOverride {
        ContentOverride {
            page: page.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: ValueType::Text,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_replaces() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_content(&row("home", "title", "First")).unwrap();

        let mut second = row("home", "title", "assets/a.jpg");
        second.value_type = ValueType::Src;
        storage.upsert_content(&second).unwrap();

        let stored = storage.get_content("home", "title").unwrap().unwrap();
        assert_eq!(stored.value, "assets/a.jpg");
        assert_eq!(stored.value_type, ValueType::Src);
        assert_eq!(storage.stats().unwrap().content_overrides, 1);
    }

    #[test]
    fn test_content_for_pages() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_content(&row("home", "b", "1")).unwrap();
        storage.upsert_content(&row("home", "a", "2")).unwrap();
        storage.upsert_content(&row("global", "brand", "3")).unwrap();
        storage.upsert_content(&row("faq", "q1", "4")).unwrap();

        let rows = storage.content_for_pages(&["global", "home"]).unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.page.as_str(), r.key.as_str()))
            .collect();
        assert_eq!(keys, vec![("global", "brand"), ("home", "a"), ("home", "b")]);

        assert!(storage.content_for_pages(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_delete_content() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_content(&row("home", "title", "x")).unwrap();
        assert!(storage.delete_content("home", "title").unwrap());
        assert!(!storage.delete_content("home", "title").unwrap());
        assert!(storage.get_content("home", "title").unwrap().is_none());
    }
}
