//! Pending CMS item repository

use super::{from_millis, now_millis, Store};
use crate::error::{Error, Result};
use crate::types::PendingItem;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

const PENDING_COLUMNS: &str =
    "id, site_id, collection_id, item_id, url, is_draft, created_at, updated_at";

fn pending_from_row(row: &Row<'_>) -> rusqlite::Result<PendingItem> {
    Ok(PendingItem {
        id: row.get(0)?,
        site_id: row.get(1)?,
        collection_id: row.get(2)?,
        item_id: row.get(3)?,
        url: row.get(4)?,
        is_draft: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        updated_at: from_millis(row.get(7)?),
    })
}

impl Store {
    /// Insert or replace the pending row for (site, item)
    ///
    /// On conflict the collection, URL, draft flag and `updated_at` take the
    /// new values; the row id and `created_at` are kept.
    pub fn upsert_pending_item(
        &self,
        site_id: &str,
        collection_id: &str,
        item_id: &str,
        url: &str,
        is_draft: bool,
    ) -> Result<PendingItem> {
        let now = now_millis();
        let id = Uuid::new_v4().to_string();

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO pending_items (
                    id, site_id, collection_id, item_id, url, is_draft, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                 ON CONFLICT(site_id, item_id) DO UPDATE SET
                    collection_id = excluded.collection_id,
                    url = excluded.url,
                    is_draft = excluded.is_draft,
                    updated_at = excluded.updated_at",
                params![id, site_id, collection_id, item_id, url, is_draft, now],
            )?;
            let sql = format!(
                "SELECT {PENDING_COLUMNS} FROM pending_items WHERE site_id = ?1 AND item_id = ?2"
            );
            let item = tx.query_row(&sql, params![site_id, item_id], pending_from_row)?;
            tx.commit()?;
            Ok(item)
        })
    }

    /// Look up the pending row for (site, item)
    pub fn get_pending_item(&self, site_id: &str, item_id: &str) -> Result<Option<PendingItem>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PENDING_COLUMNS} FROM pending_items WHERE site_id = ?1 AND item_id = ?2"
            );
            Ok(conn
                .query_row(&sql, params![site_id, item_id], pending_from_row)
                .optional()?)
        })
    }

    /// All pending rows for a site, oldest first
    pub fn list_pending_items(&self, site_id: &str) -> Result<Vec<PendingItem>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PENDING_COLUMNS} FROM pending_items WHERE site_id = ?1 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([site_id], pending_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Published items of a site with no submission for the same (url, site)
    ///
    /// A submission matches the item's URL in the form
    /// [`crate::submit::absolute_url`] gives it: absolute URLs as tracked,
    /// paths placed on the site's domain.
    pub fn list_published_unsubmitted(&self, site_id: &str) -> Result<Vec<PendingItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.site_id, p.collection_id, p.item_id, p.url, p.is_draft,
                        p.created_at, p.updated_at
                 FROM pending_items p
                 LEFT JOIN sites st ON st.site_id = p.site_id
                 WHERE p.site_id = ?1
                   AND p.is_draft = 0
                   AND NOT EXISTS (
                       SELECT 1 FROM submissions s
                       WHERE s.site_id = p.site_id
                         AND s.url = CASE
                             WHEN substr(p.url, 1, 7) = 'http://'
                               OR substr(p.url, 1, 8) = 'https://' THEN p.url
                             ELSE 'https://' || st.site_name
                                  || CASE WHEN substr(p.url, 1, 1) = '/' THEN '' ELSE '/' END
                                  || p.url
                         END
                   )
                 ORDER BY p.created_at, p.rowid",
            )?;
            let rows = stmt
                .query_map([site_id], pending_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Flip a tracked item back to draft; returns whether a row matched
    pub fn mark_pending_draft(&self, site_id: &str, item_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE pending_items SET is_draft = 1, updated_at = ?1 WHERE site_id = ?2 AND item_id = ?3",
                params![now_millis(), site_id, item_id],
            )?;
            Ok(updated > 0)
        })
    }

    /// Remove the pending row for (site, item); returns whether a row was removed
    pub fn delete_pending_item(&self, site_id: &str, item_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM pending_items WHERE site_id = ?1 AND item_id = ?2",
                params![site_id, item_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Remove a pending row by id
    pub fn delete_pending_item_by_id(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM pending_items WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(Error::NotFound(format!("pending item {id}")));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewSubmission;

    #[test]
    fn test_upsert_keeps_one_row_per_item() {
        let store = Store::open_in_memory().unwrap();

        let first = store
            .upsert_pending_item("S1", "C1", "I1", "/blog/x", true)
            .unwrap();
        let second = store
            .upsert_pending_item("S1", "C1", "I1", "/blog/x-renamed", false)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.url, "/blog/x-renamed");
        assert!(!second.is_draft);
        assert_eq!(store.list_pending_items("S1").unwrap().len(), 1);
    }

    #[test]
    fn test_anti_join_excludes_submitted_and_drafts() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_pending_item("S1", "C1", "I1", "https://a.com/one", false)
            .unwrap();
        store
            .upsert_pending_item("S1", "C1", "I2", "https://a.com/two", false)
            .unwrap();
        store
            .upsert_pending_item("S1", "C1", "I3", "https://a.com/three", true)
            .unwrap();
        store
            .upsert_pending_item("S2", "C9", "I4", "https://b.com/four", false)
            .unwrap();

        store
            .insert_submission(NewSubmission {
                url: "https://a.com/two",
                site_id: "S1",
                collection_id: None,
                item_id: None,
            })
            .unwrap();

        let candidates = store.list_published_unsubmitted("S1").unwrap();
        let items: Vec<&str> = candidates.iter().map(|p| p.item_id.as_str()).collect();
        assert_eq!(items, vec!["I1"]);
    }

    #[test]
    fn test_anti_join_matches_absolutized_path() {
        let store = Store::open_in_memory().unwrap();
        let now = chrono::Utc::now();
        store
            .save_site(&crate::types::Site {
                site_id: "S1".into(),
                site_name: Some("a.com".into()),
                access_token: "t".into(),
                refresh_token: None,
                token_expires_at: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        store
            .upsert_pending_item("S1", "C1", "I1", "/blog/x", false)
            .unwrap();
        store
            .upsert_pending_item("S1", "C1", "I2", "blog/y", false)
            .unwrap();
        store
            .upsert_pending_item("S1", "C1", "I3", "http-caching-guide", false)
            .unwrap();

        for url in [
            "https://a.com/blog/x",
            "https://a.com/blog/y",
            "https://a.com/http-caching-guide",
        ] {
            store
                .insert_submission(NewSubmission {
                    url,
                    site_id: "S1",
                    collection_id: None,
                    item_id: None,
                })
                .unwrap();
        }

        assert!(store.list_published_unsubmitted("S1").unwrap().is_empty());
    }

    #[test]
    fn test_mark_draft_and_delete() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_pending_item("S1", "C1", "I1", "/blog/x", false)
            .unwrap();

        assert!(store.mark_pending_draft("S1", "I1").unwrap());
        assert!(store.get_pending_item("S1", "I1").unwrap().unwrap().is_draft);
        assert!(!store.mark_pending_draft("S1", "missing").unwrap());

        assert!(store.delete_pending_item("S1", "I1").unwrap());
        assert!(store.get_pending_item("S1", "I1").unwrap().is_none());
    }

    #[test]
    fn test_delete_by_id_missing_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = store.delete_pending_item_by_id("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
