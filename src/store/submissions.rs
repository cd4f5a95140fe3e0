//! Submission repository

use super::{from_millis, now_millis, Store};
use crate::error::{Error, Result};
use crate::types::{ChannelKind, ChannelResult, ChannelStatus, Submission, SubmissionStats};
use rusqlite::{ffi, params, OptionalExtension, Row};
use uuid::Uuid;

const SUBMISSION_COLUMNS: &str = "id, url, site_id, collection_id, item_id, \
     indexnow_status, indexnow_response, google_status, google_response, created_at, updated_at";

/// Fields needed to create a submission row
#[derive(Debug, Clone, Copy)]
pub struct NewSubmission<'a> {
    /// Absolute URL
    pub url: &'a str,
    /// CMS site identifier
    pub site_id: &'a str,
    /// CMS collection, if known
    pub collection_id: Option<&'a str>,
    /// CMS item, if known
    pub item_id: Option<&'a str>,
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        url: row.get(1)?,
        site_id: row.get(2)?,
        collection_id: row.get(3)?,
        item_id: row.get(4)?,
        indexnow_status: row.get(5)?,
        indexnow_response: row.get(6)?,
        google_status: row.get(7)?,
        google_response: row.get(8)?,
        created_at: from_millis(row.get(9)?),
        updated_at: from_millis(row.get(10)?),
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl Store {
    /// Insert a submission with both channel statuses `pending`
    ///
    /// Fails with [`Error::Conflict`] when a row for the same (url, site) exists.
    pub fn insert_submission(&self, new: NewSubmission<'_>) -> Result<Submission> {
        let id = Uuid::new_v4().to_string();
        let now = now_millis();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO submissions (
                    id, url, site_id, collection_id, item_id,
                    indexnow_status, google_status, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    new.url,
                    new.site_id,
                    new.collection_id,
                    new.item_id,
                    ChannelStatus::Pending,
                    ChannelStatus::Pending,
                    now,
                    now,
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::Conflict {
                        url: new.url.to_string(),
                        site_id: new.site_id.to_string(),
                    }
                } else {
                    Error::Database(e)
                }
            })?;
            Ok(())
        })?;

        Ok(Submission {
            id,
            url: new.url.to_string(),
            site_id: new.site_id.to_string(),
            collection_id: new.collection_id.map(ToString::to_string),
            item_id: new.item_id.map(ToString::to_string),
            indexnow_status: ChannelStatus::Pending,
            indexnow_response: None,
            google_status: ChannelStatus::Pending,
            google_response: None,
            created_at: from_millis(now),
            updated_at: from_millis(now),
        })
    }

    /// Look up the submission for a (url, site) pair
    pub fn find_submission(&self, url: &str, site_id: &str) -> Result<Option<Submission>> {
        self.with_conn(|conn| {
            let sql =
                format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE url = ?1 AND site_id = ?2");
            Ok(conn
                .query_row(&sql, params![url, site_id], submission_from_row)
                .optional()?)
        })
    }

    /// Look up a submission by id
    pub fn get_submission(&self, id: &str) -> Result<Option<Submission>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], submission_from_row).optional()?)
        })
    }

    /// Persist one channel's outcome on a submission
    pub fn record_channel_result(
        &self,
        id: &str,
        channel: ChannelKind,
        result: &ChannelResult,
    ) -> Result<()> {
        let response = serde_json::to_string(result)?;
        let sql = match channel {
            ChannelKind::IndexNow => {
                "UPDATE submissions SET indexnow_status = ?1, indexnow_response = ?2, updated_at = ?3 WHERE id = ?4"
            }
            ChannelKind::Google => {
                "UPDATE submissions SET google_status = ?1, google_response = ?2, updated_at = ?3 WHERE id = ?4"
            }
        };

        self.with_conn(|conn| {
            let updated = conn.execute(sql, params![result.status(), response, now_millis(), id])?;
            if updated == 0 {
                return Err(Error::NotFound(format!("submission {id}")));
            }
            Ok(())
        })
    }

    /// Force both channel statuses to `failed`
    pub fn mark_submission_failed(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE submissions SET indexnow_status = ?1, google_status = ?1, updated_at = ?2 WHERE id = ?3",
                params![ChannelStatus::Failed, now_millis(), id],
            )?;
            Ok(())
        })
    }

    /// Delete a submission; returns whether a row was removed
    pub fn delete_submission(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM submissions WHERE id = ?1", [id])? > 0))
    }

    /// Submissions newest first, optionally for one site
    pub fn list_submissions(
        &self,
        site_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Submission>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions
                 WHERE (?1 IS NULL OR site_id = ?1)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![site_id, limit, offset], submission_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Total and per-channel success counts, optionally for one site
    pub fn submission_stats(&self, site_id: Option<&str>) -> Result<SubmissionStats> {
        let (total, indexnow_success, google_success) = self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN indexnow_status = 'success' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN google_status = 'success' THEN 1 ELSE 0 END), 0)
                 FROM submissions
                 WHERE (?1 IS NULL OR site_id = ?1)",
                params![site_id],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?, row.get::<_, u64>(2)?)),
            )?)
        })?;

        Ok(SubmissionStats::from_counts(total, indexnow_success, google_success))
    }
}
