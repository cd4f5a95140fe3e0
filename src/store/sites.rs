//! Site credential repository
//!
//! Written by the OAuth side; the submission core only reads from it.

use super::{from_millis, to_millis, Store};
use crate::error::Result;
use crate::types::Site;
use rusqlite::{params, OptionalExtension, Row};

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        site_id: row.get(0)?,
        site_name: row.get(1)?,
        access_token: row.get(2)?,
        refresh_token: row.get(3)?,
        token_expires_at: row.get::<_, Option<i64>>(4)?.map(from_millis),
        created_at: from_millis(row.get(5)?),
        updated_at: from_millis(row.get(6)?),
    })
}

impl Store {
    /// Insert or update a site's credentials
    pub fn save_site(&self, site: &Site) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sites (
                    site_id, site_name, access_token, refresh_token, token_expires_at,
                    created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(site_id) DO UPDATE SET
                    site_name = excluded.site_name,
                    access_token = excluded.access_token,
                    refresh_token = excluded.refresh_token,
                    token_expires_at = excluded.token_expires_at,
                    updated_at = excluded.updated_at",
                params![
                    site.site_id,
                    site.site_name,
                    site.access_token,
                    site.refresh_token,
                    site.token_expires_at.map(to_millis),
                    to_millis(site.created_at),
                    to_millis(site.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    /// Look up a registered site
    pub fn get_site(&self, site_id: &str) -> Result<Option<Site>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT site_id, site_name, access_token, refresh_token, token_expires_at,
                            created_at, updated_at
                     FROM sites WHERE site_id = ?1",
                    [site_id],
                    site_from_row,
                )
                .optional()?)
        })
    }

    /// All registered sites, oldest first
    pub fn list_sites(&self) -> Result<Vec<Site>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT site_id, site_name, access_token, refresh_token, token_expires_at,
                        created_at, updated_at
                 FROM sites ORDER BY created_at, site_id",
            )?;
            let rows = stmt
                .query_map([], site_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
