//! Site commands - register sites the way the OAuth callback does

use crate::cli::style::{bullet, check, Stylize};
use crate::cli::{print_json, Context};
use anstream::println;
use chrono::Utc;
use indexflow::error::{Error, Result};
use indexflow::types::Site;
use serde::Serialize;

/// Listing entry; tokens are never printed
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteSummary<'a> {
    site_id: &'a str,
    site_name: Option<&'a str>,
    token_expires_at: Option<String>,
    created_at: String,
}

/// Run the site add command
pub fn run_site_add(
    ctx: &Context,
    site_id: &str,
    name: &str,
    token: &str,
    refresh_token: Option<&str>,
) -> Result<()> {
    if site_id.trim().is_empty() || token.trim().is_empty() {
        return Err(Error::Validation("site id and token are required".to_string()));
    }

    let now = Utc::now();
    let created_at = ctx
        .store
        .get_site(site_id)?
        .map_or(now, |existing| existing.created_at);
    let site = Site {
        site_id: site_id.to_string(),
        site_name: Some(name.to_string()).filter(|n| !n.is_empty()),
        access_token: token.to_string(),
        refresh_token: refresh_token.map(ToString::to_string),
        token_expires_at: None,
        created_at,
        updated_at: now,
    };
    ctx.store.save_site(&site)?;

    if ctx.json {
        return print_json(&summary(&site));
    }
    println!("{} Registered site {} ({})", check(), site_id.accent(), name);
    Ok(())
}

/// Run the site list command
pub fn run_site_list(ctx: &Context) -> Result<()> {
    let sites = ctx.store.list_sites()?;

    if ctx.json {
        let summaries: Vec<_> = sites.iter().map(summary).collect();
        return print_json(&summaries);
    }
    if sites.is_empty() {
        println!("{}", "No sites registered".muted());
        return Ok(());
    }
    for site in &sites {
        println!(
            "{} {}  {}",
            bullet(),
            site.site_id.accent(),
            site.site_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn summary(site: &Site) -> SiteSummary<'_> {
    SiteSummary {
        site_id: &site.site_id,
        site_name: site.site_name.as_deref(),
        token_expires_at: site.token_expires_at.map(|t| t.to_rfc3339()),
        created_at: site.created_at.to_rfc3339(),
    }
}
