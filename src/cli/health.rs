//! Health command - channel configuration and database status

use crate::cli::style::{check, Stylize};
use crate::cli::{print_json, Context};
use anstream::println;
use indexflow::config::ChannelAvailability;
use indexflow::error::Result;
use indexflow::store::SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    database: String,
    schema_version: &'static str,
    sites: usize,
    channels: ChannelAvailability,
}

/// Run the health command
pub fn run_health(ctx: &Context) -> Result<()> {
    let health = Health {
        status: "ok",
        database: ctx.config.database_path.display().to_string(),
        schema_version: SCHEMA_VERSION,
        sites: ctx.store.list_sites()?.len(),
        channels: ctx.config.channel_availability(),
    };

    if ctx.json {
        return print_json(&health);
    }

    println!("{} {}", check(), "indexflow is healthy".emphasis());
    println!("  {:<9} {}", "database".muted(), health.database);
    println!("  {:<9} {}", "schema".muted(), health.schema_version);
    println!("  {:<9} {}", "sites".muted(), health.sites.accent());
    for (name, configured) in [
        ("IndexNow", health.channels.indexnow_configured),
        ("Google", health.channels.google_configured),
    ] {
        let state = if configured {
            "configured".success().to_string()
        } else {
            "not configured".warn().for_stdout().to_string()
        };
        println!("  {name:<9} {state}");
    }
    Ok(())
}
