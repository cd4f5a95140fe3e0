//! Event command - feed a CMS webhook payload through the engine

use crate::cli::progress::CliProgress;
use crate::cli::style::{check, Stylize};
use crate::cli::{print_json, Context};
use anstream::println;
use indexflow::error::Result;
use indexflow::submit::{
    EventOutcome, ItemChanged, ItemUnpublished, NoopProgress, ProgressCallback, SitePublished,
};
use std::io::Read;
use std::path::Path;

/// Webhook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventKind {
    /// CMS item created or updated
    ItemChanged,
    /// Site published
    SitePublish,
    /// CMS item unpublished
    ItemUnpublished,
}

fn read_payload(source: &Path) -> Result<String> {
    if source.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

/// Run the event command
///
/// `source` is a JSON file, or `-` for stdin.
pub async fn run_event(ctx: &Context, kind: EventKind, source: &Path, verbose: bool) -> Result<()> {
    let body = read_payload(source)?;
    let handler = ctx.event_handler();

    let outcome = match kind {
        EventKind::ItemChanged => {
            let event: ItemChanged = serde_json::from_str(&body)?;
            handler.handle_item_changed(&event)?
        }
        EventKind::SitePublish => {
            let event: SitePublished = serde_json::from_str(&body)?;
            let progress: Box<dyn ProgressCallback> = if ctx.json {
                Box::new(NoopProgress)
            } else if verbose {
                Box::new(CliProgress::verbose())
            } else {
                Box::new(CliProgress::compact())
            };
            handler.handle_site_published(&event, progress.as_ref()).await?
        }
        EventKind::ItemUnpublished => {
            let event: ItemUnpublished = serde_json::from_str(&body)?;
            handler.handle_item_unpublished(&event)?
        }
    };

    if ctx.json {
        return print_json(&outcome);
    }
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Ignored { reason } => {
            println!("{} {}", "Ignored:".warn().for_stdout(), reason);
        }
        EventOutcome::Tracked { item } => {
            let state = if item.is_draft { "draft" } else { "published" };
            println!(
                "{} Tracked {} at {} ({})",
                check(),
                item.item_id.accent(),
                item.url,
                state.muted()
            );
        }
        EventOutcome::Published(report) => {
            println!(
                "{} Site {} published: {} submitted, {} failed",
                check(),
                report.site_id.accent(),
                report.submissions.len().success(),
                report.failures.len()
            );
        }
        EventOutcome::Unpublished {
            item_id, tracked, ..
        } => {
            if *tracked {
                println!("{} Item {} marked as draft", check(), item_id.accent());
            } else {
                println!("{} Item {} is not tracked", "-".muted(), item_id.accent());
            }
        }
    }
}
