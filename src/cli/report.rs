//! Read-only commands: list, show, stats

use crate::cli::style::{bullet, hyperlink_url, status_label, Stream, Stylize};
use crate::cli::{print_json, Context};
use anstream::println;
use indexflow::error::Result;
use indexflow::types::{ChannelKind, Submission};

/// Run the list command
pub fn run_list(ctx: &Context, site_id: Option<&str>, limit: u32, offset: u32) -> Result<()> {
    let submissions = ctx.reporting().list_submissions(site_id, limit, offset)?;

    if ctx.json {
        return print_json(&submissions);
    }
    if submissions.is_empty() {
        println!("{}", "No submissions".muted());
        return Ok(());
    }

    for submission in &submissions {
        println!(
            "{} {}  {}",
            bullet(),
            hyperlink_url(Stream::Stdout, &submission.url),
            submission
                .created_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .muted()
        );
        println!(
            "    IndexNow: {}  Google: {}  {}",
            status_label(submission.indexnow_status),
            status_label(submission.google_status),
            submission.id.muted()
        );
    }
    Ok(())
}

/// Run the show command
pub fn run_show(ctx: &Context, submission_id: &str) -> Result<()> {
    let submission = ctx.reporting().get_submission(submission_id)?;

    if ctx.json {
        return print_json(&submission);
    }
    print_submission(&submission);
    Ok(())
}

fn print_submission(submission: &Submission) {
    println!("{}", hyperlink_url(Stream::Stdout, &submission.url).emphasis());
    println!("  {:<11} {}", "id".muted(), submission.id.accent());
    println!("  {:<11} {}", "site".muted(), submission.site_id);
    if let Some(collection) = &submission.collection_id {
        println!("  {:<11} {collection}", "collection".muted());
    }
    if let Some(item) = &submission.item_id {
        println!("  {:<11} {item}", "item".muted());
    }
    println!("  {:<11} {}", "created".muted(), submission.created_at.to_rfc3339());
    println!("  {:<11} {}", "updated".muted(), submission.updated_at.to_rfc3339());

    for kind in [ChannelKind::IndexNow, ChannelKind::Google] {
        let detail = submission
            .result(kind)
            .map(|r| r.message().to_string())
            .unwrap_or_default();
        println!(
            "  {:<11} {}  {}",
            kind.to_string().muted(),
            status_label(submission.status(kind)),
            detail.muted()
        );
    }
}

/// Run the stats command
pub fn run_stats(ctx: &Context, site_id: Option<&str>) -> Result<()> {
    let stats = ctx.reporting().stats(site_id)?;

    if ctx.json {
        return print_json(&stats);
    }

    let scope = site_id.map_or_else(|| "all sites".to_string(), |s| format!("site {s}"));
    println!("{} ({})", "Submissions".emphasis(), scope.muted());
    println!("  {:<9} {}", "total", stats.total.accent());
    println!(
        "  {:<9} {} ({}%)",
        "IndexNow",
        stats.indexnow_success.success(),
        stats.indexnow_rate
    );
    println!(
        "  {:<9} {} ({}%)",
        "Google",
        stats.google_success.success(),
        stats.google_rate
    );
    Ok(())
}
