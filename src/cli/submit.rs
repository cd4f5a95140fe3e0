//! Submit and resubmit commands

use crate::cli::style::{arrow, check, cross, hyperlink_url, spinner, status_label, Stream, Stylize};
use crate::cli::{print_json, Context};
use anstream::println;
use dialoguer::Confirm;
use indexflow::error::{Error, Result};
use indexflow::store::NewSubmission;
use indexflow::submit::SubmissionResult;
use indexflow::types::{ChannelResult, ChannelStatus};

/// Run the submit command
pub async fn run_submit(
    ctx: &Context,
    url: &str,
    site_id: &str,
    collection_id: Option<&str>,
    item_id: Option<&str>,
) -> Result<()> {
    let orchestrator = ctx.orchestrator();
    if !ctx.json && !orchestrator.channels().any() {
        println!(
            "{}",
            "No channels configured; the submission will stay pending".warn().for_stdout()
        );
    }

    let pb = (!ctx.json).then(|| spinner(format!("Submitting {url}...")));
    let result = orchestrator
        .submit(NewSubmission {
            url,
            site_id,
            collection_id,
            item_id,
        })
        .await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let result = result?;

    if ctx.json {
        return print_json(&result);
    }
    print_result(&result);
    Ok(())
}

/// Run the resubmit command
///
/// Deletes the stored submission and submits its URL again, after
/// confirmation unless `yes` is set.
pub async fn run_resubmit(ctx: &Context, submission_id: &str, yes: bool) -> Result<()> {
    let orchestrator = ctx.orchestrator();
    let previous = orchestrator.get_submission(submission_id)?;

    if !yes {
        if ctx.json {
            return Err(Error::Validation(
                "resubmit needs --yes in --json mode".to_string(),
            ));
        }
        let prompt = format!(
            "Delete submission {} for {} and submit again?",
            previous.id, previous.url
        );
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("confirmation prompt failed: {e}")))?;
        if !confirmed {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
    }

    let pb = (!ctx.json).then(|| spinner(format!("Resubmitting {}...", previous.url)));
    let result = orchestrator.resubmit(submission_id).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let result = result?;

    if ctx.json {
        return print_json(&result);
    }
    print_result(&result);
    Ok(())
}

fn print_result(result: &SubmissionResult) {
    let marker = if result.success {
        check().to_string()
    } else {
        cross().for_stdout().to_string()
    };
    println!("{marker} {}", hyperlink_url(Stream::Stdout, &result.url));

    if result.existing {
        println!(
            "  {} {}",
            arrow(),
            "Already submitted; use `indexflow resubmit` to send it again".muted()
        );
    }
    print_channel("IndexNow", result.indexnow_status, result.indexnow.as_ref());
    print_channel("Google", result.google_status, result.google.as_ref());
    println!("  {} {}", "id".muted(), result.submission_id.accent());
}

fn print_channel(name: &str, status: ChannelStatus, result: Option<&ChannelResult>) {
    match result {
        Some(result) => println!(
            "  {name:<9} {}  {}",
            status_label(status),
            result.message().muted()
        ),
        None => println!(
            "  {name:<9} {}  {}",
            status_label(status),
            "skipped".muted()
        ),
    }
}
