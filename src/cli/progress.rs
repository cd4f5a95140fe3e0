//! Shared CLI progress callback with styled output

use crate::cli::style::{check, cross, hyperlink_url, status_label, Stream, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indexflow::error::Error;
use indexflow::submit::{Phase, ProgressCallback, SubmissionResult};
use indexflow::types::PendingItem;

/// CLI progress callback that prints to stdout with styled output
///
/// Two modes:
/// - verbose: shows all phases and per-channel detail
/// - compact: one line per submitted item
pub struct CliProgress {
    /// Verbose mode shows all phases and detailed output
    pub verbose: bool,
}

impl CliProgress {
    /// Create verbose progress
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    /// Create compact progress
    pub const fn compact() -> Self {
        Self { verbose: false }
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Collecting => "Collecting published items",
        Phase::Submitting => "Submitting",
        Phase::Complete => "Done",
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        if self.verbose {
            println!("{}...", phase_label(phase).emphasis());
        } else if phase == Phase::Submitting {
            println!("  {}...", phase_label(phase).muted());
        }
    }

    async fn on_item_submitted(&self, item: &PendingItem, result: &SubmissionResult) {
        let marker = if result.success {
            check().to_string()
        } else {
            cross().for_stdout().to_string()
        };
        let existing = if result.existing {
            format!(" {}", "(already submitted)".muted())
        } else {
            String::new()
        };

        println!(
            "  {marker} {}{existing}",
            hyperlink_url(Stream::Stdout, &result.url)
        );
        if self.verbose {
            println!(
                "    {} {}  IndexNow: {}  Google: {}",
                "item".muted(),
                item.item_id.accent(),
                status_label(result.indexnow_status),
                status_label(result.google_status)
            );
        }
    }

    async fn on_error(&self, err: &Error) {
        if self.verbose {
            eprintln!("{}: {}", "error".error(), err);
        } else {
            eprintln!("    {}: {}", "error".error(), err);
        }
    }

    async fn on_message(&self, message: &str) {
        if self.verbose {
            println!("{message}");
        } else {
            println!("  {}", message.muted());
        }
    }
}
