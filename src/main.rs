//! indexflow - CMS publish events to IndexNow and Google Indexing
//!
//! CLI binary for submitting URLs, replaying webhook events and inspecting
//! submission history.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{Context, EventKind};

#[derive(Parser)]
#[command(name = "indexflow")]
#[command(about = "Relay CMS publish events to IndexNow and the Google Indexing API")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of styled text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging and progress output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a URL to every configured channel
    Submit {
        /// Absolute URL to submit
        url: String,

        /// Site the URL belongs to
        #[arg(long)]
        site: String,

        /// CMS collection the URL came from
        #[arg(long)]
        collection: Option<String>,

        /// CMS item the URL came from
        #[arg(long)]
        item: Option<String>,
    },

    /// Delete a submission and submit its URL again
    Resubmit {
        /// Submission id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List submissions, newest first
    List {
        /// Only submissions for this site
        #[arg(long)]
        site: Option<String>,

        /// Maximum number of submissions
        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// Number of submissions to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one submission
    Show {
        /// Submission id
        id: String,
    },

    /// Submission counts and success rates
    Stats {
        /// Only submissions for this site
        #[arg(long)]
        site: Option<String>,
    },

    /// Process a CMS webhook payload
    Event {
        /// Event type
        #[arg(value_enum)]
        kind: EventKind,

        /// JSON payload file, or `-` for stdin
        source: PathBuf,
    },

    /// Site registration
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Show channel configuration and database status
    Health,
}

#[derive(Subcommand)]
enum SiteAction {
    /// Register or update a site
    Add {
        /// CMS site id
        id: String,

        /// Public domain of the site, e.g. www.example.com
        #[arg(long)]
        name: String,

        /// OAuth access token
        #[arg(long)]
        token: String,

        /// OAuth refresh token
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// List registered sites
    List,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "indexflow=debug" } else { "indexflow=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> indexflow::error::Result<()> {
    let ctx = Context::open(cli.db, cli.json)?;

    match cli.command {
        Commands::Submit {
            url,
            site,
            collection,
            item,
        } => {
            cli::run_submit(&ctx, &url, &site, collection.as_deref(), item.as_deref()).await?;
        }
        Commands::Resubmit { id, yes } => {
            cli::run_resubmit(&ctx, &id, yes).await?;
        }
        Commands::List {
            site,
            limit,
            offset,
        } => {
            cli::run_list(&ctx, site.as_deref(), limit, offset)?;
        }
        Commands::Show { id } => {
            cli::run_show(&ctx, &id)?;
        }
        Commands::Stats { site } => {
            cli::run_stats(&ctx, site.as_deref())?;
        }
        Commands::Event { kind, source } => {
            cli::run_event(&ctx, kind, &source, cli.verbose).await?;
        }
        Commands::Site { action } => match action {
            SiteAction::Add {
                id,
                name,
                token,
                refresh_token,
            } => {
                cli::run_site_add(&ctx, &id, &name, &token, refresh_token.as_deref())?;
            }
            SiteAction::List => {
                cli::run_site_list(&ctx)?;
            }
        },
        Commands::Health => {
            cli::run_health(&ctx)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli).await {
        Ok(()) => Ok(()),
        Err(e) if json => {
            anstream::println!("{}", e.to_json_body());
            std::process::exit(if e.is_client_error() { 2 } else { 1 });
        }
        Err(e) => Err(e.into()),
    }
}
