//! indexflow - CMS publish events to IndexNow and Google Indexing
//!
//! Tracks CMS items through change events and, when a site is published,
//! submits every newly published URL to the configured discovery channels,
//! recording each channel's outcome once per (url, site).
//!
//! ```no_run
//! use indexflow::channel::create_channels;
//! use indexflow::config::Config;
//! use indexflow::store::{NewSubmission, Store};
//! use indexflow::submit::Orchestrator;
//!
//! # async fn run() -> indexflow::error::Result<()> {
//! let config = Config::from_env();
//! let store = Store::open(&config.database_path)?;
//! let orchestrator = Orchestrator::new(store, create_channels(&config));
//!
//! let result = orchestrator
//!     .submit(NewSubmission {
//!         url: "https://www.example.com/blog/hello",
//!         site_id: "site-1",
//!         collection_id: None,
//!         item_id: None,
//!     })
//!     .await?;
//! println!("{} -> {}", result.url, result.success);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod store;
pub mod submit;
pub mod types;
