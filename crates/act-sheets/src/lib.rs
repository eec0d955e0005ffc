//! Act Sheets - reference data loader
//!
//! Pulls the reference tables behind the act form out of a remote
//! spreadsheet and keeps one process-wide snapshot of them.
//!
//! # Architecture
//!
//! ```text
//! Google Sheets ──► GoogleSheetsSource ─┐
//!                                        ├─► ReferenceLoader ──► ReferenceSnapshot
//! fixtures ──────► MemorySpreadsheet ───┘          ▲
//!                                                  │ (TTL, coalesced loads)
//!                                            ReferenceCache
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use act_sheets::{GoogleSheetsSource, ReferenceCache, ReferenceLoader, Secrets, DEFAULT_TTL};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secrets = Secrets::from_path("secrets.toml")?;
//! let source = GoogleSheetsSource::from_secrets(secrets);
//! let cache = ReferenceCache::new(ReferenceLoader::new(Arc::new(source)), DEFAULT_TTL);
//!
//! let snapshot = cache.get().await?;
//! println!("{} systems", snapshot.system_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod google;
pub mod loader;
pub mod source;

pub use cache::{ReferenceCache, SnapshotResult, DEFAULT_TTL};
pub use error::{ConnectionError, SecretsError};
pub use google::{GoogleSheetsSource, Secrets, ServiceAccountKey};
pub use loader::{ReferenceLoader, SheetLayout};
pub use source::{find_worksheet, MemorySpreadsheet, Rows, SpreadsheetSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
