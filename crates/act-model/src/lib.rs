//! Act Model - typed reference records
//!
//! The spreadsheet behind the act generator hands out loosely-typed rows.
//! This crate turns them into explicit records, each validated once at load
//! time with a defined fallback for every optional column:
//!
//! - [`System`] keyed by a [`SystemCode`] usable as a template placeholder
//! - [`Licensee`] boilerplate by short name
//! - [`Signatory`] with a parsed [`SignatoryCategory`]
//! - [`Defect`] catalog entries, one catalog per system
//!
//! Everything loaded in one refresh cycle is bundled in an immutable
//! [`ReferenceSnapshot`].
//!
//! # Example
//!
//! ```rust
//! use act_model::{Record, ReferenceSnapshot, System, SystemCode};
//!
//! let code = SystemCode::parse("FIRE").unwrap();
//! let snapshot = ReferenceSnapshot::builder()
//!     .system(System::new("Пожежна сигналізація", code.clone()))
//!     .build();
//!
//! assert!(snapshot.defects(&code).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod record;
pub mod snapshot;
pub mod types;

pub use error::ModelError;
pub use record::Record;
pub use snapshot::{ReferenceSnapshot, SnapshotBuilder};
pub use types::{Defect, Licensee, Signatory, SignatoryCategory, System, SystemCode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
