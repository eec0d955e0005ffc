//! Act Form - session input and submit workflow
//!
//! Everything between the reference snapshot and the document renderer:
//!
//! - **Fields**: stable identifiers for every form input
//! - **State**: per-session input folded from [`FormEvent`]s by [`apply`]
//! - **Resolver**: category-scoped signatory pick-lists
//! - **Aggregate**: numbered defect blocks per system
//! - **Context**: the placeholder map handed to the renderer
//! - **Workflow**: validation, render, one-shot download
//!
//! # Example
//!
//! ```rust,ignore
//! use act_form::{apply, FormEvent, SessionInput, TextField, Workflow};
//!
//! let mut input = SessionInput::new(&snapshot);
//! input = apply(
//!     input,
//!     FormEvent::TextChanged { field: TextField::ObjectName, value: "School".into() },
//!     &snapshot,
//! )?;
//!
//! let mut workflow = Workflow::new();
//! let artifact = workflow.submit(&input, &snapshot, &renderer, today)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aggregate;
pub mod context;
pub mod error;
pub mod fields;
pub mod resolver;
pub mod state;
pub mod workflow;

pub use aggregate::{aggregate, DefectBlock, NO_DEFECTS};
pub use context::{build_context, placeholder, OVERSIGHT_LIST};
pub use error::{FormError, ValidationError};
pub use fields::{custom_field, defects_field, CommitteeRole, TextField};
pub use resolver::{Choice, Selection, SignatoryResolver, MANUAL_ENTRY};
pub use state::{
    apply, live_oversight, ordered_selection, FormEvent, RoleFields, SessionInput, SystemInput,
    MAX_OVERSIGHT,
};
pub use workflow::{allowed_transitions, validate_transition, Artifact, Workflow, WorkflowState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
