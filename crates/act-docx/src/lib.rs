//! Act DOCX - template merge
//!
//! Fills a word-processing template with a [`RenderContext`] and returns
//! the generated document as bytes. The tag language is a small
//! docxtpl-compatible subset: plain placeholders, rich-text placeholders
//! and `for` loops at inline, paragraph and table-row level.
//!
//! # Example
//!
//! ```rust,ignore
//! use act_docx::{DocumentRenderer, RenderContext, RichText, TemplateRenderer};
//!
//! let context = RenderContext::new()
//!     .with("OBJECT", "School No 5")
//!     .with("FIRE", RichText::new("1. Detector missing in room 12"));
//!
//! let bytes = TemplateRenderer::new("template.docx").render(&context)?;
//! std::fs::write("act.docx", bytes)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod engine;
mod preprocess;

pub mod error;
pub mod template;
pub mod value;

pub use error::RenderError;
pub use template::{
    output_filename, DocumentRenderer, DocxTemplate, TemplateRenderer, DOCX_MIME, MAIN_PART,
};
pub use value::{RecordValue, RenderContext, RichText, TemplateValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
