//! Act Server - web front end of the act generator
//!
//! Serves the act form, folds posted changes into per-browser sessions and
//! hands the generated document out once.
//!
//! # Example
//!
//! ```rust,ignore
//! use act_server::{routes::router, AppState};
//!
//! let state = AppState::new(cache, Arc::new(renderer), Duration::from_secs(1800));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8501").await?;
//! axum::serve(listener, router(state)).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod page;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use form::FormSubmission;
pub use logging::LogFormat;
pub use page::{render_error_page, render_form, Notice, PageView};
pub use routes::router;
pub use session::{Session, SessionStore, SESSION_COOKIE};
pub use state::AppState;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
