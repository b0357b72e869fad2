//! HTTP front end of Yatube.
//!
//! [`routing::router`] lays out every page on top of an [`AppState`] and an
//! [`Identity`]; [`routing::service`] adds request logging and the error
//! pages. The binary wires them to a cookie session, tests to their own
//! identity.

pub mod access;
pub mod config;
pub mod error;
pub mod identity;
pub mod routing;
pub mod state;
pub mod templates;
pub mod urls;
pub mod views;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use identity::{Authenticate, Identity, SessionIdentity, Viewer, session_handler};
pub use routing::{router, service};
pub use state::AppState;
