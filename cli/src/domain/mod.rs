//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod attach;
pub mod config;
pub mod container;
pub mod credential;
pub mod error;

pub use attach::AttachTarget;
pub use config::DeckConfig;
pub use container::{FilterMatch, Resolution, resolve_targets, validate_signal_request};
pub use credential::{Credential, MAX_LOGIN_ATTEMPTS};
pub use error::{ApiError, ConfigError, SessionError, SignalError};
