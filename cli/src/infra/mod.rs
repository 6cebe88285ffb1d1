//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls to the control
//! plane, the attach socket, terminal mode switches, prompts, and the files
//! under `~/.deck`.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod api;
pub mod attach;
pub mod config;
pub mod credentials;
pub mod hijack;
pub mod prompt;
pub mod terminal;
