#![cfg_attr(test, allow(clippy::expect_used))]

pub mod types;

pub use types::*;
