//! Command implementations

pub mod login;
pub mod logout;
pub mod ps;
pub mod run;
pub mod send_signal;
pub mod version;
pub mod whoami;
