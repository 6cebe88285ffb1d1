//! `stty`-backed implementation of the `TerminalControl` port.

use std::process::{Command, Stdio};

use anyhow::Result;

use crate::application::ports::TerminalControl;
use crate::domain::SessionError;

/// Switches the controlling terminal with the system `stty`.
pub struct SttyTerminal;

impl TerminalControl for SttyTerminal {
    fn enter_raw(&self) -> Result<()> {
        run_stty(&["-echo", "raw"], Stdio::inherit())
    }

    fn restore(&self) -> Result<()> {
        // stdin may already be closed or redirected at this point; the tty is
        // still reachable through the output descriptors.
        run_stty(&["echo", "cooked"], output_tty()?)
    }
}

fn run_stty(args: &[&str], stdin: Stdio) -> Result<()> {
    let status = Command::new("stty")
        .args(args)
        .stdin(stdin)
        .status()
        .map_err(SessionError::RawMode)?;
    if status.success() {
        Ok(())
    } else {
        Err(SessionError::RawMode(std::io::Error::other(format!(
            "stty {} exited with {status}",
            args.join(" ")
        )))
        .into())
    }
}

#[cfg(unix)]
fn output_tty() -> Result<Stdio> {
    use std::io::IsTerminal;
    use std::os::fd::AsFd;

    let fd = if std::io::stdout().is_terminal() {
        std::io::stdout().as_fd().try_clone_to_owned()
    } else {
        std::io::stderr().as_fd().try_clone_to_owned()
    };
    Ok(Stdio::from(fd.map_err(SessionError::RawMode)?))
}

#[cfg(not(unix))]
fn output_tty() -> Result<Stdio> {
    Ok(Stdio::inherit())
}
