//! Scoped raw mode for the controlling terminal.
//!
//! Terminal mode is process-wide state, so only one guard may be alive at a
//! time; acquiring a second one fails with `TerminalBusy`.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::application::ports::TerminalControl;
use crate::domain::SessionError;

static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Holds the terminal in raw mode; restores it when dropped.
///
/// Restoration runs on every exit path of the owning scope, including early
/// returns and unwinding. A failed restore is logged, never propagated.
pub struct RawModeGuard<'a, T: TerminalControl + ?Sized> {
    terminal: &'a T,
}

impl<'a, T: TerminalControl + ?Sized> RawModeGuard<'a, T> {
    /// Switch the terminal to raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TerminalBusy`] if another guard is alive, or
    /// the terminal's error if the mode switch fails (nothing is restored in
    /// that case).
    pub fn acquire(terminal: &'a T) -> Result<Self> {
        if RAW_MODE_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::TerminalBusy.into());
        }
        if let Err(e) = terminal.enter_raw() {
            RAW_MODE_ACTIVE.store(false, Ordering::Release);
            return Err(e);
        }
        tracing::debug!("terminal switched to raw mode");
        Ok(Self { terminal })
    }
}

impl<T: TerminalControl + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.restore() {
            tracing::warn!(error = %format!("{e:#}"), "fail to restore terminal mode");
        }
        RAW_MODE_ACTIVE.store(false, Ordering::Release);
    }
}
