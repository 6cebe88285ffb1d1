//! Container name resolution for out-of-band process control.
//!
//! Pure functions only: the container list is a snapshot supplied by the
//! caller and nothing here is cached.

use std::collections::BTreeMap;

use anyhow::Result;
use deck_common::Container;
use serde::Serialize;

use crate::domain::error::SignalError;

/// Containers matched by one user-supplied name filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterMatch {
    pub filter: String,
    pub container_ids: Vec<String>,
}

impl FilterMatch {
    /// `true` when the filter did not match any container.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.container_ids.is_empty()
    }
}

/// Outcome of resolving every filter against one container snapshot.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One entry per filter, in caller-supplied order.
    pub matches: Vec<FilterMatch>,
    /// Distinct containers to signal, keyed by container ID.
    pub targets: BTreeMap<String, Container>,
}

/// Checks the preconditions of a signal dispatch and returns the trimmed
/// signal name.
///
/// # Errors
///
/// Returns [`SignalError::NoContainerNames`] when `names` is empty and
/// [`SignalError::EmptySignal`] when `signal` is blank.
pub fn validate_signal_request(signal: &str, names: &[String]) -> Result<String> {
    if names.is_empty() {
        return Err(SignalError::NoContainerNames.into());
    }
    let signal = signal.trim();
    if signal.is_empty() {
        return Err(SignalError::EmptySignal.into());
    }
    Ok(signal.to_string())
}

/// Matches each filter against container labels (exact match).
///
/// A container matched by several filters, or by the same filter given
/// twice, appears once in `targets`.
#[must_use]
pub fn resolve_targets(containers: &[Container], filters: &[String]) -> Resolution {
    let mut resolution = Resolution::default();

    for filter in filters {
        let mut container_ids = Vec::new();
        for container in containers.iter().filter(|c| &c.label == filter) {
            container_ids.push(container.id.clone());
            resolution
                .targets
                .insert(container.id.clone(), container.clone());
        }
        resolution.matches.push(FilterMatch {
            filter: filter.clone(),
            container_ids,
        });
    }

    resolution
}
