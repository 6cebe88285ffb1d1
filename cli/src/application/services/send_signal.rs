//! Application service: out-of-band signal dispatch use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Outcomes are returned as data; rendering is left to the command layer.

use anyhow::{Context, Result};
use deck_common::Container;
use futures_util::future::join_all;
use serde::Serialize;

use crate::application::ports::ContainersApi;
use crate::domain::error::root_cause;
use crate::domain::{FilterMatch, Resolution, resolve_targets, validate_signal_request};

/// Result of delivering the signal to one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    /// Delivery failed; `reason` is the root cause of the error.
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub container: Container,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

/// Everything that happened during one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub signal: String,
    /// One entry per requested name, in the order given.
    pub matches: Vec<FilterMatch>,
    /// One entry per distinct container, ordered by container ID.
    pub deliveries: Vec<Delivery>,
}

impl SignalReport {
    /// Names that matched no container.
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|m| m.is_unmatched())
            .map(|m| m.filter.as_str())
    }

    /// `true` when no name matched anything, so nothing was sent.
    #[must_use]
    pub fn nothing_matched(&self) -> bool {
        self.deliveries.is_empty()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.outcome, DeliveryOutcome::Failed { .. }))
            .count()
    }
}

/// Send `signal` to every live container of `app` whose label equals one of
/// `names`.
///
/// Each matched container is signalled exactly once. A failed delivery is
/// recorded and does not stop deliveries to the other containers.
///
/// # Errors
///
/// - `InvalidArgument`-class [`crate::domain::SignalError`] when `names` is
///   empty or `signal` is blank
/// - the listing error if the containers cannot be fetched
pub async fn send_signal(
    api: &impl ContainersApi,
    app: &str,
    signal: &str,
    names: &[String],
) -> Result<SignalReport> {
    let signal = validate_signal_request(signal, names)?;

    let containers = api.list_containers(app).await.context(
        "fail to list the application containers to get the ID of the container to send the signal",
    )?;

    let Resolution { matches, targets } = resolve_targets(&containers, names);
    tracing::debug!(
        app,
        signal = %signal,
        targets = targets.len(),
        "resolved containers to signal"
    );

    let deliveries = join_all(targets.into_values().map(|container| {
        let signal = signal.as_str();
        async move {
            let outcome = match api
                .send_container_signal(app, signal, &container.id)
                .await
            {
                Ok(()) => DeliveryOutcome::Sent,
                Err(e) => {
                    tracing::debug!(
                        container = %container.id,
                        error = %format!("{e:#}"),
                        "signal delivery failed"
                    );
                    DeliveryOutcome::Failed {
                        reason: root_cause(&e),
                    }
                }
            };
            Delivery { container, outcome }
        }
    }))
    .await;

    Ok(SignalReport {
        signal,
        matches,
        deliveries,
    })
}
