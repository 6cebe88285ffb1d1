//! Human-readable terminal renderer.

use deck_common::Container;
use owo_colors::OwoColorize as _;

use crate::application::services::send_signal::{DeliveryOutcome, SignalReport};
use crate::domain::Credential;
use crate::output::OutputContext;

/// Renders results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("deck v{version}"));
    }

    pub fn render_profile(&self, credential: &Credential) {
        self.ctx.kv("User:", &credential.username);
        self.ctx.kv("Email:", &credential.email);
        self.ctx.kv(
            "Since:",
            &credential.issued_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
    }

    pub fn render_logout(&self, removed: bool) {
        if removed {
            self.ctx.success("Logged out");
        } else {
            self.ctx.info("Not logged in");
        }
    }

    /// Render the container table of `app`.
    pub fn render_containers(&self, app: &str, containers: &[Container]) {
        if self.ctx.quiet {
            return;
        }
        if containers.is_empty() {
            self.ctx.info(&format!("No container running for '{app}'"));
            return;
        }
        self.ctx.header(&format!("Containers of '{app}':"));
        let header = format_container_row("LABEL", "ID", "STATE", "CREATED");
        println!("  {}", header.style(self.ctx.styles.bold));
        for c in containers {
            let created = c
                .created_at
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
            println!(
                "  {}",
                format_container_row(&c.label, &c.id, c.state.as_str(), &created)
            );
        }
    }

    /// Render one notice per unmatched name and per delivery.
    ///
    /// Failed deliveries go to stderr and are shown even when `quiet`.
    pub fn render_signal_report(&self, report: &SignalReport) {
        for name in report.unmatched() {
            self.ctx.warn(&unmatched_notice(name));
        }
        for delivery in &report.deliveries {
            match &delivery.outcome {
                DeliveryOutcome::Sent => self
                    .ctx
                    .success(&sent_notice(&report.signal, &delivery.container.label)),
                DeliveryOutcome::Failed { reason } => self
                    .ctx
                    .error(&failed_notice(&delivery.container.label, reason)),
            }
        }
    }
}

fn format_container_row(label: &str, id: &str, state: &str, created: &str) -> String {
    format!("{label:<24} {id:<16} {state:<10} {created}")
}

#[must_use]
pub fn unmatched_notice(name: &str) -> String {
    format!("The name '{name}' did not match any container")
}

#[must_use]
pub fn sent_notice(signal: &str, label: &str) -> String {
    format!("Sent signal '{signal}' to '{label}' container.")
}

#[must_use]
pub fn failed_notice(label: &str, reason: &str) -> String {
    format!("Fail to send signal to container '{label}' because of: {reason}")
}
