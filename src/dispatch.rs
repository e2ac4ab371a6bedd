//! Command dispatch over a resolved target set.

use futures::future::join_all;
use log::{debug, warn};

use crate::client::Device;
use crate::errors::Error;
use crate::selector::TargetSet;
use crate::types::{ColorName, PowerLevel};

/// A command together with its acknowledgment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: Command,
    /// Fire-and-forget: do not wait for per-device acknowledgments.
    pub rapid: bool,
}

/// The operation to apply to every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Render each target for display
    List,
    /// Set the power state
    Power(PowerLevel),
    /// Set the color
    Color(ColorName),
}

/// One device's failure inside a batch.
#[derive(Debug)]
pub struct DeviceFailure {
    pub address: String,
    pub error: Error,
}

/// Aggregate result of a set command over a batch.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Number of devices the operation was issued to.
    pub attempted: usize,
    /// Per-device failures, empty in rapid mode by contract.
    pub failures: Vec<DeviceFailure>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a dispatch produced.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Rendered lines from the list command, in selection order.
    Listing(Vec<String>),
    /// Aggregate of a set command.
    Applied(ApplyReport),
}

/// Apply `request` to every device in `targets`.
///
/// Set operations are issued concurrently, so the aggregate latency of an
/// acknowledged batch is bounded by the slowest device rather than the sum.
/// Selection order is deterministic; the order devices complete in is not.
///
/// In rapid mode, per-device failures are deliberately unobserved: the batch
/// reports zero failures whether or not every device honored the command,
/// trading certainty for throughput. In acknowledged mode, one device's
/// timeout or failure is recorded and never aborts the rest of the batch.
///
/// An empty target set is a no-op, not an error.
pub async fn dispatch<D: Device>(request: &CommandRequest, targets: &TargetSet<D>) -> DispatchOutcome {
    match request.command {
        Command::List => DispatchOutcome::Listing(targets.iter().map(D::render).collect()),
        Command::Power(level) => {
            debug!(
                "setting power {} on {} devices (rapid: {})",
                level,
                targets.len(),
                request.rapid
            );
            let results = join_all(targets.iter().map(|device| async move {
                let result = device.set_power(level, request.rapid).await;
                (device.address().to_string(), result)
            }))
            .await;
            DispatchOutcome::Applied(collect(targets.len(), request.rapid, results))
        }
        Command::Color(color) => {
            debug!(
                "setting color {} on {} devices (rapid: {})",
                color,
                targets.len(),
                request.rapid
            );
            let results = join_all(targets.iter().map(|device| async move {
                let result = device.set_color(color, request.rapid).await;
                (device.address().to_string(), result)
            }))
            .await;
            DispatchOutcome::Applied(collect(targets.len(), request.rapid, results))
        }
    }
}

fn collect(
    attempted: usize,
    rapid: bool,
    results: Vec<(String, Result<(), Error>)>,
) -> ApplyReport {
    let mut report = ApplyReport {
        attempted,
        failures: Vec::new(),
    };
    for (address, result) in results {
        match result {
            Ok(()) => {}
            Err(error) if rapid => {
                // Contract says clients never surface rapid failures; drop
                // any that slip through rather than breaking the batch shape.
                debug!("ignoring rapid-mode failure from {address}: {error}");
            }
            Err(error) => {
                warn!("{address}: {error}");
                report.failures.push(DeviceFailure { address, error });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{SelectionIntent, resolve};
    use crate::sim::{SimBehavior, SimLan, SimSpec};

    fn request(command: Command, rapid: bool) -> CommandRequest {
        CommandRequest { command, rapid }
    }

    async fn all_targets(lan: &SimLan) -> TargetSet<crate::sim::SimDevice> {
        resolve(&SelectionIntent::All, lan).await.unwrap()
    }

    #[tokio::test]
    async fn list_renders_every_target_in_order() {
        let lan = SimLan::from_specs(vec![
            SimSpec::new("desk", "d0:73:d5:00:00:01"),
            SimSpec::new("shelf", "d0:73:d5:00:00:02"),
        ]);
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::List, false), &targets).await;

        let DispatchOutcome::Listing(lines) = outcome else {
            panic!("list must produce a listing");
        };
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("desk"));
        assert!(lines[1].starts_with("shelf"));
    }

    #[tokio::test]
    async fn empty_target_set_is_a_noop() {
        let lan = SimLan::from_specs(Vec::new());
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::Power(PowerLevel::Off), true), &targets).await;

        let DispatchOutcome::Applied(report) = outcome else {
            panic!("power must produce a report");
        };
        assert_eq!(report.attempted, 0);
        assert!(report.all_ok());
    }

    #[tokio::test]
    async fn rapid_power_observes_no_failures() {
        let lan = SimLan::from_specs(vec![
            SimSpec::new("good", "d0:73:d5:00:00:01"),
            SimSpec::new("deaf", "d0:73:d5:00:00:02").behavior(SimBehavior::Timeout),
            SimSpec::new("sour", "d0:73:d5:00:00:03").behavior(SimBehavior::Error),
        ]);
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::Power(PowerLevel::Off), true), &targets).await;

        let DispatchOutcome::Applied(report) = outcome else {
            panic!("power must produce a report");
        };
        assert_eq!(report.attempted, 3);
        assert!(report.all_ok());
        // Every device received the send, acknowledged or not.
        for address in ["d0:73:d5:00:00:01", "d0:73:d5:00:00:02", "d0:73:d5:00:00:03"] {
            assert_eq!(lan.device(address).unwrap().state().commands, 1);
        }
    }

    #[tokio::test]
    async fn acknowledged_power_records_partial_failure() {
        let lan = SimLan::from_specs(vec![
            SimSpec::new("a", "d0:73:d5:00:00:01"),
            SimSpec::new("b", "d0:73:d5:00:00:02").behavior(SimBehavior::Timeout),
            SimSpec::new("c", "d0:73:d5:00:00:03"),
        ]);
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::Power(PowerLevel::On), false), &targets).await;

        let DispatchOutcome::Applied(report) = outcome else {
            panic!("power must produce a report");
        };
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].address, "d0:73:d5:00:00:02");
        assert!(matches!(report.failures[0].error, Error::Timeout { .. }));

        // The two responsive devices still received and applied the change.
        let on = |address: &str| lan.device(address).unwrap().state().power;
        assert_eq!(on("d0:73:d5:00:00:01"), Some(PowerLevel::On));
        assert_eq!(on("d0:73:d5:00:00:03"), Some(PowerLevel::On));
        assert_eq!(on("d0:73:d5:00:00:02"), None);
    }

    #[tokio::test]
    async fn color_dispatch_applies_to_responsive_devices() {
        let lan = SimLan::from_specs(vec![SimSpec::new("strip", "d0:73:d5:00:00:09")]);
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::Color(ColorName::Blue), false), &targets).await;

        let DispatchOutcome::Applied(report) = outcome else {
            panic!("color must produce a report");
        };
        assert!(report.all_ok());
        assert_eq!(
            lan.device("d0:73:d5:00:00:09").unwrap().state().color,
            Some(ColorName::Blue)
        );
    }

    #[tokio::test]
    async fn rejection_is_reported_but_does_not_abort() {
        let lan = SimLan::from_specs(vec![
            SimSpec::new("good", "d0:73:d5:00:00:01"),
            SimSpec::new("sour", "d0:73:d5:00:00:02").behavior(SimBehavior::Error),
        ]);
        let targets = all_targets(&lan).await;

        let outcome = dispatch(&request(Command::Color(ColorName::Red), false), &targets).await;

        let DispatchOutcome::Applied(report) = outcome else {
            panic!("color must produce a report");
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, Error::Command { .. }));
    }
}
