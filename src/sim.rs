//! Simulated LAN backend.
//!
//! Stands in for a real device client: a fixed roster of devices with
//! scriptable behavior, shared observable state, and a discovery-call
//! counter. Backs the binary's demo mode and the test suite; real
//! transports implement [`Lan`]/[`Device`] against their protocol client.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::client::{Device, Lan};
use crate::errors::Error;
use crate::types::{ColorName, PowerLevel};

type Result<T> = std::result::Result<T, Error>;

/// How a simulated device responds to set operations.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SimBehavior {
    /// Acknowledge every command.
    #[default]
    Responsive,
    /// Never acknowledge; acknowledged commands time out.
    Timeout,
    /// Reject every command.
    Error,
}

/// Roster entry describing one simulated device.
///
/// # Example
///
/// ```
/// use lifxctl::sim::{SimBehavior, SimSpec};
///
/// let spec = SimSpec::new("kitchen-1", "d0:73:d5:00:00:01")
///     .group("Kitchen")
///     .behavior(SimBehavior::Timeout);
/// assert_eq!(spec.label, "kitchen-1");
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SimSpec {
    pub label: String,
    pub group: Option<String>,
    pub location: Option<String>,
    pub address: String,
    #[serde(default)]
    pub behavior: SimBehavior,
    /// Acknowledgment latency in milliseconds; rapid sends skip it.
    pub latency_ms: Option<u64>,
}

impl SimSpec {
    pub fn new(label: &str, address: &str) -> Self {
        SimSpec {
            label: String::from(label),
            group: None,
            location: None,
            address: String::from(address),
            behavior: SimBehavior::default(),
            latency_ms: None,
        }
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(String::from(group));
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(String::from(location));
        self
    }

    pub fn behavior(mut self, behavior: SimBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Observable state of a simulated device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimState {
    /// Last power level applied, if any.
    pub power: Option<PowerLevel>,
    /// Last color applied, if any.
    pub color: Option<ColorName>,
    /// Set operations received, acknowledged or not.
    pub commands: usize,
}

/// A device on the simulated LAN.
///
/// Clones share state, so handles returned from discovery stay wired to the
/// roster they came from.
#[derive(Debug, Clone)]
pub struct SimDevice {
    label: Option<String>,
    group: Option<String>,
    location: Option<String>,
    address: String,
    behavior: SimBehavior,
    latency: Option<Duration>,
    state: Arc<Mutex<SimState>>,
}

impl SimDevice {
    fn from_spec(spec: SimSpec) -> Self {
        SimDevice {
            label: Some(spec.label),
            group: spec.group,
            location: spec.location,
            address: spec.address,
            behavior: spec.behavior,
            latency: spec.latency_ms.map(Duration::from_millis),
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Address-only handle for a device the roster has never seen.
    fn unknown(address: &str) -> Self {
        SimDevice {
            label: None,
            group: None,
            location: None,
            address: String::from(address),
            behavior: SimBehavior::default(),
            latency: None,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Snapshot of the device's observable state.
    pub fn state(&self) -> SimState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SimState> {
        // State is plain data; recover the guard if a test panicked mid-write.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn settle(&self, rapid: bool) -> Result<()> {
        if rapid {
            return Ok(());
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.behavior {
            SimBehavior::Responsive => Ok(()),
            SimBehavior::Timeout => Err(Error::timeout(&self.address)),
            SimBehavior::Error => Err(Error::command(&self.address, "rejected by device")),
        }
    }
}

impl Device for SimDevice {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn set_power(&self, level: PowerLevel, rapid: bool) -> Result<()> {
        {
            let mut state = self.lock_state();
            state.commands += 1;
            if self.behavior == SimBehavior::Responsive {
                state.power = Some(level);
            }
        }
        debug!("sim {}: set_power {} (rapid: {})", self.address, level, rapid);
        self.settle(rapid).await
    }

    async fn set_color(&self, color: ColorName, rapid: bool) -> Result<()> {
        {
            let mut state = self.lock_state();
            state.commands += 1;
            if self.behavior == SimBehavior::Responsive {
                state.color = Some(color);
            }
        }
        debug!("sim {}: set_color {} (rapid: {})", self.address, color, rapid);
        self.settle(rapid).await
    }

    fn render(&self) -> String {
        let mut line = match &self.label {
            Some(label) => format!("{label} [{}]", self.address),
            None => format!("<unknown> [{}]", self.address),
        };
        if let Some(group) = &self.group {
            line.push_str(&format!(" group={group}"));
        }
        if let Some(location) = &self.location {
            line.push_str(&format!(" location={location}"));
        }
        if let Some(power) = self.state().power {
            line.push_str(&format!(" power={power}"));
        }
        line
    }
}

/// A simulated network of devices.
#[derive(Debug, Default)]
pub struct SimLan {
    devices: Vec<SimDevice>,
    discoveries: AtomicUsize,
}

impl SimLan {
    /// Build a LAN from roster entries; discovery order follows the roster.
    pub fn from_specs(specs: Vec<SimSpec>) -> Self {
        SimLan {
            devices: specs.into_iter().map(SimDevice::from_spec).collect(),
            discoveries: AtomicUsize::new(0),
        }
    }

    /// Parse a JSON roster.
    ///
    /// # Example
    ///
    /// ```
    /// use lifxctl::sim::SimLan;
    ///
    /// let lan = SimLan::from_json(
    ///     r#"[{"label": "porch", "address": "d0:73:d5:00:00:07", "behavior": "timeout"}]"#,
    /// )
    /// .unwrap();
    /// assert!(lan.device("d0:73:d5:00:00:07").is_some());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<SimSpec> = serde_json::from_str(json)?;
        Ok(SimLan::from_specs(specs))
    }

    /// Load a JSON roster from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        SimLan::from_json(&json)
    }

    /// Built-in roster for running the binary without a roster file.
    pub fn demo() -> Self {
        SimLan::from_specs(vec![
            SimSpec::new("kitchen-1", "d0:73:d5:00:00:01")
                .group("Kitchen")
                .location("Home"),
            SimSpec::new("kitchen-2", "d0:73:d5:00:00:02")
                .group("Kitchen")
                .location("Home"),
            SimSpec::new("bedside", "d0:73:d5:00:00:03")
                .group("Bedroom")
                .location("Home"),
            SimSpec::new("porch", "d0:73:d5:00:00:04")
                .group("Outdoor")
                .location("Home")
                .behavior(SimBehavior::Timeout)
                .latency_ms(250),
        ])
    }

    /// Number of discovery passes run so far.
    pub fn discovery_count(&self) -> usize {
        self.discoveries.load(Ordering::Relaxed)
    }

    /// Roster device by address, for assertions on its state.
    pub fn device(&self, address: &str) -> Option<&SimDevice> {
        self.devices.iter().find(|d| d.address == address)
    }
}

impl Lan for SimLan {
    type Device = SimDevice;

    async fn discover(&self) -> Result<Vec<SimDevice>> {
        self.discoveries.fetch_add(1, Ordering::Relaxed);
        debug!("sim discovery pass: {} devices", self.devices.len());
        Ok(self.devices.clone())
    }

    fn by_address(&self, address: &str) -> SimDevice {
        // A roster hit keeps the shared state but hides the metadata, since
        // an address-only handle knows nothing it was not given.
        match self.devices.iter().find(|d| d.address == address) {
            Some(known) => SimDevice {
                label: None,
                group: None,
                location: None,
                address: known.address.clone(),
                behavior: known.behavior,
                latency: known.latency,
                state: Arc::clone(&known.state),
            },
            None => SimDevice::unknown(address),
        }
    }
}
