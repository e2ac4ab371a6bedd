//! Device discovery and control boundary.
//!
//! The wire protocol, socket handling, and per-device retry/timeout policy
//! all live behind these traits. The crate ships one implementation, the
//! simulated LAN in [`crate::sim`]; real transports implement the same
//! traits against their protocol client.

use std::future::Future;

use crate::errors::Error;
use crate::types::{ColorName, PowerLevel};

type Result<T> = std::result::Result<T, Error>;

/// A controllable device on the network.
///
/// Metadata accessors return `None` when the handle was constructed from an
/// address alone, or when the device simply does not expose that field.
/// A missing field is never an error.
pub trait Device: Send + Sync {
    /// Display label, when known.
    fn label(&self) -> Option<&str>;

    /// Group name, when known.
    fn group(&self) -> Option<&str>;

    /// Location name, when known.
    fn location(&self) -> Option<&str>;

    /// Hardware address. Always known.
    fn address(&self) -> &str;

    /// Set the power state.
    ///
    /// When `rapid` is true the call is fire-and-forget: it must return
    /// without waiting for an acknowledgment, and failures go unobserved.
    /// When false it waits until the device acknowledges or the client's
    /// own timeout elapses, reported as [`Error::Timeout`].
    fn set_power(
        &self,
        level: PowerLevel,
        rapid: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Set the color. Same acknowledgment contract as [`Device::set_power`].
    fn set_color(
        &self,
        color: ColorName,
        rapid: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// One-line textual representation for listings.
    fn render(&self) -> String;
}

/// A discovery and control provider for one network.
pub trait Lan: Send + Sync {
    type Device: Device;

    /// Enumerate the devices currently visible on the network.
    ///
    /// May block until discovery completes or times out; retry and timeout
    /// policy belong to the implementation. An empty result is valid and
    /// must not be reported as an error.
    fn discover(&self) -> impl Future<Output = Result<Vec<Self::Device>>> + Send;

    /// Construct a handle for a device known only by hardware address.
    ///
    /// Performs no I/O and cannot fail; an unreachable address surfaces
    /// later, when a command is sent to it.
    fn by_address(&self, address: &str) -> Self::Device;
}
