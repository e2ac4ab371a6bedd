//! # lifxctl
//!
//! Bulk control for LIFX-style smart lights over the LAN: select a subset of
//! devices with a pattern or an address list, then apply one operation to
//! the whole subset.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lifxctl::{Command, CommandRequest, PowerLevel, SelectionIntent, dispatch, resolve};
//!
//! async fn lights_out(lan: &impl lifxctl::Lan) -> Result<(), lifxctl::Error> {
//!     // Everything in a group whose name starts with "Bed".
//!     let intent = SelectionIntent::from_options(None, Some("Bed".into()), None, None)?;
//!     let targets = resolve(&intent, lan).await?;
//!
//!     let request = CommandRequest {
//!         command: Command::Power(PowerLevel::Off),
//!         rapid: false,
//!     };
//!     let outcome = dispatch(&request, &targets).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Selectors
//!
//! A [`SelectionIntent`] is one of:
//!
//! - **Explicit addresses**: handles are built directly, no discovery pass,
//!   no network traffic at resolution time
//! - **A pattern on name, group, or location**: one discovery pass, then a
//!   prefix-anchored regular-expression filter in discovery order
//! - **All**: one discovery pass, unfiltered
//!
//! The variants are mutually exclusive by construction; the CLI's selector
//! flags are bridged through [`SelectionIntent::from_options`], which rejects
//! conflicting combinations before anything touches the network.
//!
//! ## Acknowledgment modes
//!
//! Set commands run in one of two modes, chosen per invocation:
//!
//! - **Rapid**: fire-and-forget. No acknowledgment is awaited and
//!   per-device failures are deliberately unobserved; throughput over
//!   certainty when sweeping many devices.
//! - **Acknowledged** (default): each device confirms or times out. One
//!   slow or dead device never blocks the rest; failures are collected into
//!   an [`ApplyReport`] and summarized at the end.
//!
//! ## Backends
//!
//! The wire protocol and socket layer live behind the [`Lan`] and [`Device`]
//! traits. The in-tree backend is the simulated LAN in [`sim`]; real
//! transports implement the same traits.

mod client;
mod dispatch;
mod errors;
mod selector;
pub mod sim;
mod types;

// Re-export public API
pub use client::{Device, Lan};
pub use dispatch::{
    ApplyReport, Command, CommandRequest, DeviceFailure, DispatchOutcome, dispatch,
};
pub use errors::Error;
pub use selector::{FilterField, SelectionIntent, TargetSet, resolve};
pub use types::{ColorName, PowerLevel};
