//! Power level for set operations.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Requested power state for a device.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PowerLevel {
    /// Turn the device on
    On,
    /// Turn the device off
    Off,
}
