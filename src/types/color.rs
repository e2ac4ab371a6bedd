//! Named colors for the color command.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Named color passed through to the device client.
///
/// The palette is deliberately small; translating a name into a device
/// color space is the client's concern, not ours.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
pub enum ColorName {
    Red,
    Green,
    Blue,
}
