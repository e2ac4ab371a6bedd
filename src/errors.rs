/// All error types that can occur while targeting and controlling devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// More than one device selector was supplied.
    #[error("conflicting selectors; use at most one of name, group, location, or address")]
    ConflictingSelectors,

    /// The selector pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A device did not acknowledge a command in time.
    #[error("device {address} timed out waiting for acknowledgment")]
    Timeout { address: String },

    /// A device rejected or failed a command.
    #[error("device {address} failed: {reason}")]
    Command { address: String, reason: String },

    /// The discovery provider failed before enumerating any devices.
    ///
    /// An empty discovery result is not an error; this covers transport-level
    /// failures reported by the client.
    #[error("discovery failed: {reason}")]
    Discovery { reason: String },

    /// Failed to read a roster file for the simulated LAN.
    #[error("failed to read roster: {0}")]
    RosterIo(#[from] std::io::Error),

    /// A roster file did not parse as a device list.
    #[error("failed to parse roster: {0}")]
    RosterParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a new invalid pattern error
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }

    /// Create a new per-device timeout error
    pub fn timeout(address: &str) -> Self {
        Error::Timeout {
            address: address.to_string(),
        }
    }

    /// Create a new per-device command error
    pub fn command(address: &str, reason: &str) -> Self {
        Error::Command {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new discovery error
    pub fn discovery(reason: &str) -> Self {
        Error::Discovery {
            reason: reason.to_string(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
