//! Device targeting: selection intents and their resolution.

use log::debug;
use regex::Regex;

use crate::client::{Device, Lan};
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// The device field a pattern selector applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// The display label
    Name,
    /// The group the device belongs to
    Group,
    /// The location the device is installed in
    Location,
}

impl FilterField {
    fn extract<'a, D: Device>(self, device: &'a D) -> Option<&'a str> {
        match self {
            FilterField::Name => device.label(),
            FilterField::Group => device.group(),
            FilterField::Location => device.location(),
        }
    }
}

/// What the user asked to target.
///
/// The variants are mutually exclusive by construction, so "at most one
/// selector kind" holds at the type level. [`SelectionIntent::from_options`]
/// bridges from individually-optional CLI flags and rejects conflicts.
///
/// # Example
///
/// ```
/// use lifxctl::{Error, SelectionIntent};
///
/// let intent = SelectionIntent::from_options(None, None, None, None).unwrap();
/// assert_eq!(intent, SelectionIntent::All);
///
/// let conflict = SelectionIntent::from_options(
///     Some("kitchen".into()),
///     Some("Living".into()),
///     None,
///     None,
/// );
/// assert!(matches!(conflict, Err(Error::ConflictingSelectors)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    /// Devices known by hardware address; resolving never touches the network.
    Explicit(Vec<String>),
    /// Discovered devices whose `field` matches `pattern` from the start.
    Matching {
        field: FilterField,
        pattern: String,
    },
    /// Every discovered device.
    All,
}

impl SelectionIntent {
    /// Build an intent from the raw, individually-optional selector options.
    ///
    /// Supplying none of them targets everything. Supplying more than one is
    /// a configuration error, reported before any device interaction.
    pub fn from_options(
        name: Option<String>,
        group: Option<String>,
        location: Option<String>,
        addresses: Option<Vec<String>>,
    ) -> Result<Self> {
        let mut intents = Vec::new();
        if let Some(pattern) = name {
            intents.push(SelectionIntent::Matching {
                field: FilterField::Name,
                pattern,
            });
        }
        if let Some(pattern) = group {
            intents.push(SelectionIntent::Matching {
                field: FilterField::Group,
                pattern,
            });
        }
        if let Some(pattern) = location {
            intents.push(SelectionIntent::Matching {
                field: FilterField::Location,
                pattern,
            });
        }
        if let Some(addresses) = addresses {
            intents.push(SelectionIntent::Explicit(addresses));
        }

        if intents.len() > 1 {
            return Err(Error::ConflictingSelectors);
        }
        Ok(intents.pop().unwrap_or(SelectionIntent::All))
    }
}

/// The resolved, ordered set of devices a command will be applied to.
///
/// Built once per invocation and read-only afterwards; sharing it across
/// concurrent per-device operations is safe.
#[derive(Debug)]
pub struct TargetSet<D> {
    devices: Vec<D>,
}

impl<D> TargetSet<D> {
    fn new(devices: Vec<D>) -> Self {
        TargetSet { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, D> {
        self.devices.iter()
    }
}

impl<'a, D> IntoIterator for &'a TargetSet<D> {
    type Item = &'a D;
    type IntoIter = std::slice::Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

/// Resolve an intent to a concrete target set.
///
/// The explicit-address path builds handles without a discovery pass and
/// never blocks; reachability problems surface at command time. Pattern and
/// all-device intents run one discovery pass, which may block until the
/// client's discovery window closes. The pattern is validated before
/// discovery, so a malformed pattern costs nothing on the wire.
///
/// A match must begin at the start of the field but need not span it;
/// anchor with `^...$` to match a whole field. Devices missing the filtered
/// field are skipped, not errors. Zero matches yields a valid empty set.
pub async fn resolve<L: Lan>(intent: &SelectionIntent, lan: &L) -> Result<TargetSet<L::Device>> {
    match intent {
        SelectionIntent::Explicit(addresses) => {
            debug!("targeting {} explicit addresses", addresses.len());
            let devices = addresses
                .iter()
                .map(|address| lan.by_address(address))
                .collect();
            Ok(TargetSet::new(devices))
        }
        SelectionIntent::Matching { field, pattern } => {
            let regex =
                Regex::new(pattern).map_err(|source| Error::invalid_pattern(pattern, source))?;
            let discovered = lan.discover().await?;
            debug!(
                "discovered {} devices, filtering {:?} against {:?}",
                discovered.len(),
                field,
                pattern
            );
            let devices = discovered
                .into_iter()
                .filter(|device| {
                    field
                        .extract(device)
                        .is_some_and(|value| matches_prefix(&regex, value))
                })
                .collect();
            Ok(TargetSet::new(devices))
        }
        SelectionIntent::All => {
            let discovered = lan.discover().await?;
            debug!("targeting all {} discovered devices", discovered.len());
            Ok(TargetSet::new(discovered))
        }
    }
}

// Prefix semantics: the leftmost match decides, and it must start at 0.
fn matches_prefix(regex: &Regex, value: &str) -> bool {
    regex.find(value).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimLan, SimSpec};

    fn lan() -> SimLan {
        SimLan::from_specs(vec![
            SimSpec::new("kitchen-1", "d0:73:d5:00:00:01")
                .group("Kitchen")
                .location("Home"),
            SimSpec::new("kitchen-2", "d0:73:d5:00:00:02")
                .group("Kitchen")
                .location("Home"),
            SimSpec::new("bedroom", "d0:73:d5:00:00:03").group("Bedroom"),
        ])
    }

    #[tokio::test]
    async fn explicit_addresses_skip_discovery() {
        let lan = lan();
        let intent = SelectionIntent::Explicit(vec!["d0:73:d5:00:00:01".to_string()]);

        let targets = resolve(&intent, &lan).await.unwrap();

        assert_eq!(targets.len(), 1);
        let device = targets.iter().next().unwrap();
        assert_eq!(device.address(), "d0:73:d5:00:00:01");
        assert_eq!(device.label(), None);
        assert_eq!(lan.discovery_count(), 0);
    }

    #[tokio::test]
    async fn name_pattern_matches_from_start() {
        let lan = lan();
        let intent = SelectionIntent::Matching {
            field: FilterField::Name,
            pattern: "kitchen".to_string(),
        };

        let targets = resolve(&intent, &lan).await.unwrap();

        let labels: Vec<_> = targets.iter().map(|d| d.label().unwrap()).collect();
        assert_eq!(labels, ["kitchen-1", "kitchen-2"]);
        assert_eq!(lan.discovery_count(), 1);
    }

    #[tokio::test]
    async fn pattern_does_not_match_mid_string() {
        let lan = lan();
        let intent = SelectionIntent::Matching {
            field: FilterField::Name,
            pattern: "itchen".to_string(),
        };

        let targets = resolve(&intent, &lan).await.unwrap();

        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn anchored_group_pattern_with_no_matches_is_not_an_error() {
        let lan = lan();
        let intent = SelectionIntent::Matching {
            field: FilterField::Group,
            pattern: "^Living$".to_string(),
        };

        let targets = resolve(&intent, &lan).await.unwrap();

        assert!(targets.is_empty());
        assert_eq!(lan.discovery_count(), 1);
    }

    #[tokio::test]
    async fn all_returns_every_device_in_discovery_order() {
        let lan = lan();

        let targets = resolve(&SelectionIntent::All, &lan).await.unwrap();

        let labels: Vec<_> = targets.iter().map(|d| d.label().unwrap()).collect();
        assert_eq!(labels, ["kitchen-1", "kitchen-2", "bedroom"]);
    }

    #[tokio::test]
    async fn invalid_pattern_fails_before_discovery() {
        let lan = lan();
        let intent = SelectionIntent::Matching {
            field: FilterField::Name,
            pattern: "[".to_string(),
        };

        let err = resolve(&intent, &lan).await.unwrap_err();

        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert_eq!(lan.discovery_count(), 0);
    }

    #[tokio::test]
    async fn missing_metadata_is_no_match() {
        let lan = lan();
        // bedroom has no location; a permissive pattern must still skip it.
        let intent = SelectionIntent::Matching {
            field: FilterField::Location,
            pattern: ".*".to_string(),
        };

        let targets = resolve(&intent, &lan).await.unwrap();

        let labels: Vec<_> = targets.iter().map(|d| d.label().unwrap()).collect();
        assert_eq!(labels, ["kitchen-1", "kitchen-2"]);
    }

    #[test]
    fn conflicting_options_are_rejected() {
        let err = SelectionIntent::from_options(
            Some("kitchen".to_string()),
            None,
            None,
            Some(vec!["d0:73:d5:00:00:01".to_string()]),
        )
        .unwrap_err();

        assert_eq!(err, Error::ConflictingSelectors);
    }

    #[test]
    fn no_options_target_everything() {
        let intent = SelectionIntent::from_options(None, None, None, None).unwrap();
        assert_eq!(intent, SelectionIntent::All);
    }

    #[test]
    fn single_option_maps_to_its_field() {
        let intent =
            SelectionIntent::from_options(None, None, Some("upstairs".to_string()), None).unwrap();
        assert_eq!(
            intent,
            SelectionIntent::Matching {
                field: FilterField::Location,
                pattern: "upstairs".to_string(),
            }
        );
    }
}
