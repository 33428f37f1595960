// Reference data module - states, zones and systems offered for editing
//
// The intake core never enforces membership in these lists. They back the
// choices shown when a user corrects a derived value in the review grid.

pub mod states;
pub mod zones;

use std::collections::BTreeSet;

/// Zone/state choices offered to the review grid
pub trait ZoneStateReference {
    fn list_zones(&self) -> BTreeSet<String>;
    fn list_states(&self) -> BTreeSet<String>;

    fn list_systems(&self) -> Vec<&'static zones::CommSystem> {
        zones::SYSTEMS.iter().collect()
    }
}

/// Reference backed by the compiled-in tables
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticReference;

impl ZoneStateReference for StaticReference {
    fn list_zones(&self) -> BTreeSet<String> {
        zones::ZONES.iter().map(|z| z.to_string()).collect()
    }

    fn list_states(&self) -> BTreeSet<String> {
        states::MX_STATES
            .iter()
            .map(|s| s.name.to_string())
            .chain(std::iter::once(states::FOREIGN_STATE.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_reference_lists() {
        let reference = StaticReference;
        let zones = reference.list_zones();
        assert!(zones.contains("XE2"));
        assert!(zones.contains("EXT"));
        assert_eq!(zones.len(), 4);

        let states = reference.list_states();
        assert_eq!(states.len(), 33);
        assert!(states.contains("Extranjero"));
        assert!(states.contains("Jalisco"));

        let systems = reference.list_systems();
        assert_eq!(systems.first().map(|s| s.code), Some("HF"));
        assert!(systems.iter().any(|s| s.name == "AllStarLink"));
    }
}
