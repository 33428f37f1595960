// Zones and communication systems offered on the intake form

use serde::Serialize;

/// Regulatory zones plus the catch-all for foreign stations
pub const ZONES: &[&str] = &["XE1", "XE2", "XE3", "EXT"];

/// Communication system a report was heard on
#[derive(Debug, Clone, Serialize)]
pub struct CommSystem {
    pub code: &'static str,
    pub name: &'static str,
    /// Requires frequency/mode/power on every report
    pub needs_rf_params: bool,
}

pub const SYSTEMS: &[CommSystem] = &[
    CommSystem {
        code: "HF",
        name: "Alta frecuencia",
        needs_rf_params: true,
    },
    CommSystem {
        code: "ASL",
        name: "AllStarLink",
        needs_rf_params: false,
    },
    CommSystem {
        code: "IRLP",
        name: "Internet Radio Linking Project",
        needs_rf_params: false,
    },
    CommSystem {
        code: "Echolink",
        name: "EchoLink",
        needs_rf_params: false,
    },
    CommSystem {
        code: "DMR",
        name: "Digital Mobile Radio",
        needs_rf_params: false,
    },
    CommSystem {
        code: "C4FM",
        name: "System Fusion",
        needs_rf_params: false,
    },
    CommSystem {
        code: "D-STAR",
        name: "D-STAR",
        needs_rf_params: false,
    },
    CommSystem {
        code: "VHF",
        name: "Repetidor VHF",
        needs_rf_params: false,
    },
    CommSystem {
        code: "UHF",
        name: "Repetidor UHF",
        needs_rf_params: false,
    },
];

/// True if `system` is an HF system whose reports carry frequency/mode/power
pub fn is_hf(system: &str) -> bool {
    find_system(system).is_some_and(|s| s.needs_rf_params)
}

/// Find a system by code, case-insensitive
pub fn find_system(code: &str) -> Option<&'static CommSystem> {
    let code = code.trim();
    SYSTEMS.iter().find(|s| s.code.eq_ignore_ascii_case(code))
}
