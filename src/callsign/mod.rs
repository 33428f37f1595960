// Call-sign classifier
//
// Decides whether a submitted call sign is usable for a report and which
// regulatory zone it belongs to. Pure and total: anything unrecognized is
// INVALID, nothing panics.
//
// Rules are evaluated in order, first match wins:
//   1. SWR listener token
//   2. XE + zone digit (1-3) + optional suffix     -> XE1/XE2/XE3
//   3. XE + digit 4-9 + suffix, or a special block  -> SPECIAL
//   4. looks domestic but matched nothing above     -> INVALID
//   5. generic foreign call                          -> FOREIGN
//   6. anything else                                 -> INVALID

pub mod blocks;

use serde::{Deserialize, Serialize};

use blocks::{GENERAL_DIGITS, NATIONAL_PREFIXES, SPECIAL_BLOCKS, SUFFIX_LEN, ZONE_DIGITS};

/// Reserved pseudo-call used by shortwave listeners reporting a location
pub const LISTENER_TOKEN: &str = "SWR";

/// Zone assigned to stations outside the domestic zone plan
pub const FOREIGN_ZONE: &str = "EXT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneCategory {
    Xe1,
    Xe2,
    Xe3,
    Special,
    Foreign,
    Listener,
    Invalid,
}

impl ZoneCategory {
    /// Zone code for the three regulatory zones, None for everything else
    pub fn zone_code(&self) -> Option<&'static str> {
        match self {
            ZoneCategory::Xe1 => Some("XE1"),
            ZoneCategory::Xe2 => Some("XE2"),
            ZoneCategory::Xe3 => Some("XE3"),
            _ => None,
        }
    }

    fn from_zone_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(ZoneCategory::Xe1),
            2 => Some(ZoneCategory::Xe2),
            3 => Some(ZoneCategory::Xe3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StationKind {
    Operator,
    Listener,
    Invalid,
}

/// Result of classifying one submitted call sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSignClassification {
    pub raw_text: String,
    pub normalized: String,
    pub is_valid: bool,
    pub is_complete: bool,
    pub zone_category: ZoneCategory,
    pub station_kind: StationKind,
}

impl CallSignClassification {
    fn new(raw: &str, normalized: String, zone_category: ZoneCategory, is_complete: bool) -> Self {
        let station_kind = match zone_category {
            ZoneCategory::Invalid => StationKind::Invalid,
            ZoneCategory::Listener => StationKind::Listener,
            _ => StationKind::Operator,
        };
        Self {
            raw_text: raw.to_string(),
            normalized,
            is_valid: zone_category != ZoneCategory::Invalid,
            is_complete: zone_category != ZoneCategory::Invalid && is_complete,
            zone_category,
            station_kind,
        }
    }

    pub fn is_listener(&self) -> bool {
        self.station_kind == StationKind::Listener
    }
}

/// Trim and uppercase a call sign the way every lookup expects it
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Classify a raw call sign
pub fn classify(raw: &str) -> CallSignClassification {
    let call = normalize(raw);

    if call == LISTENER_TOKEN {
        return CallSignClassification::new(raw, call, ZoneCategory::Listener, true);
    }

    if let Some((zone, has_suffix)) = match_zone_series(&call) {
        return CallSignClassification::new(raw, call, zone, has_suffix);
    }

    if is_general_series(&call) || SPECIAL_BLOCKS.iter().any(|block| block.matches(&call)) {
        return CallSignClassification::new(raw, call, ZoneCategory::Special, true);
    }

    // Malformed domestic calls must never be read as foreign ones
    if blocks::has_domestic_marker(&call) {
        return CallSignClassification::new(raw, call, ZoneCategory::Invalid, false);
    }

    if is_foreign_call(&call) {
        return CallSignClassification::new(raw, call, ZoneCategory::Foreign, true);
    }

    CallSignClassification::new(raw, call, ZoneCategory::Invalid, false)
}

/// Zone code embedded in a regular-series call ("XE2MBE" -> "XE2")
pub fn zone_from_call_sign(call: &str) -> Option<&'static str> {
    match_zone_series(&normalize(call)).and_then(|(zone, _)| zone.zone_code())
}

/// Split a normalized call into (national prefix, digit, suffix)
fn split_national(call: &str) -> Option<(u8, &str)> {
    NATIONAL_PREFIXES.iter().find_map(|prefix| {
        let rest = call.strip_prefix(prefix)?;
        let mut chars = rest.chars();
        let digit = chars.next()?.to_digit(10)? as u8;
        Some((digit, chars.as_str()))
    })
}

fn is_letter_suffix(suffix: &str) -> bool {
    SUFFIX_LEN.contains(&suffix.len()) && suffix.chars().all(|c| c.is_ascii_uppercase())
}

/// XE + 1|2|3 + optional 1-3 letter suffix. Returns the zone and whether
/// the suffix is present.
fn match_zone_series(call: &str) -> Option<(ZoneCategory, bool)> {
    let (digit, suffix) = split_national(call)?;
    if !ZONE_DIGITS.contains(&digit) {
        return None;
    }
    let zone = ZoneCategory::from_zone_digit(digit)?;
    if suffix.is_empty() {
        Some((zone, false))
    } else if is_letter_suffix(suffix) {
        Some((zone, true))
    } else {
        None
    }
}

/// XE + 4-9 + mandatory 1-3 letter suffix
fn is_general_series(call: &str) -> bool {
    match split_national(call) {
        Some((digit, suffix)) => GENERAL_DIGITS.contains(&digit) && is_letter_suffix(suffix),
        None => false,
    }
}

/// Generic foreign call: a letter, up to two more prefix characters, a
/// separating digit and a 1-4 letter suffix (K5AB, DL1ABC, VP2MAA, E51ABC).
fn is_foreign_call(call: &str) -> bool {
    if !call.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let suffix_start = call
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_uppercase())
        .last()
        .map(|(i, _)| i);
    let Some(suffix_start) = suffix_start else {
        return false;
    };
    let suffix = &call[suffix_start..];
    let head = &call[..suffix_start];
    if !(1..=4).contains(&suffix.len()) {
        return false;
    }
    let Some(digit) = head.chars().last() else {
        return false;
    };
    if !digit.is_ascii_digit() {
        return false;
    }
    let prefix = &head[..head.len() - 1];
    (1..=3).contains(&prefix.len())
        && prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
