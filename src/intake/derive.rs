// Default derivation for one draft row
//
// Location fields come from a priority-ordered list of strategies. Each
// strategy may claim any field that is still unclaimed; the first claim
// wins. The listener relay strategy claims everything and stops the pass.
//
//   ListenerRelay  SWR token: session SWL location, no zone, no name
//   KnownRoster    roster entry: name, state, city, contact, zone
//   Foreign        foreign call: "Extranjero" / "EXT"
//   Domestic       zone from the call's digit (else EXT), SWL location

use crate::callsign::{self, CallSignClassification, ZoneCategory, FOREIGN_ZONE};
use crate::reference::states::FOREIGN_STATE;
use crate::reference::zones;
use crate::roster::{Contact, RosterEntry};

use super::{DraftReport, SessionDefaults, SourceFlags, DEFAULT_SIGNAL_REPORT};

struct Context<'a> {
    classification: &'a CallSignClassification,
    roster_entry: Option<&'a RosterEntry>,
    defaults: &'a SessionDefaults,
}

/// Location fields claimed so far
#[derive(Debug, Default)]
struct Claims {
    operator_name: Option<String>,
    state: Option<String>,
    city: Option<String>,
    zone: Option<String>,
    contact: Option<Option<Contact>>,
    is_listener_relay: bool,
}

fn claim(slot: &mut Option<String>, value: impl Into<String>) {
    if slot.is_none() {
        *slot = Some(value.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    ListenerRelay,
    KnownRoster,
    Foreign,
    Domestic,
}

const STRATEGIES: &[Strategy] = &[
    Strategy::ListenerRelay,
    Strategy::KnownRoster,
    Strategy::Foreign,
    Strategy::Domestic,
];

impl Strategy {
    /// Claim what this strategy knows. Returns true to stop the pass.
    fn apply(self, ctx: &Context<'_>, claims: &mut Claims) -> bool {
        let defaults = ctx.defaults;
        match self {
            Strategy::ListenerRelay => {
                if !ctx.classification.is_listener() {
                    return false;
                }
                claim(&mut claims.operator_name, "");
                claim(&mut claims.state, defaults.listener_state());
                claim(&mut claims.city, defaults.listener_city());
                claim(&mut claims.zone, "");
                claims.contact.get_or_insert(None);
                claims.is_listener_relay = true;
                true
            }
            Strategy::KnownRoster => {
                let Some(entry) = ctx.roster_entry else {
                    return false;
                };
                claim(&mut claims.operator_name, entry.display_name());
                claim(
                    &mut claims.state,
                    entry.state().unwrap_or(defaults.listener_state()),
                );
                claim(
                    &mut claims.city,
                    entry.municipality().unwrap_or(defaults.listener_city()),
                );
                if claims.contact.is_none() {
                    claims.contact = Some(entry.contact.clone());
                }
                let zone = entry
                    .zone()
                    .or_else(|| callsign::zone_from_call_sign(&entry.call_sign));
                if let Some(zone) = zone {
                    claim(&mut claims.zone, zone);
                }
                false
            }
            Strategy::Foreign => {
                if ctx.classification.zone_category != ZoneCategory::Foreign {
                    return false;
                }
                claim(&mut claims.operator_name, "");
                claim(&mut claims.state, FOREIGN_STATE);
                claim(&mut claims.city, "");
                claim(&mut claims.zone, FOREIGN_ZONE);
                false
            }
            Strategy::Domestic => {
                let zone = ctx
                    .classification
                    .zone_category
                    .zone_code()
                    .unwrap_or(FOREIGN_ZONE);
                claim(&mut claims.operator_name, "");
                claim(&mut claims.state, defaults.listener_state());
                claim(&mut claims.city, defaults.listener_city());
                claim(&mut claims.zone, zone);
                false
            }
        }
    }
}

/// Canonical spelling of a system code ("hf" -> "HF"); unknown codes are
/// kept as typed.
pub fn canonical_system(code: &str) -> String {
    match zones::find_system(code) {
        Some(system) => system.code.to_string(),
        None => code.trim().to_string(),
    }
}

/// Build a fully populated draft for one accepted call sign.
///
/// `system_override` is the row's own system choice; blank means "use the
/// session's preferred system".
pub fn derive(
    classification: &CallSignClassification,
    roster_entry: Option<&RosterEntry>,
    defaults: &SessionDefaults,
    system_override: Option<&str>,
) -> DraftReport {
    let ctx = Context {
        classification,
        roster_entry,
        defaults,
    };

    let mut claims = Claims::default();
    for strategy in STRATEGIES {
        if strategy.apply(&ctx, &mut claims) {
            break;
        }
    }

    let system = system_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&defaults.preferred_system);

    let mut draft = DraftReport {
        call_sign: classification.normalized.clone(),
        operator_name: claims.operator_name.unwrap_or_default(),
        state: claims.state.unwrap_or_default(),
        city: claims.city.unwrap_or_default(),
        zone: claims.zone.unwrap_or_default(),
        system: canonical_system(system),
        signal_report: DEFAULT_SIGNAL_REPORT,
        system_extra: None,
        source_flags: SourceFlags {
            is_listener_relay: claims.is_listener_relay,
        },
        contact: claims.contact.flatten(),
    };
    draft.enforce_invariants(defaults.hf_params.as_ref());
    draft
}
