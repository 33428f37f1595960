// Mexican federal entities for report locations
// Source: INEGI catalogue of federal entities (Marco Geoestadístico)
//
// Names are stored the way operators write them on reports (with accents).
// Lookups go through `fold` so "Michoacan", "MICHOACÁN" and "michoacán"
// resolve to the same entity.

/// Federal entity (state) information
#[derive(Debug, Clone)]
pub struct MxState {
    /// INEGI-style abbreviation
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
}

/// State name used for stations outside the country
pub const FOREIGN_STATE: &str = "Extranjero";

/// All 32 federal entities
pub const MX_STATES: &[MxState] = &[
    MxState { code: "AGS", name: "Aguascalientes" },
    MxState { code: "BC", name: "Baja California" },
    MxState { code: "BCS", name: "Baja California Sur" },
    MxState { code: "CAMP", name: "Campeche" },
    MxState { code: "CHIS", name: "Chiapas" },
    MxState { code: "CHIH", name: "Chihuahua" },
    MxState { code: "CDMX", name: "Ciudad de México" },
    MxState { code: "COAH", name: "Coahuila" },
    MxState { code: "COL", name: "Colima" },
    MxState { code: "DGO", name: "Durango" },
    MxState { code: "MEX", name: "Estado de México" },
    MxState { code: "GTO", name: "Guanajuato" },
    MxState { code: "GRO", name: "Guerrero" },
    MxState { code: "HGO", name: "Hidalgo" },
    MxState { code: "JAL", name: "Jalisco" },
    MxState { code: "MICH", name: "Michoacán" },
    MxState { code: "MOR", name: "Morelos" },
    MxState { code: "NAY", name: "Nayarit" },
    MxState { code: "NL", name: "Nuevo León" },
    MxState { code: "OAX", name: "Oaxaca" },
    MxState { code: "PUE", name: "Puebla" },
    MxState { code: "QRO", name: "Querétaro" },
    MxState { code: "QROO", name: "Quintana Roo" },
    MxState { code: "SLP", name: "San Luis Potosí" },
    MxState { code: "SIN", name: "Sinaloa" },
    MxState { code: "SON", name: "Sonora" },
    MxState { code: "TAB", name: "Tabasco" },
    MxState { code: "TAMPS", name: "Tamaulipas" },
    MxState { code: "TLAX", name: "Tlaxcala" },
    MxState { code: "VER", name: "Veracruz" },
    MxState { code: "YUC", name: "Yucatán" },
    MxState { code: "ZAC", name: "Zacatecas" },
];

/// Uppercase and strip Spanish accents for comparisons
pub fn fold(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            'á' | 'Á' => 'A',
            'é' | 'É' => 'E',
            'í' | 'Í' => 'I',
            'ó' | 'Ó' => 'O',
            'ú' | 'Ú' | 'ü' | 'Ü' => 'U',
            'ñ' | 'Ñ' => 'N',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Find a state by code or name, ignoring case and accents
pub fn find_state(query: &str) -> Option<&'static MxState> {
    let folded = fold(query);
    if folded.is_empty() {
        return None;
    }
    MX_STATES
        .iter()
        .find(|s| s.code == folded || fold(s.name) == folded)
}

/// Canonical display name for a state as typed by a user. Unknown values
/// are returned trimmed and otherwise untouched.
pub fn canonical_state_name(query: &str) -> String {
    if fold(query) == fold(FOREIGN_STATE) {
        return FOREIGN_STATE.to_string();
    }
    match find_state(query) {
        Some(state) => state.name.to_string(),
        None => query.trim().to_string(),
    }
}
