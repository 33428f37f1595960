// Domestic numbering plan
// Source: IFT amateur service allocations (XA-XI, 4A-4C, 6D-6J)
//
// The regular XE series carries the regulatory zone in its digit (XE1, XE2,
// XE3). Everything else the administration hands out (contest calls,
// commemorative calls, island prefixes) lives in the special blocks below.
// Extend SPECIAL_BLOCKS when a new block is assigned; the classifier reads
// nothing else.

/// National prefixes used by the regular series (zone digit + suffix)
pub const NATIONAL_PREFIXES: &[&str] = &["XE"];

/// Zone digits of the regular series that map to a regulatory zone
pub const ZONE_DIGITS: std::ops::RangeInclusive<u8> = 1..=3;

/// Digits of the regular series outside the zone plan (general licences)
pub const GENERAL_DIGITS: std::ops::RangeInclusive<u8> = 4..=9;

/// Suffix length accepted for the regular series
pub const SUFFIX_LEN: std::ops::RangeInclusive<usize> = 1..=3;

/// A reserved block of domestic prefixes
#[derive(Debug, Clone)]
pub struct SpecialBlock {
    /// Prefixes in the block (e.g. "4A", "XF")
    pub prefixes: &'static [&'static str],
    /// Lowest digit allowed right after the prefix
    pub min_digit: u8,
    /// Highest digit allowed right after the prefix
    pub max_digit: u8,
    /// Shortest alphanumeric suffix
    pub min_suffix: usize,
    /// Longest alphanumeric suffix
    pub max_suffix: usize,
}

impl SpecialBlock {
    /// True if `call` (already normalized) belongs to this block
    pub fn matches(&self, call: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            let Some(rest) = call.strip_prefix(prefix) else {
                return false;
            };
            let mut chars = rest.chars();
            let digit = match chars.next().and_then(|c| c.to_digit(10)) {
                Some(d) => d as u8,
                None => return false,
            };
            if digit < self.min_digit || digit > self.max_digit {
                return false;
            }
            let suffix = chars.as_str();
            (self.min_suffix..=self.max_suffix).contains(&suffix.len())
                && suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
    }
}

/// Reserved domestic blocks
pub const SPECIAL_BLOCKS: &[SpecialBlock] = &[
    // XA-XI outside the regular XE series
    SpecialBlock {
        prefixes: &["XA", "XB", "XC", "XD", "XF", "XG", "XH", "XI"],
        min_digit: 0,
        max_digit: 9,
        min_suffix: 1,
        max_suffix: 3,
    },
    // 4A-4C
    SpecialBlock {
        prefixes: &["4A", "4B", "4C"],
        min_digit: 0,
        max_digit: 9,
        min_suffix: 1,
        max_suffix: 3,
    },
    // 6D-6J
    SpecialBlock {
        prefixes: &["6D", "6E", "6F", "6G", "6H", "6I", "6J"],
        min_digit: 0,
        max_digit: 9,
        min_suffix: 1,
        max_suffix: 3,
    },
];

/// True if the call starts like a domestic call: a national prefix, any
/// special-block prefix, or the leading digit of a numeric special block.
pub fn has_domestic_marker(call: &str) -> bool {
    if NATIONAL_PREFIXES.iter().any(|p| call.starts_with(p)) {
        return true;
    }
    let Some(first) = call.chars().next() else {
        return false;
    };
    SPECIAL_BLOCKS
        .iter()
        .flat_map(|block| block.prefixes.iter())
        .any(|prefix| {
            call.starts_with(prefix) || (first.is_ascii_digit() && prefix.starts_with(first))
        })
}
