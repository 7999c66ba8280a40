//! Static dictionary of known BCSV column names.
//!
//! Column names are never stored in a BCSV file, only their
//! [`crate::utils::jgadget_hash`] values, so the codec must be seeded with
//! the set of names it expects to see. Unknown hashes round-trip as
//! `"_0x{hash:08X}"` rather than failing the read.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Every column name this crate knows how to reverse a hash into, across
/// both BCSV tables it reads (`ParticleNames`, `AutoEffectList`).
pub const KNOWN_COLUMNS: &[&str] = &[
    "name",
    "GroupName",
    "AnimName",
    "ContinueAnimEnd",
    "UniqueName",
    "EffectName",
    "ParentName",
    "JointName",
    "OffsetX",
    "OffsetY",
    "OffsetZ",
    "StartFrame",
    "EndFrame",
    "Affect",
    "Follow",
    "ScaleValue",
    "RateValue",
    "PrmColor",
    "EnvColor",
    "LightAffectValue",
    "DrawOrder",
];

static HASH_TO_NAME: LazyLock<HashMap<u32, &'static str>> = LazyLock::new(|| {
    KNOWN_COLUMNS
        .iter()
        .map(|&name| (crate::utils::jgadget_hash(name), name))
        .collect()
});

/// Resolve a column name hash to its known name, if any.
pub fn resolve(hash: u32) -> Option<&'static str> {
    HASH_TO_NAME.get(&hash).copied()
}

/// Format an unresolved hash the way the codec surfaces it in documents.
pub fn unknown_name(hash: u32) -> String {
    format!("_0x{hash:08X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_columns_resolve_round_trip() {
        for &name in KNOWN_COLUMNS {
            let hash = crate::utils::jgadget_hash(name);
            assert_eq!(resolve(hash), Some(name));
        }
    }

    #[test]
    fn unknown_hash_formats_as_hex() {
        assert_eq!(unknown_name(0x1234ABCD), "_0x1234ABCD");
    }
}
