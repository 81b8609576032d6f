use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::text::normalize_text;

/// Maps spelling and notation variants of measurement units to a single
/// canonical token.
///
/// The table is declarative configuration: canonical token to the list of
/// variants that should collapse into it. Lookups happen on normalized
/// text, so variants may be written in any casing or notation
/// (`m²`, `M.2` and `m^2` all reach the `m2` entry). Unknown units pass
/// through [`normalize_unit`] unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct UnitAliases {
    table: BTreeMap<String, Vec<String>>,
    lookup: HashMap<String, String>,
}

impl UnitAliases {
    /// Builds the alias table, normalizing every variant so lookups work
    /// on normalized unit text.
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        let mut lookup = HashMap::new();
        for (canonical, variants) in &table {
            // The canonical token is its own alias.
            lookup.insert(normalize_text(canonical), canonical.clone());
            for variant in variants {
                lookup.insert(normalize_text(variant), canonical.clone());
            }
        }
        Self { table, lookup }
    }

    /// Canonical token for an already-normalized unit string, if known.
    pub fn canonical_token(&self, normalized: &str) -> Option<&str> {
        self.lookup.get(normalized).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl Default for UnitAliases {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            "m2".to_string(),
            vec!["m²", "m^2", "m.2", "m2.", "m2-"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        table.insert(
            "ml".to_string(),
            vec!["m.l", "m.l.", "m lineal", "m. lineal", "metro lineal"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        table.insert(
            "ud".to_string(),
            vec!["uds", "unidad", "unid", "u"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        Self::new(table)
    }
}

impl From<BTreeMap<String, Vec<String>>> for UnitAliases {
    fn from(table: BTreeMap<String, Vec<String>>) -> Self {
        Self::new(table)
    }
}

impl From<UnitAliases> for BTreeMap<String, Vec<String>> {
    fn from(aliases: UnitAliases) -> Self {
        aliases.table
    }
}

/// Normalizes a raw unit string and collapses known variants to their
/// canonical token. Unmapped units pass through normalized.
pub fn normalize_unit(value: &str, aliases: &UnitAliases) -> String {
    let normalized = normalize_text(value);
    match aliases.canonical_token(&normalized) {
        Some(canonical) => canonical.to_string(),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_token_is_its_own_alias() {
        let aliases = UnitAliases::default();
        assert_eq!(normalize_unit("ud", &aliases), "ud");
        assert_eq!(normalize_unit("ml", &aliases), "ml");
    }

    #[test]
    fn dotted_variants_reach_their_entry() {
        let aliases = UnitAliases::default();
        // "m.l." normalizes to "m l", same as "m.l".
        assert_eq!(normalize_unit("m.l.", &aliases), "ml");
        assert_eq!(normalize_unit("M. Lineal", &aliases), "ml");
    }

    #[test]
    fn custom_table_overrides_builtin() {
        let mut table = BTreeMap::new();
        table.insert("kg".to_string(), vec!["kilo".to_string(), "kgs".to_string()]);
        let aliases = UnitAliases::new(table);
        assert_eq!(normalize_unit("Kilo", &aliases), "kg");
        // Built-in entries are gone under a custom table.
        assert_eq!(normalize_unit("m²", &aliases), "m2");
        assert_eq!(normalize_unit("unidad", &aliases), "unidad");
    }

    #[test]
    fn empty_unit_stays_empty() {
        let aliases = UnitAliases::default();
        assert_eq!(normalize_unit("", &aliases), "");
        assert_eq!(normalize_unit("   ", &aliases), "");
    }

    #[test]
    fn roundtrips_through_serde_as_plain_map() {
        let aliases = UnitAliases::default();
        let yaml = serde_yaml::to_string(&aliases).expect("serialize");
        let back: UnitAliases = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, aliases);
        assert_eq!(normalize_unit("m²", &back), "m2");
    }
}
