//! `Particles.json` - the ordered particle name list, plus its on-disk
//! sibling `ParticleNames.bcsv`.
//!
//! `ParticleNames.bcsv` has a single `StringOffset` column (`name`); its row
//! order is the particle index space every other table (JPC resource order,
//! `AutoEffectList`'s implicit particle references) is keyed against. This
//! module only handles that one table; associating a name with its JPC
//! resource is the caller's job, since the pairing is purely positional (row
//! *i* names resource *i*). [`Index`] is `Particles.json`'s own top-level
//! shape: the same particle name list alongside the texture name list, both
//! positional against their respective pools.

use serde::{Deserialize, Serialize};

use crate::formats::bcsv::{ColumnDef, ColumnType, Row, Table, Value};
use crate::{Error, Result};

/// `Particles.json`'s top-level shape: the particle name list (positional
/// against JPC resource order, mirroring `ParticleNames.bcsv`) and the
/// texture name list (positional against the JPC texture pool).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub particles: Vec<String>,
    pub textures: Vec<String>,
}

fn schema() -> Vec<ColumnDef> {
    vec![ColumnDef::new("name", ColumnType::StringOffset, 0xFFFFFFFF, 0, 0)]
}

/// Build a `ParticleNames` table from an ordered name list.
pub fn names_to_table(names: &[String]) -> Table {
    let rows = names
        .iter()
        .map(|name| {
            let mut row = Row::new();
            row.insert("name".to_owned(), Value::Str(name.clone()));
            row
        })
        .collect();
    Table {
        columns: schema(),
        rows,
    }
}

/// Recover the ordered name list from a parsed `ParticleNames` table.
pub fn table_to_names(table: &Table) -> Result<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            row.get("name")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| Error::UnknownColumn("name".to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bcsv_bytes() {
        let names = vec!["Smoke".to_owned(), "Kuribo".to_owned(), "Spark".to_owned()];
        let table = names_to_table(&names);
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        assert_eq!(table_to_names(&parsed).unwrap(), names);
    }

    #[test]
    fn empty_list_round_trips() {
        let table = names_to_table(&[]);
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        assert!(table_to_names(&parsed).unwrap().is_empty());
    }

    #[test]
    fn index_serializes_as_particles_and_textures_arrays() {
        let index = Index {
            particles: vec!["Test00".to_owned()],
            textures: vec!["mr_glow01_i".to_owned()],
        };
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["particles"], serde_json::json!(["Test00"]));
        assert_eq!(json["textures"], serde_json::json!(["mr_glow01_i"]));

        let back: Index = serde_json::from_value(json).unwrap();
        assert_eq!(back, index);
    }
}
