//! `Effects.json` - the per-object `AutoEffectList` table.
//!
//! Each row binds an animation event on some in-game object to a particle
//! resource. On disk the table stores every column for every row; the JSON
//! document strips columns back down to non-default values (`#[serde(default)]`
//! handles re-injecting them), so a hand-written effect only needs to name
//! what it's overriding.

use serde::{Deserialize, Serialize};

use crate::formats::bcsv::{ColumnDef, ColumnType, Row, Table, Value};
use crate::utils::{format_hex_color, parse_hex_color};
use crate::{Error, Result};

const AFFECT_FLAGS: [(u32, &str); 3] = [(0x1, "T"), (0x2, "R"), (0x4, "S")];
const FOLLOW_FLAGS: [(u32, &str); 3] = [(0x1, "T"), (0x2, "R"), (0x4, "S")];

fn flags_to_slash_string(value: u32, flags: &[(u32, &str)]) -> String {
    flags
        .iter()
        .filter(|(bit, _)| value & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join("/")
}

fn slash_string_to_flags(s: &str, flags: &[(u32, &str)]) -> Result<u32> {
    if s.is_empty() {
        return Ok(0);
    }
    s.split('/').try_fold(0u32, |acc, part| {
        flags
            .iter()
            .find(|(_, name)| *name == part)
            .map(|(bit, _)| acc | bit)
            .ok_or(Error::Parse("unknown Affect/Follow flag name"))
    })
}

/// The nine named `DrawOrder` values, in wire-integer order.
const DRAW_ORDERS: [(i32, &str); 9] = [
    (0, "3D"),
    (1, "PAUSE_IGNORE"),
    (2, "INDIRECT"),
    (3, "AFTER_INDIRECT"),
    (4, "BLOOM_EFFECT"),
    (5, "AFTER_IMAGE_EFFECT"),
    (6, "2D"),
    (7, "2D_PAUSE_IGNORE"),
    (8, "FOR_2D_MODEL"),
];

/// Wire value written for a JSON `draw_order` of `""` (column absent). Note
/// this coincides with `"3D"`'s own wire value - reading a row back always
/// yields the literal name for whichever integer is actually stored (see
/// `draw_order_to_name`), so a freshly-authored `""` entry dumps back out as
/// `"3D"` once it has round-tripped through a table; the two are only
/// distinguished at the point a brand-new JSON document omits the key.
const DEFAULT_DRAW_ORDER: i32 = 0;

fn draw_order_to_name(value: i32) -> String {
    DRAW_ORDERS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, name)| (*name).to_owned())
        .unwrap_or_else(|| value.to_string())
}

fn name_to_draw_order(s: &str) -> i32 {
    if s.is_empty() {
        return DEFAULT_DRAW_ORDER;
    }
    DRAW_ORDERS
        .iter()
        .find(|(_, name)| *name == s)
        .map(|(v, _)| *v)
        .unwrap_or_else(|| s.parse().unwrap_or(DEFAULT_DRAW_ORDER))
}

fn join_comma(names: &[String]) -> String {
    names.join(",")
}

fn split_comma(s: &str) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split(',').map(str::to_owned).collect()
    }
}

fn join_space(names: &[String]) -> String {
    names.join(" ")
}

fn split_space(s: &str) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split(' ').map(str::to_owned).collect()
    }
}

fn default_color() -> String {
    "#ffffff".to_owned()
}

fn is_default_color(s: &str) -> bool {
    s == "#ffffff"
}

fn default_end_frame() -> i32 {
    -1
}

fn is_default_end_frame(v: &i32) -> bool {
    *v == -1
}

fn default_one() -> f32 {
    1.0
}

fn is_default_one(v: &f32) -> bool {
    *v == 1.0
}

fn is_zero_u32<T: PartialEq + Default>(v: &T) -> bool {
    *v == T::default()
}

fn is_empty_vec(v: &[String]) -> bool {
    v.is_empty()
}

/// One `AutoEffectList` row, with Rust-native defaults matching the BCSV
/// schema's implicit ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub group_name: String,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub anim_name: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub continue_anim_end: i32,
    pub unique_name: String,
    pub effect_name: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub joint_name: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub offset_x: f32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub offset_y: f32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub offset_z: f32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub start_frame: i32,
    #[serde(default = "default_end_frame", skip_serializing_if = "is_default_end_frame")]
    pub end_frame: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub affect: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub follow: String,
    #[serde(default = "default_one", skip_serializing_if = "is_default_one")]
    pub scale_value: f32,
    #[serde(default = "default_one", skip_serializing_if = "is_default_one")]
    pub rate_value: f32,
    #[serde(default = "default_color", skip_serializing_if = "is_default_color")]
    pub prm_color: String,
    #[serde(default = "default_color", skip_serializing_if = "is_default_color")]
    pub env_color: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub light_affect_value: f32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub draw_order: String,
}

fn color_to_int(rgba: [u8; 4]) -> i32 {
    u32::from_be_bytes(rgba) as i32
}

fn int_to_color(v: i32) -> [u8; 4] {
    (v as u32).to_be_bytes()
}

/// Column layout for `AutoEffectList.bcsv`. `Affect` and `Follow` share one
/// byte via disjoint masks, the way the format packs adjacent small
/// bitfields.
pub fn schema() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("GroupName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 0),
        ColumnDef::new("AnimName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 4),
        ColumnDef::new("UniqueName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 8),
        ColumnDef::new("EffectName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 12),
        ColumnDef::new("ParentName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 16),
        ColumnDef::new("JointName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 20),
        ColumnDef::new("OffsetX", ColumnType::Float, 0xFFFFFFFF, 0, 24),
        ColumnDef::new("OffsetY", ColumnType::Float, 0xFFFFFFFF, 0, 28),
        ColumnDef::new("OffsetZ", ColumnType::Float, 0xFFFFFFFF, 0, 32),
        ColumnDef::new("StartFrame", ColumnType::Long, 0xFFFFFFFF, 0, 36),
        ColumnDef::new("EndFrame", ColumnType::Long, 0xFFFFFFFF, 0, 40),
        ColumnDef::new("ScaleValue", ColumnType::Float, 0xFFFFFFFF, 0, 44),
        ColumnDef::new("RateValue", ColumnType::Float, 0xFFFFFFFF, 0, 48),
        ColumnDef::new("PrmColor", ColumnType::Long, 0xFFFFFFFF, 0, 52),
        ColumnDef::new("EnvColor", ColumnType::Long, 0xFFFFFFFF, 0, 56),
        ColumnDef::new("LightAffectValue", ColumnType::Float, 0xFFFFFFFF, 0, 60),
        ColumnDef::new("ContinueAnimEnd", ColumnType::Short, 0xFFFF, 0, 64),
        ColumnDef::new("DrawOrder", ColumnType::Short, 0xFFFF, 0, 66),
        ColumnDef::new("Affect", ColumnType::Char, 0x07, 0, 68),
        ColumnDef::new("Follow", ColumnType::Char, 0x38, 3, 68),
    ]
}

fn str_col(row: &Row, name: &str) -> Result<String> {
    row.get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::UnknownColumn(name.to_owned()))
}

fn int_col(row: &Row, name: &str) -> Result<i32> {
    row.get(name)
        .and_then(Value::as_int)
        .ok_or_else(|| Error::UnknownColumn(name.to_owned()))
}

fn float_col(row: &Row, name: &str) -> Result<f32> {
    row.get(name)
        .and_then(Value::as_float)
        .ok_or_else(|| Error::UnknownColumn(name.to_owned()))
}

impl EffectEntry {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("GroupName".into(), Value::Str(self.group_name.clone()));
        row.insert("AnimName".into(), Value::Str(join_comma(&self.anim_name)));
        row.insert("UniqueName".into(), Value::Str(self.unique_name.clone()));
        row.insert("EffectName".into(), Value::Str(join_space(&self.effect_name)));
        row.insert("ParentName".into(), Value::Str(self.parent_name.clone()));
        row.insert("JointName".into(), Value::Str(self.joint_name.clone()));
        row.insert("OffsetX".into(), Value::Float(self.offset_x));
        row.insert("OffsetY".into(), Value::Float(self.offset_y));
        row.insert("OffsetZ".into(), Value::Float(self.offset_z));
        row.insert("StartFrame".into(), Value::Int(self.start_frame));
        row.insert("EndFrame".into(), Value::Int(self.end_frame));
        row.insert("ScaleValue".into(), Value::Float(self.scale_value));
        row.insert("RateValue".into(), Value::Float(self.rate_value));
        row.insert(
            "PrmColor".into(),
            Value::Int(color_to_int(parse_hex_color(&self.prm_color).unwrap_or([255, 255, 255, 255]))),
        );
        row.insert(
            "EnvColor".into(),
            Value::Int(color_to_int(parse_hex_color(&self.env_color).unwrap_or([255, 255, 255, 255]))),
        );
        row.insert("LightAffectValue".into(), Value::Float(self.light_affect_value));
        row.insert("ContinueAnimEnd".into(), Value::Int(self.continue_anim_end));
        row.insert("DrawOrder".into(), Value::Int(name_to_draw_order(&self.draw_order)));
        row.insert(
            "Affect".into(),
            Value::Int(slash_string_to_flags(&self.affect, &AFFECT_FLAGS).unwrap_or(0) as i32),
        );
        row.insert(
            "Follow".into(),
            Value::Int(slash_string_to_flags(&self.follow, &FOLLOW_FLAGS).unwrap_or(0) as i32),
        );
        row
    }

    pub fn from_row(row: &Row) -> Result<Self> {
        let affect_flags = int_col(row, "Affect")? as u32;
        let follow_flags = int_col(row, "Follow")? as u32;
        Ok(Self {
            group_name: str_col(row, "GroupName")?,
            anim_name: split_comma(&str_col(row, "AnimName")?),
            continue_anim_end: int_col(row, "ContinueAnimEnd")?,
            unique_name: str_col(row, "UniqueName")?,
            effect_name: split_space(&str_col(row, "EffectName")?),
            parent_name: str_col(row, "ParentName")?,
            joint_name: str_col(row, "JointName")?,
            offset_x: float_col(row, "OffsetX")?,
            offset_y: float_col(row, "OffsetY")?,
            offset_z: float_col(row, "OffsetZ")?,
            start_frame: int_col(row, "StartFrame")?,
            end_frame: int_col(row, "EndFrame")?,
            affect: flags_to_slash_string(affect_flags, &AFFECT_FLAGS),
            follow: flags_to_slash_string(follow_flags, &FOLLOW_FLAGS),
            scale_value: float_col(row, "ScaleValue")?,
            rate_value: float_col(row, "RateValue")?,
            prm_color: format_hex_color(int_to_color(int_col(row, "PrmColor")?)),
            env_color: format_hex_color(int_to_color(int_col(row, "EnvColor")?)),
            light_affect_value: float_col(row, "LightAffectValue")?,
            draw_order: draw_order_to_name(int_col(row, "DrawOrder")?),
        })
    }
}

/// Build an `AutoEffectList` table from a document's effect list.
pub fn entries_to_table(entries: &[EffectEntry]) -> Table {
    Table {
        columns: schema(),
        rows: entries.iter().map(EffectEntry::to_row).collect(),
    }
}

/// Recover a document's effect list from a parsed `AutoEffectList` table.
pub fn table_to_entries(table: &Table) -> Result<Vec<EffectEntry>> {
    table.rows.iter().map(EffectEntry::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_entry() -> EffectEntry {
        EffectEntry {
            group_name: "Kuribo".to_owned(),
            anim_name: Vec::new(),
            continue_anim_end: 0,
            unique_name: "X".to_owned(),
            effect_name: vec!["Smoke".to_owned()],
            parent_name: String::new(),
            joint_name: String::new(),
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
            start_frame: 0,
            end_frame: -1,
            affect: String::new(),
            follow: String::new(),
            scale_value: 1.0,
            rate_value: 1.0,
            prm_color: "#ffffff".to_owned(),
            env_color: "#ffffff".to_owned(),
            light_affect_value: 0.0,
            draw_order: String::new(),
        }
    }

    #[test]
    fn minimal_entry_serializes_with_only_required_fields() {
        let json = serde_json::to_value(minimal_entry()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["group_name"], "Kuribo");
        assert_eq!(obj["unique_name"], "X");
        assert_eq!(obj["effect_name"], serde_json::json!(["Smoke"]));
    }

    #[test]
    fn round_trips_through_bcsv_bytes() {
        let mut entry = minimal_entry();
        entry.anim_name = vec!["Walk".to_owned(), "Run".to_owned()];
        entry.affect = "T/S".to_owned();
        entry.follow = "R".to_owned();
        entry.draw_order = "3D".to_owned();
        entry.prm_color = "#112233".to_owned();

        let table = entries_to_table(&[entry.clone()]);
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        let back = table_to_entries(&parsed).unwrap();
        assert_eq!(back, vec![entry]);
    }

    #[test]
    fn affect_and_follow_share_a_byte_without_interference() {
        let mut entry = minimal_entry();
        entry.affect = "S".to_owned();
        entry.follow = "T/R".to_owned();
        let table = entries_to_table(&[entry.clone()]);
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        let back = table_to_entries(&parsed).unwrap();
        assert_eq!(back[0].affect, "S");
        assert_eq!(back[0].follow, "T/R");
    }

    #[test]
    fn affect_accepts_any_order_and_normalizes_to_trs() {
        assert_eq!(slash_string_to_flags("S/T/R", &AFFECT_FLAGS).unwrap(), 0b111);
        assert_eq!(flags_to_slash_string(0b111, &AFFECT_FLAGS), "T/R/S");
    }

    #[test]
    fn every_draw_order_name_round_trips_to_its_stated_integer() {
        for &(value, name) in &DRAW_ORDERS {
            assert_eq!(draw_order_to_name(value), name);
            assert_eq!(name_to_draw_order(name), value);
        }
    }

    #[test]
    fn unknown_draw_order_int_round_trips_numerically() {
        let mut entry = minimal_entry();
        entry.draw_order = "99".to_owned();
        let row = entry.to_row();
        assert_eq!(row["DrawOrder"], Value::Int(99));
        assert_eq!(draw_order_to_name(99), "99");
    }

    #[test]
    fn anim_name_comma_joined_effect_name_space_joined_on_wire() {
        let mut entry = minimal_entry();
        entry.anim_name = vec!["Walk".to_owned(), "Run".to_owned()];
        entry.effect_name = vec!["Smoke".to_owned(), "Spark".to_owned()];
        let row = entry.to_row();
        assert_eq!(row["AnimName"], Value::Str("Walk,Run".to_owned()));
        assert_eq!(row["EffectName"], Value::Str("Smoke Spark".to_owned()));
    }
}
