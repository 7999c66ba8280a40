//! BCSV - hashed-column tabular record format.
//!
//! Used by the particle subsystem for two tables: `ParticleNames.bcsv`
//! (particle index → string identifier) and `AutoEffectList.bcsv`
//! (per-object animation event → particle resource bindings).
//!
//! ## Layout
//! ```text
//! [0x00] Header        (0x20 bytes)
//! [0x20] Column descriptors (ColumnCount × 0x0C bytes)
//! [...]  Row data       (RowCount × RowStride bytes)
//! [...]  String pool    (padded to a 32-byte boundary)
//! ```
//!
//! ## Header (0x20 bytes)
//! ```text
//! [0x00] RowCount            (u32)
//! [0x04] ColumnCount         (u32)
//! [0x08] RowDataOffset       (u32)
//! [0x0C] RowStride           (u32)
//! [0x10] StringPoolOffset    (u32)
//! [0x14] Reserved            (12 bytes)
//! ```
//!
//! ## Column descriptor (0x0C bytes)
//! ```text
//! [0x00] NameHash  (u32, JGadget hash of the column name)
//! [0x04] Bitmask   (u32)
//! [0x08] Offset    (u16, row-relative byte offset)
//! [0x0A] Shift     (u8)
//! [0x0B] Type      (u8)
//! ```
//!
//! Column names are not stored; [`columns::resolve`] reverses the hash
//! against a static dictionary of names this crate knows about.

pub mod columns;

use std::collections::HashMap;

use crate::pool::StringPool;
use crate::stream::{Reader, Writer};
use crate::utils::jgadget_hash;
use crate::{Error, Result};

/// A BCSV cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// BCSV column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Long,
    Float,
    Long2,
    Short,
    Char,
    StringOffset,
}

impl ColumnType {
    fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => ColumnType::Long,
            2 => ColumnType::Float,
            3 => ColumnType::Long2,
            4 => ColumnType::Short,
            5 => ColumnType::Char,
            6 => ColumnType::StringOffset,
            _ => return Err(Error::Parse("unknown BCSV column type tag")),
        })
    }

    fn tag(self) -> u8 {
        match self {
            ColumnType::Long => 0,
            ColumnType::Float => 2,
            ColumnType::Long2 => 3,
            ColumnType::Short => 4,
            ColumnType::Char => 5,
            ColumnType::StringOffset => 6,
        }
    }

    /// Width in bytes of this column's raw storage at its row offset.
    fn width(self) -> usize {
        match self {
            ColumnType::Long | ColumnType::Long2 | ColumnType::Float | ColumnType::StringOffset => 4,
            ColumnType::Short => 2,
            ColumnType::Char => 1,
        }
    }
}

/// A single column descriptor.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Resolved name, or `_0x{hash:08X}` if the hash is unknown.
    pub name: String,
    pub hash: u32,
    pub mask: u32,
    pub shift: u8,
    pub kind: ColumnType,
    pub offset: u16,
}

impl ColumnDef {
    pub fn new(name: &str, kind: ColumnType, mask: u32, shift: u8, offset: u16) -> Self {
        Self {
            name: name.to_owned(),
            hash: jgadget_hash(name),
            mask,
            shift,
            kind,
            offset,
        }
    }

    /// Bit width of the field this column addresses within its mask.
    fn field_bits(&self) -> u32 {
        let shifted = self.mask >> self.shift;
        if shifted == 0 {
            0
        } else {
            32 - shifted.leading_zeros()
        }
    }
}

/// A single row, keyed by column name.
pub type Row = HashMap<String, Value>;

/// A parsed (or to-be-encoded) BCSV table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Row>,
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits == 0 || bits >= 32 {
        return value as i32;
    }
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

impl Table {
    /// Parse a BCSV table from `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);
        let row_count = r.u32()? as usize;
        let column_count = r.u32()? as usize;
        let row_data_offset = r.u32()? as usize;
        let row_stride = r.u32()? as usize;
        let string_pool_offset = r.u32()? as usize;
        let _reserved = r.bytes(12)?;

        let mut columns = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let hash = r.u32()?;
            let mask = r.u32()?;
            let offset = r.u16()?;
            let shift = r.u8()?;
            let kind = ColumnType::from_tag(r.u8()?)?;
            let name = columns::resolve(hash)
                .map(str::to_owned)
                .unwrap_or_else(|| columns::unknown_name(hash));
            columns.push(ColumnDef {
                name,
                hash,
                mask,
                shift,
                kind,
                offset,
            });
        }

        let pool_reader = Reader::at(buf, string_pool_offset);

        let mut rows = Vec::with_capacity(row_count);
        for i in 0..row_count {
            let row_start = row_data_offset + i * row_stride;
            let mut row = Row::with_capacity(columns.len());
            for col in &columns {
                let field_start = row_start + col.offset as usize;
                let mut fr = Reader::at(buf, field_start);
                let value = match col.kind {
                    ColumnType::Float => Value::Float(fr.f32()?),
                    ColumnType::StringOffset => {
                        let off = fr.u32()? as usize;
                        Value::Str(pool_reader.cstring_at(off)?)
                    }
                    _ => {
                        let raw = match col.kind {
                            ColumnType::Char => fr.u8()? as u32,
                            ColumnType::Short => fr.u16()? as u32,
                            _ => fr.u32()?,
                        };
                        let field = (raw & col.mask) >> col.shift;
                        // Only LONG/LONG_2 are true signed 32-bit fields; SHORT
                        // and CHAR mask/shift fields are small bitfields/enums
                        // (Affect, Follow, DrawOrder) and stay unsigned.
                        let value = match col.kind {
                            ColumnType::Long | ColumnType::Long2 => {
                                sign_extend(field, col.field_bits())
                            }
                            _ => field as i32,
                        };
                        Value::Int(value)
                    }
                };
                row.insert(col.name.clone(), value);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Serialize this table back to bytes.
    ///
    /// Column descriptors are emitted in definition order; rows are emitted
    /// in `self.rows` order. The string pool is rebuilt deterministically
    /// (alphabetical by first occurrence, per the crate's string-pool
    /// contract) from the row data being written.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let row_stride = self
            .columns
            .iter()
            .map(|c| c.offset as usize + c.kind.width())
            .max()
            .unwrap_or(0)
            .div_ceil(4)
            * 4;

        let mut pool = StringPool::new();
        let mut row_bytes = vec![0u8; self.rows.len() * row_stride];

        for (i, row) in self.rows.iter().enumerate() {
            let row_start = i * row_stride;
            for col in &self.columns {
                let value = row
                    .get(&col.name)
                    .ok_or_else(|| Error::UnknownColumn(col.name.clone()))?;
                let field_start = row_start + col.offset as usize;
                match col.kind {
                    ColumnType::Float => {
                        let v = value.as_float().ok_or(Error::ValueOutOfRange)?;
                        row_bytes[field_start..field_start + 4].copy_from_slice(&v.to_bits().to_be_bytes());
                    }
                    ColumnType::StringOffset => {
                        let s = value.as_str().ok_or(Error::ValueOutOfRange)?;
                        let off = pool.intern(s);
                        row_bytes[field_start..field_start + 4].copy_from_slice(&off.to_be_bytes());
                    }
                    _ => {
                        let v = value.as_int().ok_or(Error::ValueOutOfRange)?;
                        let bits = col.field_bits();
                        let in_range = match col.kind {
                            ColumnType::Long | ColumnType::Long2 => {
                                if bits >= 32 {
                                    true
                                } else {
                                    let min = -(1i32 << (bits - 1));
                                    let max = (1i32 << (bits - 1)) - 1;
                                    v >= min && v <= max
                                }
                            }
                            _ => {
                                let max = if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 };
                                v >= 0 && (v as u32) <= max
                            }
                        };
                        if !in_range {
                            return Err(Error::ValueOutOfRange);
                        }
                        let raw = ((v as u32) << col.shift) & col.mask;
                        match col.kind {
                            ColumnType::Char => {
                                let existing = row_bytes[field_start];
                                row_bytes[field_start] = existing | raw as u8;
                            }
                            ColumnType::Short => {
                                let existing =
                                    u16::from_be_bytes([row_bytes[field_start], row_bytes[field_start + 1]]);
                                let combined = existing | raw as u16;
                                row_bytes[field_start..field_start + 2]
                                    .copy_from_slice(&combined.to_be_bytes());
                            }
                            _ => {
                                let existing = u32::from_be_bytes([
                                    row_bytes[field_start],
                                    row_bytes[field_start + 1],
                                    row_bytes[field_start + 2],
                                    row_bytes[field_start + 3],
                                ]);
                                let combined = existing | raw;
                                row_bytes[field_start..field_start + 4]
                                    .copy_from_slice(&combined.to_be_bytes());
                            }
                        }
                    }
                }
            }
        }

        let mut w = Writer::new();
        w.u32(self.rows.len() as u32);
        w.u32(self.columns.len() as u32);
        let row_data_offset = 0x20 + self.columns.len() * 12;
        w.u32(row_data_offset as u32);
        w.u32(row_stride as u32);
        let string_pool_offset_at = w.placeholder_u32();
        w.bytes_raw(&[0u8; 12]);

        for col in &self.columns {
            w.u32(col.hash);
            w.u32(col.mask);
            w.u16(col.offset);
            w.u8(col.shift);
            w.u8(col.kind.tag());
        }

        w.bytes_raw(&row_bytes);
        w.align_to(32);
        let string_pool_offset = w.position() as u32;
        w.patch_u32(string_pool_offset_at, string_pool_offset);
        w.bytes_raw(&pool.into_bytes());

        Ok(w.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let columns = vec![
            ColumnDef::new("GroupName", ColumnType::StringOffset, 0xFFFFFFFF, 0, 0),
            ColumnDef::new("StartFrame", ColumnType::Long, 0xFFFFFFFF, 0, 4),
            ColumnDef::new("Affect", ColumnType::Char, 0x07, 0, 8),
            ColumnDef::new("Follow", ColumnType::Char, 0x38, 3, 8),
        ];
        let mut row = Row::new();
        row.insert("GroupName".into(), Value::Str("Kuribo".into()));
        row.insert("StartFrame".into(), Value::Int(-1));
        row.insert("Affect".into(), Value::Int(0b011));
        row.insert("Follow".into(), Value::Int(0b101));
        Table {
            columns,
            rows: vec![row],
        }
    }

    #[test]
    fn round_trips_through_encode_and_parse() {
        let table = sample_table();
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0]["GroupName"], Value::Str("Kuribo".into()));
        assert_eq!(parsed.rows[0]["StartFrame"], Value::Int(-1));
        assert_eq!(parsed.rows[0]["Affect"], Value::Int(0b011));
        assert_eq!(parsed.rows[0]["Follow"], Value::Int(0b101));
    }

    #[test]
    fn disjoint_masks_share_one_byte() {
        let table = sample_table();
        let bytes = table.encode().unwrap();
        // Affect occupies bits 0-2, Follow bits 3-5 of the same byte.
        let row_data_offset = 0x20 + table.columns.len() * 12;
        assert_eq!(bytes[row_data_offset + 8], 0b101_011);
    }

    #[test]
    fn value_out_of_range_is_rejected() {
        let mut table = sample_table();
        table.rows[0].insert("Affect".into(), Value::Int(100));
        assert!(matches!(table.encode(), Err(Error::ValueOutOfRange)));
    }

    #[test]
    fn unknown_column_in_row_is_rejected() {
        let mut table = sample_table();
        table.rows[0].remove("GroupName");
        assert!(matches!(table.encode(), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn unknown_hash_round_trips_as_hex_name() {
        let columns = vec![ColumnDef {
            name: columns::unknown_name(0xDEADBEEF),
            hash: 0xDEADBEEF,
            mask: 0xFFFFFFFF,
            shift: 0,
            kind: ColumnType::Long,
            offset: 0,
        }];
        let mut row = Row::new();
        row.insert("_0xDEADBEEF".into(), Value::Int(7));
        let table = Table {
            columns,
            rows: vec![row],
        };
        let bytes = table.encode().unwrap();
        let parsed = Table::parse(&bytes).unwrap();
        assert_eq!(parsed.columns[0].name, "_0xDEADBEEF");
        assert_eq!(parsed.rows[0]["_0xDEADBEEF"], Value::Int(7));
    }
}
