//! **jpakit** - a bidirectional codec for Nintendo's JPAC 2-10 particle
//! container format, the BCSV tabular format it embeds, and the BTI
//! texture format its resources reference, plus a human-editable JSON/BTI
//! document representation of the whole thing.
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`stream`]  | Big-endian [`stream::Reader`]/[`stream::Writer`] cursors |
//! | [`pool`]    | Content-addressed [`pool::StringPool`] used by BCSV |
//! | [`formats::bcsv`] | BCSV tabular format codec |
//! | [`formats::jpa`]  | JPA particle resource block chain codec |
//! | [`formats::jpc`]  | JPC container codec (resources + texture table) |
//! | [`formats::bti`]  | BTI texture header/payload codec |
//! | [`doc`]     | JSON/BTI document translator |

pub mod doc;
pub mod error;
pub mod formats;
pub mod pool;
pub mod stream;
pub mod utils;

pub use error::{Error, Result};
