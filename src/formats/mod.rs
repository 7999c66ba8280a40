//! Codecs for the binary formats a JPA effect archive is built from.
//!
//! Each submodule targets one format and exposes a `parse`/`encode` (or
//! `decode`/`encode`) pair operating on in-memory byte slices rather than
//! `Read + Seek` streams: unlike the Switch container formats this crate's
//! ancestor targeted, JPAC resources are small enough to buffer whole.
//!
//! | Module   | Format | Description |
//! |----------|--------|-------------|
//! | [`bcsv`] | BCSV   | Hashed-column tabular format; backs `ParticleNames.bcsv` and `AutoEffectList.bcsv` |
//! | [`jpa`]  | JPA    | A single particle resource: a chain of tagged, length-prefixed blocks |
//! | [`jpc`]  | JPC    | The outer particle container: a resource table plus a shared texture table |
//! | [`bti`]  | BTI    | Texture header and opaque pixel/palette payload referenced by JPC's texture table |

pub mod bcsv;
pub mod bti;
pub mod jpa;
pub mod jpc;
