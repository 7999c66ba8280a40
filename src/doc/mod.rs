//! JSON/BTI document representation of a particle effect archive.
//!
//! A document directory mirrors a JPC archive at three grains:
//! `Particles.json` (the ordered particle name list, [`particles`]),
//! `Effects.json` (the `AutoEffectList` bindings, [`effects`]), and one
//! per-particle JSON file per resource ([`particle_file`]), with textures
//! extracted to sibling `.bti` files named by [`particle_file::texture_filename`].

pub mod effects;
pub mod particle_file;
pub mod particles;
