//! `JPA` - a single particle resource.
//!
//! A resource is a chain of blocks, each prefixed by an 8-byte header (a
//! 4-byte tag and a `u32` byte length covering the header itself), padded
//! to a 4-byte boundary between entries. [`blocks`] holds the per-tag
//! layout descriptors; this module drives the chain itself: reading blocks
//! until the chain is exhausted and slotting each into the matching
//! [`Resource`] field by tag, and writing them back out in the fixed
//! canonical order real JPAC tooling expects.

pub mod blocks;

use crate::stream::{Reader, Writer};
use crate::{Error, Result};
use blocks::{BaseShape, ChildShape, Dynamics, ExTexShape, ExtraShape, Field, KeyBlock, TexTerminator};

const BLOCK_HEADER_LEN: usize = 8;
const BLOCK_ALIGN: usize = 4;

/// An in-memory particle resource: the decoded form of one JPA block chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub dynamics: Dynamics,
    pub fields: Vec<Field>,
    pub keys: Vec<KeyBlock>,
    pub base_shape: BaseShape,
    pub extra_shape: ExtraShape,
    pub child_shape: Option<ChildShape>,
    pub ex_tex_shape: Option<ExTexShape>,
    /// Texture-pool indices this resource references, in the order the
    /// terminator block recorded them.
    pub textures: Vec<u16>,
}

impl Resource {
    /// Decode a resource's full block chain.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);
        Self::parse_from(&mut r)
    }

    /// Decode a resource's block chain from a shared cursor, stopping once
    /// the `TEX1` terminator is consumed. Used by the JPC container codec
    /// to read consecutive resources out of one buffer without having to
    /// slice each one out first.
    pub(crate) fn parse_from(r: &mut Reader) -> Result<Self> {
        let mut dynamics = None;
        let mut fields = Vec::new();
        let mut keys = Vec::new();
        let mut base_shape = None;
        let mut extra_shape = None;
        let mut child_shape = None;
        let mut ex_tex_shape = None;
        let mut textures = None;

        loop {
            let tag = r.tag4()?;
            let len = r.u32()? as usize;
            if len < BLOCK_HEADER_LEN {
                return Err(Error::Parse("block length shorter than its own header"));
            }
            let body_len = len - BLOCK_HEADER_LEN;
            let body = r.bytes(body_len)?;
            let mut br = Reader::new(body);

            match &tag {
                Dynamics::TAG => dynamics = Some(Dynamics::read(&mut br)?),
                Field::TAG => fields.push(Field::read(&mut br)?),
                KeyBlock::TAG => keys.push(KeyBlock::read(&mut br)?),
                BaseShape::TAG => base_shape = Some(BaseShape::read(&mut br)?),
                ExtraShape::TAG => extra_shape = Some(ExtraShape::read(&mut br)?),
                ChildShape::TAG => child_shape = Some(ChildShape::read(&mut br)?),
                ExTexShape::TAG => ex_tex_shape = Some(ExTexShape::read(&mut br)?),
                TexTerminator::TAG => {
                    textures = Some(TexTerminator::read(&mut br)?.indices);
                    // The terminator always ends the chain.
                    break;
                }
                _ => {
                    // Unrecognized tag with a well-formed length: skip it
                    // rather than failing the whole resource.
                }
            }

            r.align_to(BLOCK_ALIGN)?;
        }

        Ok(Self {
            dynamics: dynamics.ok_or(Error::MissingBlock("BEM1"))?,
            fields,
            keys,
            base_shape: base_shape.ok_or(Error::MissingBlock("BSP1"))?,
            extra_shape: extra_shape.ok_or(Error::MissingBlock("ESP1"))?,
            child_shape,
            ex_tex_shape,
            textures: textures.ok_or(Error::MissingBlock("TEX1"))?,
        })
    }

    /// Encode the resource back into its canonical block chain order:
    /// Dynamics, Fields, Keys, BaseShape, ExtraShape, ChildShape?,
    /// ExTexShape?, then the TEX1 terminator.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();

        write_block(&mut w, Dynamics::TAG, |w| self.dynamics.write(w));
        for field in &self.fields {
            write_block(&mut w, Field::TAG, |w| field.write(w));
        }
        for key in &self.keys {
            write_block(&mut w, KeyBlock::TAG, |w| key.write(w));
        }
        write_block(&mut w, BaseShape::TAG, |w| self.base_shape.write(w));
        write_block(&mut w, ExtraShape::TAG, |w| self.extra_shape.write(w));
        if let Some(child) = &self.child_shape {
            write_block(&mut w, ChildShape::TAG, |w| child.write(w));
        }
        if let Some(ex_tex) = &self.ex_tex_shape {
            write_block(&mut w, ExTexShape::TAG, |w| ex_tex.write(w));
        }
        write_block(&mut w, TexTerminator::TAG, |w| {
            TexTerminator {
                indices: self.textures.clone(),
            }
            .write(w)
        });

        w.into_bytes()
    }
}

/// Write one block: tag, backpatched length covering the 8-byte header,
/// body, then 4-byte alignment padding.
fn write_block(w: &mut Writer, tag: &[u8; 4], body: impl FnOnce(&mut Writer)) {
    w.tag4(tag);
    let len_at = w.placeholder_u32();
    body(w);
    let total = w.position() - len_at + 4;
    w.patch_u32(len_at, total as u32);
    w.align_to(BLOCK_ALIGN);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks::Vec3;

    fn sample_dynamics() -> Dynamics {
        Dynamics {
            flags: 0x01,
            emitter_translation: Vec3 { x: 0.0, y: 1.0, z: 0.0 },
            emitter_rotation: Vec3::default(),
            emitter_scale: Vec3 { x: 1.0, y: 1.0, z: 1.0 },
            init_velocity: 2.5,
            init_velocity_random: 0.1,
            spread: 0.0,
            rate: 1.0,
            rate_random: 0.0,
            life_time: 60,
            life_time_random: 0,
            volume_size: 10.0,
            volume_sweep: 0.0,
            volume_min_rad: 0.0,
            divider: 1,
            rate_step: 0,
            max_frame: -1,
            start_frame: 0,
            emitter_life: 0,
            air_resist: 1.0,
            moment_random: 0.0,
            gravity: Vec3 { x: 0.0, y: -9.8, z: 0.0 },
        }
    }

    fn sample_base_shape(with_anim: bool) -> BaseShape {
        BaseShape {
            shape_type: 2,
            dir_type: 0,
            rot_type: 0,
            plane_type: 0,
            flags: if with_anim { 0x2 } else { 0 },
            color_prm: [0xFF, 0xFF, 0xFF, 0xFF],
            color_env: [0x80, 0x80, 0x80, 0xFF],
            base_size: (1.0, 1.0),
            blend_mode: 1,
            blend_src: 4,
            blend_dst: 5,
            blend_logic_op: 0,
            z_compare: 1,
            z_write: 0,
            alpha_compare_mode0: 0,
            alpha_ref0: 0,
            texture_index: 0,
            tex_idx_anim: with_anim.then(|| vec![0, 1, 2]),
        }
    }

    fn sample_extra_shape() -> ExtraShape {
        ExtraShape {
            scale_in_timing: 0.0,
            scale_out_timing: 1.0,
            scale_in_value: 1.0,
            scale_out_value: 0.0,
            scale_anm_max_frame: 60,
            alpha_in_timing: 0.0,
            alpha_out_timing: 1.0,
            alpha_in_value: 1.0,
            alpha_base_value: 1.0,
            alpha_out_value: 0.0,
            rotate_speed: 0.0,
            rotate_angle_random: 0.0,
            rotate_speed_random: 0.0,
            rotate_direction: 0,
        }
    }

    fn sample_resource(with_anim: bool) -> Resource {
        Resource {
            dynamics: sample_dynamics(),
            fields: vec![Field {
                flags: 0,
                fade_in: 0.0,
                fade_out: 0.0,
                enable_frame: 0,
                disable_frame: 0,
                kind: blocks::FieldKind::Gravity {
                    magnitude: 1.0,
                    direction: Vec3 { x: 0.0, y: -1.0, z: 0.0 },
                },
            }],
            keys: vec![KeyBlock {
                target: 4,
                is_loop: false,
                keys: vec![blocks::Key {
                    time: 0.0,
                    value: 1.0,
                    tangent_in: 0.0,
                    tangent_out: 0.0,
                }],
            }],
            base_shape: sample_base_shape(with_anim),
            extra_shape: sample_extra_shape(),
            child_shape: None,
            ex_tex_shape: None,
            textures: vec![0, 3],
        }
    }

    #[test]
    fn round_trips_through_encode_and_parse() {
        for with_anim in [false, true] {
            let resource = sample_resource(with_anim);
            let bytes = resource.encode();
            let decoded = Resource::parse(&bytes).unwrap();
            assert_eq!(decoded, resource);
        }
    }

    #[test]
    fn blocks_align_to_four_bytes() {
        let resource = sample_resource(true);
        let bytes = resource.encode();
        // BaseShape's tex_idx_anim tail (count byte + 3 indices = 4 bytes)
        // lands the block on a 4-byte boundary already, so encode() must not
        // have tacked on extra padding beyond what's needed for the chain.
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn missing_dynamics_block_is_rejected() {
        let resource = sample_resource(false);
        let mut bytes = resource.encode();
        // Corrupt the BEM1 tag so the chain no longer contains it.
        bytes[0..4].copy_from_slice(b"XXX1");
        let err = Resource::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::MissingBlock("BEM1")));
    }

    #[test]
    fn unknown_tag_is_skipped_not_fatal() {
        let resource = sample_resource(false);
        let mut w = Writer::new();
        // An unrecognized but well-formed block ahead of the real chain.
        write_block(&mut w, b"TDB1", |w| w.bytes_raw(&[0u8; 4]));
        w.bytes_raw(&resource.encode());
        let decoded = Resource::parse(&w.into_bytes()).unwrap();
        assert_eq!(decoded, resource);
    }
}
