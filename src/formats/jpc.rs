//! `JPC` - the outer particle container.
//!
//! A JPC file is a fixed header naming how many resources and textures
//! follow, the resources' block chains back to back, and finally a texture
//! table holding one `BTI` slab per distinct texture. Resources reference
//! textures by index into this table; the same texture index may be
//! referenced from more than one resource, so the table is built
//! name-deduplicated rather than one-entry-per-reference.

use std::collections::HashMap;

use crate::formats::bti::Texture;
use crate::formats::jpa::Resource;
use crate::stream::{Reader, Writer};
use crate::{Error, Result};

const MAGIC: &[u8; 8] = b"JPAC2-10";

/// A decoded JPC container: its resources and the shared texture table they
/// reference by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub resources: Vec<Resource>,
    pub textures: Vec<Texture>,
}

impl Container {
    /// Decode a full container: header, resource chains, texture table.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);

        if r.bytes(8)? != &MAGIC[..] {
            return Err(Error::InvalidMagic);
        }
        let resource_count = r.u16()?;
        let texture_count = r.u16()?;
        let _reserved = r.u32()?;

        let mut resources = Vec::with_capacity(resource_count as usize);
        for _ in 0..resource_count {
            resources.push(Resource::parse_from(&mut r)?);
        }

        let mut textures = Vec::with_capacity(texture_count as usize);
        for _ in 0..texture_count {
            let tag = r.tag4()?;
            if &tag != b"TEX1" {
                return Err(Error::UnknownTag(tag));
            }
            let len = r.u32()? as usize;
            let body = r.bytes(len)?;
            textures.push(Texture::parse(body)?);
            r.align_to(32)?;
        }

        Ok(Self { resources, textures })
    }

    /// Encode the container: header, resource chains in order, then the
    /// texture table, each entry wrapped in its own `TEX1` block header.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();

        w.bytes_raw(MAGIC);
        w.u16(self.resources.len() as u16);
        w.u16(self.textures.len() as u16);
        w.u32(0);

        for resource in &self.resources {
            w.bytes_raw(&resource.encode());
        }

        for texture in &self.textures {
            let body = texture.encode();
            w.tag4(b"TEX1");
            w.u32(body.len() as u32);
            w.bytes_raw(&body);
            w.align_to(32);
        }

        w.into_bytes()
    }

    /// Deduplicate `textures` by byte content, rewriting every resource's
    /// texture-index list to point at the deduplicated table.
    ///
    /// `pack` builds resources and textures independently from the
    /// document form, so it's normal to end up with the same texture
    /// appended once per particle that uses it; this collapses those
    /// duplicates before encoding.
    pub fn dedupe_textures(&mut self) {
        let mut seen: HashMap<Vec<u8>, u16> = HashMap::new();
        let mut deduped = Vec::new();
        let mut remap = HashMap::new();

        for (old_index, texture) in self.textures.iter().enumerate() {
            let key = texture.encode();
            let new_index = *seen.entry(key).or_insert_with(|| {
                deduped.push(texture.clone());
                (deduped.len() - 1) as u16
            });
            remap.insert(old_index as u16, new_index);
        }

        for resource in &mut self.resources {
            for idx in &mut resource.textures {
                if let Some(&new_index) = remap.get(idx) {
                    *idx = new_index;
                }
            }
        }

        self.textures = deduped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::jpa::blocks::{BaseShape, Dynamics, ExtraShape, Vec3};

    fn sample_texture(byte: u8) -> Texture {
        Texture {
            format: 0x0E,
            wrap_s: 0,
            wrap_t: 0,
            palette_format: 0,
            palette_count: 0,
            palette_offset: 0,
            width: 32,
            height: 32,
            min_filter: 1,
            mag_filter: 1,
            mipmap_count: 1,
            lod_bias: 0,
            payload: vec![byte; 512],
        }
    }

    fn sample_resource(textures: Vec<u16>) -> Resource {
        Resource {
            dynamics: Dynamics {
                flags: 0,
                emitter_translation: Vec3::default(),
                emitter_rotation: Vec3::default(),
                emitter_scale: Vec3 { x: 1.0, y: 1.0, z: 1.0 },
                init_velocity: 1.0,
                init_velocity_random: 0.0,
                spread: 0.0,
                rate: 1.0,
                rate_random: 0.0,
                life_time: 30,
                life_time_random: 0,
                volume_size: 0.0,
                volume_sweep: 0.0,
                volume_min_rad: 0.0,
                divider: 1,
                rate_step: 0,
                max_frame: -1,
                start_frame: 0,
                emitter_life: 0,
                air_resist: 1.0,
                moment_random: 0.0,
                gravity: Vec3::default(),
            },
            fields: vec![],
            keys: vec![],
            base_shape: BaseShape {
                shape_type: 0,
                dir_type: 0,
                rot_type: 0,
                plane_type: 0,
                flags: 0,
                color_prm: [255, 255, 255, 255],
                color_env: [255, 255, 255, 255],
                base_size: (1.0, 1.0),
                blend_mode: 0,
                blend_src: 0,
                blend_dst: 0,
                blend_logic_op: 0,
                z_compare: 0,
                z_write: 0,
                alpha_compare_mode0: 0,
                alpha_ref0: 0,
                texture_index: 0,
                tex_idx_anim: None,
            },
            extra_shape: ExtraShape {
                scale_in_timing: 0.0,
                scale_out_timing: 0.0,
                scale_in_value: 1.0,
                scale_out_value: 1.0,
                scale_anm_max_frame: 0,
                alpha_in_timing: 0.0,
                alpha_out_timing: 0.0,
                alpha_in_value: 1.0,
                alpha_base_value: 1.0,
                alpha_out_value: 1.0,
                rotate_speed: 0.0,
                rotate_angle_random: 0.0,
                rotate_speed_random: 0.0,
                rotate_direction: 0,
            },
            child_shape: None,
            ex_tex_shape: None,
            textures,
        }
    }

    #[test]
    fn round_trips_multi_resource_container() {
        let container = Container {
            resources: vec![sample_resource(vec![0]), sample_resource(vec![1])],
            textures: vec![sample_texture(1), sample_texture(2)],
        };
        let bytes = container.encode();
        let decoded = Container::parse(&bytes).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn empty_container_round_trips() {
        let container = Container {
            resources: vec![],
            textures: vec![],
        };
        let bytes = container.encode();
        let decoded = Container::parse(&bytes).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = Container {
            resources: vec![],
            textures: vec![],
        }
        .encode();
        bytes[0] = b'X';
        assert!(matches!(Container::parse(&bytes), Err(Error::InvalidMagic)));
    }

    #[test]
    fn dedupe_collapses_identical_textures_and_remaps_indices() {
        let mut container = Container {
            resources: vec![sample_resource(vec![0]), sample_resource(vec![1])],
            textures: vec![sample_texture(9), sample_texture(9)],
        };
        container.dedupe_textures();
        assert_eq!(container.textures.len(), 1);
        assert_eq!(container.resources[0].textures, vec![0]);
        assert_eq!(container.resources[1].textures, vec![0]);
    }
}
