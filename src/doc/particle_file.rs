//! Per-particle JSON document: a 1:1, field-complete mirror of
//! [`crate::formats::jpa::Resource`]. Unlike [`super::effects`], no field is
//! ever omitted or defaulted here - a particle's JSON file is meant to be a
//! faithful, fully-explicit view of its block chain for hand-editing.

use serde::{Deserialize, Serialize};

use crate::formats::jpa::blocks::{
    BaseShape, ChildShape, Dynamics, ExTexShape, ExtraShape, Field, FieldKind, Key, KeyBlock, Vec3,
};
use crate::formats::jpa::Resource;
use crate::utils::{format_hex_color, parse_hex_color};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Doc {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vec3Doc {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Doc> for Vec3 {
    fn from(v: Vec3Doc) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsDoc {
    pub flags: u32,
    pub emitter_translation: Vec3Doc,
    pub emitter_rotation: Vec3Doc,
    pub emitter_scale: Vec3Doc,
    pub init_velocity: f32,
    pub init_velocity_random: f32,
    pub spread: f32,
    pub rate: f32,
    pub rate_random: f32,
    pub life_time: u16,
    pub life_time_random: u16,
    pub volume_size: f32,
    pub volume_sweep: f32,
    pub volume_min_rad: f32,
    pub divider: u16,
    pub rate_step: u8,
    pub max_frame: i16,
    pub start_frame: u16,
    pub emitter_life: u16,
    pub air_resist: f32,
    pub moment_random: f32,
    pub gravity: Vec3Doc,
}

impl From<&Dynamics> for DynamicsDoc {
    fn from(d: &Dynamics) -> Self {
        Self {
            flags: d.flags,
            emitter_translation: d.emitter_translation.into(),
            emitter_rotation: d.emitter_rotation.into(),
            emitter_scale: d.emitter_scale.into(),
            init_velocity: d.init_velocity,
            init_velocity_random: d.init_velocity_random,
            spread: d.spread,
            rate: d.rate,
            rate_random: d.rate_random,
            life_time: d.life_time,
            life_time_random: d.life_time_random,
            volume_size: d.volume_size,
            volume_sweep: d.volume_sweep,
            volume_min_rad: d.volume_min_rad,
            divider: d.divider,
            rate_step: d.rate_step,
            max_frame: d.max_frame,
            start_frame: d.start_frame,
            emitter_life: d.emitter_life,
            air_resist: d.air_resist,
            moment_random: d.moment_random,
            gravity: d.gravity.into(),
        }
    }
}

impl From<DynamicsDoc> for Dynamics {
    fn from(d: DynamicsDoc) -> Self {
        Self {
            flags: d.flags,
            emitter_translation: d.emitter_translation.into(),
            emitter_rotation: d.emitter_rotation.into(),
            emitter_scale: d.emitter_scale.into(),
            init_velocity: d.init_velocity,
            init_velocity_random: d.init_velocity_random,
            spread: d.spread,
            rate: d.rate,
            rate_random: d.rate_random,
            life_time: d.life_time,
            life_time_random: d.life_time_random,
            volume_size: d.volume_size,
            volume_sweep: d.volume_sweep,
            volume_min_rad: d.volume_min_rad,
            divider: d.divider,
            rate_step: d.rate_step,
            max_frame: d.max_frame,
            start_frame: d.start_frame,
            emitter_life: d.emitter_life,
            air_resist: d.air_resist,
            moment_random: d.moment_random,
            gravity: d.gravity.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FieldKindDoc {
    Gravity { magnitude: f32, direction: Vec3Doc },
    Air { magnitude: f32, direction: Vec3Doc },
    Magnet { magnitude: f32, position: Vec3Doc },
    Newton { magnitude: f32, position: Vec3Doc, ref_distance: f32 },
    Vortex { inner_speed: f32, outer_speed: f32, axis: Vec3Doc },
    Random { magnitude: f32 },
    Drag { coefficient: f32 },
    Convection { magnitude: f32, direction: Vec3Doc },
    Spin { rotate_speed: f32, axis: Vec3Doc },
}

impl From<&FieldKind> for FieldKindDoc {
    fn from(k: &FieldKind) -> Self {
        match *k {
            FieldKind::Gravity { magnitude, direction } => FieldKindDoc::Gravity {
                magnitude,
                direction: direction.into(),
            },
            FieldKind::Air { magnitude, direction } => FieldKindDoc::Air {
                magnitude,
                direction: direction.into(),
            },
            FieldKind::Magnet { magnitude, position } => FieldKindDoc::Magnet {
                magnitude,
                position: position.into(),
            },
            FieldKind::Newton {
                magnitude,
                position,
                ref_distance,
            } => FieldKindDoc::Newton {
                magnitude,
                position: position.into(),
                ref_distance,
            },
            FieldKind::Vortex {
                inner_speed,
                outer_speed,
                axis,
            } => FieldKindDoc::Vortex {
                inner_speed,
                outer_speed,
                axis: axis.into(),
            },
            FieldKind::Random { magnitude } => FieldKindDoc::Random { magnitude },
            FieldKind::Drag { coefficient } => FieldKindDoc::Drag { coefficient },
            FieldKind::Convection { magnitude, direction } => FieldKindDoc::Convection {
                magnitude,
                direction: direction.into(),
            },
            FieldKind::Spin { rotate_speed, axis } => FieldKindDoc::Spin {
                rotate_speed,
                axis: axis.into(),
            },
        }
    }
}

impl From<FieldKindDoc> for FieldKind {
    fn from(k: FieldKindDoc) -> Self {
        match k {
            FieldKindDoc::Gravity { magnitude, direction } => FieldKind::Gravity {
                magnitude,
                direction: direction.into(),
            },
            FieldKindDoc::Air { magnitude, direction } => FieldKind::Air {
                magnitude,
                direction: direction.into(),
            },
            FieldKindDoc::Magnet { magnitude, position } => FieldKind::Magnet {
                magnitude,
                position: position.into(),
            },
            FieldKindDoc::Newton {
                magnitude,
                position,
                ref_distance,
            } => FieldKind::Newton {
                magnitude,
                position: position.into(),
                ref_distance,
            },
            FieldKindDoc::Vortex {
                inner_speed,
                outer_speed,
                axis,
            } => FieldKind::Vortex {
                inner_speed,
                outer_speed,
                axis: axis.into(),
            },
            FieldKindDoc::Random { magnitude } => FieldKind::Random { magnitude },
            FieldKindDoc::Drag { coefficient } => FieldKind::Drag { coefficient },
            FieldKindDoc::Convection { magnitude, direction } => FieldKind::Convection {
                magnitude,
                direction: direction.into(),
            },
            FieldKindDoc::Spin { rotate_speed, axis } => FieldKind::Spin {
                rotate_speed,
                axis: axis.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub flags: u8,
    pub fade_in: f32,
    pub fade_out: f32,
    pub enable_frame: u16,
    pub disable_frame: u16,
    #[serde(flatten)]
    pub kind: FieldKindDoc,
}

impl From<&Field> for FieldDoc {
    fn from(f: &Field) -> Self {
        Self {
            flags: f.flags,
            fade_in: f.fade_in,
            fade_out: f.fade_out,
            enable_frame: f.enable_frame,
            disable_frame: f.disable_frame,
            kind: (&f.kind).into(),
        }
    }
}

impl From<FieldDoc> for Field {
    fn from(f: FieldDoc) -> Self {
        Self {
            flags: f.flags,
            fade_in: f.fade_in,
            fade_out: f.fade_out,
            enable_frame: f.enable_frame,
            disable_frame: f.disable_frame,
            kind: f.kind.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyDoc {
    pub time: f32,
    pub value: f32,
    pub tangent_in: f32,
    pub tangent_out: f32,
}

impl From<Key> for KeyDoc {
    fn from(k: Key) -> Self {
        Self {
            time: k.time,
            value: k.value,
            tangent_in: k.tangent_in,
            tangent_out: k.tangent_out,
        }
    }
}

impl From<KeyDoc> for Key {
    fn from(k: KeyDoc) -> Self {
        Self {
            time: k.time,
            value: k.value,
            tangent_in: k.tangent_in,
            tangent_out: k.tangent_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBlockDoc {
    pub target: u8,
    pub is_loop: bool,
    pub keys: Vec<KeyDoc>,
}

impl From<&KeyBlock> for KeyBlockDoc {
    fn from(k: &KeyBlock) -> Self {
        Self {
            target: k.target,
            is_loop: k.is_loop,
            keys: k.keys.iter().copied().map(Into::into).collect(),
        }
    }
}

impl From<KeyBlockDoc> for KeyBlock {
    fn from(k: KeyBlockDoc) -> Self {
        Self {
            target: k.target,
            is_loop: k.is_loop,
            keys: k.keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseShapeDoc {
    pub shape_type: u8,
    pub dir_type: u8,
    pub rot_type: u8,
    pub plane_type: u8,
    pub flags: u32,
    pub color_prm: String,
    pub color_env: String,
    pub base_size: (f32, f32),
    pub blend_mode: u8,
    pub blend_src: u8,
    pub blend_dst: u8,
    pub blend_logic_op: u8,
    pub z_compare: u8,
    pub z_write: u8,
    pub alpha_compare_mode0: u8,
    pub alpha_ref0: u8,
    pub texture_index: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_idx_anim: Option<Vec<u8>>,
}

impl From<&BaseShape> for BaseShapeDoc {
    fn from(s: &BaseShape) -> Self {
        Self {
            shape_type: s.shape_type,
            dir_type: s.dir_type,
            rot_type: s.rot_type,
            plane_type: s.plane_type,
            flags: s.flags,
            color_prm: format_hex_color(s.color_prm),
            color_env: format_hex_color(s.color_env),
            base_size: s.base_size,
            blend_mode: s.blend_mode,
            blend_src: s.blend_src,
            blend_dst: s.blend_dst,
            blend_logic_op: s.blend_logic_op,
            z_compare: s.z_compare,
            z_write: s.z_write,
            alpha_compare_mode0: s.alpha_compare_mode0,
            alpha_ref0: s.alpha_ref0,
            texture_index: s.texture_index,
            tex_idx_anim: s.tex_idx_anim.clone(),
        }
    }
}

impl TryFrom<BaseShapeDoc> for BaseShape {
    type Error = Error;

    fn try_from(s: BaseShapeDoc) -> Result<Self> {
        Ok(Self {
            shape_type: s.shape_type,
            dir_type: s.dir_type,
            rot_type: s.rot_type,
            plane_type: s.plane_type,
            flags: s.flags,
            color_prm: parse_hex_color(&s.color_prm).ok_or(Error::Parse("bad color_prm"))?,
            color_env: parse_hex_color(&s.color_env).ok_or(Error::Parse("bad color_env"))?,
            base_size: s.base_size,
            blend_mode: s.blend_mode,
            blend_src: s.blend_src,
            blend_dst: s.blend_dst,
            blend_logic_op: s.blend_logic_op,
            z_compare: s.z_compare,
            z_write: s.z_write,
            alpha_compare_mode0: s.alpha_compare_mode0,
            alpha_ref0: s.alpha_ref0,
            texture_index: s.texture_index,
            tex_idx_anim: s.tex_idx_anim,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraShapeDoc {
    pub scale_in_timing: f32,
    pub scale_out_timing: f32,
    pub scale_in_value: f32,
    pub scale_out_value: f32,
    pub scale_anm_max_frame: u16,
    pub alpha_in_timing: f32,
    pub alpha_out_timing: f32,
    pub alpha_in_value: f32,
    pub alpha_base_value: f32,
    pub alpha_out_value: f32,
    pub rotate_speed: f32,
    pub rotate_angle_random: f32,
    pub rotate_speed_random: f32,
    pub rotate_direction: u8,
}

impl From<&ExtraShape> for ExtraShapeDoc {
    fn from(s: &ExtraShape) -> Self {
        Self {
            scale_in_timing: s.scale_in_timing,
            scale_out_timing: s.scale_out_timing,
            scale_in_value: s.scale_in_value,
            scale_out_value: s.scale_out_value,
            scale_anm_max_frame: s.scale_anm_max_frame,
            alpha_in_timing: s.alpha_in_timing,
            alpha_out_timing: s.alpha_out_timing,
            alpha_in_value: s.alpha_in_value,
            alpha_base_value: s.alpha_base_value,
            alpha_out_value: s.alpha_out_value,
            rotate_speed: s.rotate_speed,
            rotate_angle_random: s.rotate_angle_random,
            rotate_speed_random: s.rotate_speed_random,
            rotate_direction: s.rotate_direction,
        }
    }
}

impl From<ExtraShapeDoc> for ExtraShape {
    fn from(s: ExtraShapeDoc) -> Self {
        Self {
            scale_in_timing: s.scale_in_timing,
            scale_out_timing: s.scale_out_timing,
            scale_in_value: s.scale_in_value,
            scale_out_value: s.scale_out_value,
            scale_anm_max_frame: s.scale_anm_max_frame,
            alpha_in_timing: s.alpha_in_timing,
            alpha_out_timing: s.alpha_out_timing,
            alpha_in_value: s.alpha_in_value,
            alpha_base_value: s.alpha_base_value,
            alpha_out_value: s.alpha_out_value,
            rotate_speed: s.rotate_speed,
            rotate_angle_random: s.rotate_angle_random,
            rotate_speed_random: s.rotate_speed_random,
            rotate_direction: s.rotate_direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildShapeDoc {
    pub shape_type: u8,
    pub dir_type: u8,
    pub rot_type: u8,
    pub flags: u32,
    pub texture_index: u16,
    pub base_size: (f32, f32),
    pub life_time: u16,
    pub rate: u16,
    pub timing: f32,
    pub velocity_inherit_rate: f32,
    pub color_prm: String,
    pub color_env: String,
}

impl From<&ChildShape> for ChildShapeDoc {
    fn from(s: &ChildShape) -> Self {
        Self {
            shape_type: s.shape_type,
            dir_type: s.dir_type,
            rot_type: s.rot_type,
            flags: s.flags,
            texture_index: s.texture_index,
            base_size: s.base_size,
            life_time: s.life_time,
            rate: s.rate,
            timing: s.timing,
            velocity_inherit_rate: s.velocity_inherit_rate,
            color_prm: format_hex_color(s.color_prm),
            color_env: format_hex_color(s.color_env),
        }
    }
}

impl TryFrom<ChildShapeDoc> for ChildShape {
    type Error = Error;

    fn try_from(s: ChildShapeDoc) -> Result<Self> {
        Ok(Self {
            shape_type: s.shape_type,
            dir_type: s.dir_type,
            rot_type: s.rot_type,
            flags: s.flags,
            texture_index: s.texture_index,
            base_size: s.base_size,
            life_time: s.life_time,
            rate: s.rate,
            timing: s.timing,
            velocity_inherit_rate: s.velocity_inherit_rate,
            color_prm: parse_hex_color(&s.color_prm).ok_or(Error::Parse("bad color_prm"))?,
            color_env: parse_hex_color(&s.color_env).ok_or(Error::Parse("bad color_env"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExTexShapeDoc {
    pub flags: u32,
    pub secondary_texture_index: u16,
    pub indirect_texture_mtx: [f32; 6],
    pub scroll: (f32, f32),
    pub secondary_blend_mode: u8,
}

impl From<&ExTexShape> for ExTexShapeDoc {
    fn from(s: &ExTexShape) -> Self {
        Self {
            flags: s.flags,
            secondary_texture_index: s.secondary_texture_index,
            indirect_texture_mtx: s.indirect_texture_mtx,
            scroll: s.scroll,
            secondary_blend_mode: s.secondary_blend_mode,
        }
    }
}

impl From<ExTexShapeDoc> for ExTexShape {
    fn from(s: ExTexShapeDoc) -> Self {
        Self {
            flags: s.flags,
            secondary_texture_index: s.secondary_texture_index,
            indirect_texture_mtx: s.indirect_texture_mtx,
            scroll: s.scroll,
            secondary_blend_mode: s.secondary_blend_mode,
        }
    }
}

/// Full JSON mirror of a [`Resource`]'s block chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleDoc {
    pub dynamics: DynamicsDoc,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
    #[serde(default)]
    pub keys: Vec<KeyBlockDoc>,
    pub base_shape: BaseShapeDoc,
    pub extra_shape: ExtraShapeDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_shape: Option<ChildShapeDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ex_tex_shape: Option<ExTexShapeDoc>,
    /// Texture filenames (`"tex_0000.bti"`-style), in the order the
    /// resource's `TEX1` terminator recorded their pool indices.
    pub textures: Vec<String>,
}

/// Positional name the dump/pack CLI assigns a texture pool index by
/// default (`Particles.json`'s top-level `textures` array is seeded with
/// these unless the user renames them).
pub fn texture_name(index: u16) -> String {
    format!("tex_{index:04}")
}

/// Filename a texture pool index is persisted under (`Textures/<name>.bti`).
pub fn texture_filename(index: u16) -> String {
    format!("{}.bti", texture_name(index))
}

fn parse_texture_filename(name: &str) -> Result<u16> {
    name.strip_prefix("tex_")
        .and_then(|s| s.strip_suffix(".bti"))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::DanglingReference(name.to_owned()))
}

impl From<&Resource> for ParticleDoc {
    fn from(r: &Resource) -> Self {
        Self {
            dynamics: (&r.dynamics).into(),
            fields: r.fields.iter().map(Into::into).collect(),
            keys: r.keys.iter().map(Into::into).collect(),
            base_shape: (&r.base_shape).into(),
            extra_shape: (&r.extra_shape).into(),
            child_shape: r.child_shape.as_ref().map(Into::into),
            ex_tex_shape: r.ex_tex_shape.as_ref().map(Into::into),
            textures: r.textures.iter().map(|&idx| texture_filename(idx)).collect(),
        }
    }
}

impl TryFrom<ParticleDoc> for Resource {
    type Error = Error;

    fn try_from(doc: ParticleDoc) -> Result<Self> {
        let child_shape = doc.child_shape.map(TryFrom::try_from).transpose()?;
        let ex_tex_shape = doc.ex_tex_shape.map(Into::into);
        let textures = doc
            .textures
            .iter()
            .map(|name| parse_texture_filename(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dynamics: doc.dynamics.into(),
            fields: doc.fields.into_iter().map(Into::into).collect(),
            keys: doc.keys.into_iter().map(Into::into).collect(),
            base_shape: doc.base_shape.try_into()?,
            extra_shape: doc.extra_shape.into(),
            child_shape,
            ex_tex_shape,
            textures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::jpa::blocks::Vec3;

    fn sample_resource() -> Resource {
        Resource {
            dynamics: Dynamics {
                flags: 1,
                emitter_translation: Vec3 { x: 0.0, y: 1.0, z: 0.0 },
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
            fields: vec![Field {
                flags: 0,
                fade_in: 0.0,
                fade_out: 0.0,
                enable_frame: 0,
                disable_frame: 0,
                kind: FieldKind::Drag { coefficient: 0.5 },
            }],
            keys: vec![KeyBlock {
                target: 1,
                is_loop: true,
                keys: vec![Key {
                    time: 0.0,
                    value: 1.0,
                    tangent_in: 0.0,
                    tangent_out: 0.0,
                }],
            }],
            base_shape: BaseShape {
                shape_type: 2,
                dir_type: 0,
                rot_type: 0,
                plane_type: 0,
                flags: 0,
                color_prm: [0xFF, 0x00, 0x00, 0xFF],
                color_env: [0x00, 0xFF, 0x00, 0x80],
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
                scale_out_timing: 1.0,
                scale_in_value: 1.0,
                scale_out_value: 0.0,
                scale_anm_max_frame: 0,
                alpha_in_timing: 0.0,
                alpha_out_timing: 1.0,
                alpha_in_value: 1.0,
                alpha_base_value: 1.0,
                alpha_out_value: 0.0,
                rotate_speed: 0.0,
                rotate_angle_random: 0.0,
                rotate_speed_random: 0.0,
                rotate_direction: 0,
            },
            child_shape: None,
            ex_tex_shape: None,
            textures: vec![0, 2],
        }
    }

    #[test]
    fn round_trips_through_doc_and_back() {
        let resource = sample_resource();
        let doc = ParticleDoc::from(&resource);
        let back = Resource::try_from(doc).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn serializes_colors_as_hex_strings() {
        let doc = ParticleDoc::from(&sample_resource());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["base_shape"]["color_prm"], "#ff0000");
        assert_eq!(json["base_shape"]["color_env"], "#00ff0080");
    }

    #[test]
    fn texture_filenames_round_trip_to_indices() {
        let doc = ParticleDoc::from(&sample_resource());
        assert_eq!(doc.textures, vec!["tex_0000.bti", "tex_0002.bti"]);
        let back = Resource::try_from(doc).unwrap();
        assert_eq!(back.textures, vec![0, 2]);
    }

    #[test]
    fn malformed_texture_filename_is_rejected() {
        let mut doc = ParticleDoc::from(&sample_resource());
        doc.textures[0] = "not-a-texture.png".to_owned();
        assert!(matches!(Resource::try_from(doc), Err(Error::DanglingReference(_))));
    }
}
