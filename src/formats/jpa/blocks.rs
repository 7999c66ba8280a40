//! Per-tag block layout descriptors for the JPA block registry.
//!
//! Each block type is a small struct with a matching `read`/`write` pair
//! operating on a [`Reader`]/[`Writer`]. `FieldBlock` and `KeyBlock` are
//! discriminated unions: a one-byte tag is read first and selects which of
//! a small per-tag table of sub-layouts to decode, exactly as described for
//! "discriminated dispatch" fields.

use crate::stream::{Reader, Writer};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            x: r.f32()?,
            y: r.f32()?,
            z: r.f32()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.f32(self.x);
        w.f32(self.y);
        w.f32(self.z);
    }
}

/// `BEM1` - emitter dynamics. Exactly one per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamics {
    pub flags: u32,
    pub emitter_translation: Vec3,
    pub emitter_rotation: Vec3,
    pub emitter_scale: Vec3,
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
    pub gravity: Vec3,
}

impl Dynamics {
    pub const TAG: &'static [u8; 4] = b"BEM1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            flags: r.u32()?,
            emitter_translation: Vec3::read(r)?,
            emitter_rotation: Vec3::read(r)?,
            emitter_scale: Vec3::read(r)?,
            init_velocity: r.f32()?,
            init_velocity_random: r.f32()?,
            spread: r.f32()?,
            rate: r.f32()?,
            rate_random: r.f32()?,
            life_time: r.u16()?,
            life_time_random: r.u16()?,
            volume_size: r.f32()?,
            volume_sweep: r.f32()?,
            volume_min_rad: r.f32()?,
            divider: r.u16()?,
            rate_step: r.u8()?,
            max_frame: {
                let _pad = r.u8()?;
                r.i16()?
            },
            start_frame: r.u16()?,
            emitter_life: r.u16()?,
            air_resist: r.f32()?,
            moment_random: r.f32()?,
            gravity: Vec3::read(r)?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u32(self.flags);
        self.emitter_translation.write(w);
        self.emitter_rotation.write(w);
        self.emitter_scale.write(w);
        w.f32(self.init_velocity);
        w.f32(self.init_velocity_random);
        w.f32(self.spread);
        w.f32(self.rate);
        w.f32(self.rate_random);
        w.u16(self.life_time);
        w.u16(self.life_time_random);
        w.f32(self.volume_size);
        w.f32(self.volume_sweep);
        w.f32(self.volume_min_rad);
        w.u16(self.divider);
        w.u8(self.rate_step);
        w.u8(0);
        w.i16(self.max_frame);
        w.u16(self.start_frame);
        w.u16(self.emitter_life);
        w.f32(self.air_resist);
        w.f32(self.moment_random);
        self.gravity.write(w);
    }
}

/// Per-type parameters of a `FLD1` field block, selected by `type` byte.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Gravity { magnitude: f32, direction: Vec3 },
    Air { magnitude: f32, direction: Vec3 },
    Magnet { magnitude: f32, position: Vec3 },
    Newton { magnitude: f32, position: Vec3, ref_distance: f32 },
    Vortex { inner_speed: f32, outer_speed: f32, axis: Vec3 },
    Random { magnitude: f32 },
    Drag { coefficient: f32 },
    Convection { magnitude: f32, direction: Vec3 },
    Spin { rotate_speed: f32, axis: Vec3 },
}

impl FieldKind {
    fn type_tag(&self) -> u8 {
        match self {
            FieldKind::Gravity { .. } => 0,
            FieldKind::Air { .. } => 1,
            FieldKind::Magnet { .. } => 2,
            FieldKind::Newton { .. } => 3,
            FieldKind::Vortex { .. } => 4,
            FieldKind::Random { .. } => 5,
            FieldKind::Drag { .. } => 6,
            FieldKind::Convection { .. } => 7,
            FieldKind::Spin { .. } => 8,
        }
    }

    fn read(tag: u8, r: &mut Reader) -> Result<Self> {
        Ok(match tag {
            0 => FieldKind::Gravity {
                magnitude: r.f32()?,
                direction: Vec3::read(r)?,
            },
            1 => FieldKind::Air {
                magnitude: r.f32()?,
                direction: Vec3::read(r)?,
            },
            2 => FieldKind::Magnet {
                magnitude: r.f32()?,
                position: Vec3::read(r)?,
            },
            3 => FieldKind::Newton {
                magnitude: r.f32()?,
                position: Vec3::read(r)?,
                ref_distance: r.f32()?,
            },
            4 => FieldKind::Vortex {
                inner_speed: r.f32()?,
                outer_speed: r.f32()?,
                axis: Vec3::read(r)?,
            },
            5 => FieldKind::Random { magnitude: r.f32()? },
            6 => FieldKind::Drag { coefficient: r.f32()? },
            7 => FieldKind::Convection {
                magnitude: r.f32()?,
                direction: Vec3::read(r)?,
            },
            8 => FieldKind::Spin {
                rotate_speed: r.f32()?,
                axis: Vec3::read(r)?,
            },
            _ => return Err(Error::Parse("unknown FLD1 sub-type")),
        })
    }

    fn write(&self, w: &mut Writer) {
        match self {
            FieldKind::Gravity { magnitude, direction } | FieldKind::Air { magnitude, direction } => {
                w.f32(*magnitude);
                direction.write(w);
            }
            FieldKind::Magnet { magnitude, position } => {
                w.f32(*magnitude);
                position.write(w);
            }
            FieldKind::Newton {
                magnitude,
                position,
                ref_distance,
            } => {
                w.f32(*magnitude);
                position.write(w);
                w.f32(*ref_distance);
            }
            FieldKind::Vortex {
                inner_speed,
                outer_speed,
                axis,
            } => {
                w.f32(*inner_speed);
                w.f32(*outer_speed);
                axis.write(w);
            }
            FieldKind::Random { magnitude } => w.f32(*magnitude),
            FieldKind::Drag { coefficient } => w.f32(*coefficient),
            FieldKind::Convection { magnitude, direction } => {
                w.f32(*magnitude);
                direction.write(w);
            }
            FieldKind::Spin { rotate_speed, axis } => {
                w.f32(*rotate_speed);
                axis.write(w);
            }
        }
    }
}

/// `FLD1` - one applied force field. Zero or more per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub flags: u8,
    pub fade_in: f32,
    pub fade_out: f32,
    pub enable_frame: u16,
    pub disable_frame: u16,
    pub kind: FieldKind,
}

impl Field {
    pub const TAG: &'static [u8; 4] = b"FLD1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        let type_tag = r.u8()?;
        let flags = r.u8()?;
        let _pad = r.u16()?;
        let fade_in = r.f32()?;
        let fade_out = r.f32()?;
        let enable_frame = r.u16()?;
        let disable_frame = r.u16()?;
        let kind = FieldKind::read(type_tag, r)?;
        Ok(Self {
            flags,
            fade_in,
            fade_out,
            enable_frame,
            disable_frame,
            kind,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u8(self.kind.type_tag());
        w.u8(self.flags);
        w.u16(0);
        w.f32(self.fade_in);
        w.f32(self.fade_out);
        w.u16(self.enable_frame);
        w.u16(self.disable_frame);
        self.kind.write(w);
    }
}

/// A single Hermite-style animation key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub time: f32,
    pub value: f32,
    pub tangent_in: f32,
    pub tangent_out: f32,
}

/// `KFA1` - a keyed animation curve applied to one particle attribute over
/// the particle's lifetime. Zero or more per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBlock {
    pub target: u8,
    pub is_loop: bool,
    pub keys: Vec<Key>,
}

impl KeyBlock {
    pub const TAG: &'static [u8; 4] = b"KFA1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        let target = r.u8()?;
        let is_loop = r.u8()? != 0;
        let key_count = r.u16()?;
        let mut keys = Vec::with_capacity(key_count as usize);
        for _ in 0..key_count {
            keys.push(Key {
                time: r.f32()?,
                value: r.f32()?,
                tangent_in: r.f32()?,
                tangent_out: r.f32()?,
            });
        }
        Ok(Self {
            target,
            is_loop,
            keys,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u8(self.target);
        w.u8(self.is_loop as u8);
        w.u16(self.keys.len() as u16);
        for k in &self.keys {
            w.f32(k.time);
            w.f32(k.value);
            w.f32(k.tangent_in);
            w.f32(k.tangent_out);
        }
    }
}

const TEX_IDX_ANM_FLAG: u32 = 0x2;

/// `BSP1` - the particle's primary billboard/geometry shape. Exactly one
/// per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseShape {
    pub shape_type: u8,
    pub dir_type: u8,
    pub rot_type: u8,
    pub plane_type: u8,
    pub flags: u32,
    pub color_prm: [u8; 4],
    pub color_env: [u8; 4],
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
    /// Present only when `flags & TEX_IDX_ANM_FLAG != 0`: a per-frame list
    /// of texture-pool indices used to animate the shape's texture.
    pub tex_idx_anim: Option<Vec<u8>>,
}

impl BaseShape {
    pub const TAG: &'static [u8; 4] = b"BSP1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        let shape_type = r.u8()?;
        let dir_type = r.u8()?;
        let rot_type = r.u8()?;
        let plane_type = r.u8()?;
        let flags = r.u32()?;
        let color_prm = [r.u8()?, r.u8()?, r.u8()?, r.u8()?];
        let color_env = [r.u8()?, r.u8()?, r.u8()?, r.u8()?];
        let base_size = (r.f32()?, r.f32()?);
        let blend_mode = r.u8()?;
        let blend_src = r.u8()?;
        let blend_dst = r.u8()?;
        let blend_logic_op = r.u8()?;
        let z_compare = r.u8()?;
        let z_write = r.u8()?;
        let alpha_compare_mode0 = r.u8()?;
        let alpha_ref0 = r.u8()?;
        let texture_index = r.u16()?;
        let _pad = r.u16()?;
        let tex_idx_anim = if flags & TEX_IDX_ANM_FLAG != 0 {
            let count = r.u8()?;
            let mut idx = Vec::with_capacity(count as usize);
            for _ in 0..count {
                idx.push(r.u8()?);
            }
            Some(idx)
        } else {
            None
        };
        Ok(Self {
            shape_type,
            dir_type,
            rot_type,
            plane_type,
            flags,
            color_prm,
            color_env,
            base_size,
            blend_mode,
            blend_src,
            blend_dst,
            blend_logic_op,
            z_compare,
            z_write,
            alpha_compare_mode0,
            alpha_ref0,
            texture_index,
            tex_idx_anim,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u8(self.shape_type);
        w.u8(self.dir_type);
        w.u8(self.rot_type);
        w.u8(self.plane_type);
        w.u32(self.flags);
        w.bytes_raw(&self.color_prm);
        w.bytes_raw(&self.color_env);
        w.f32(self.base_size.0);
        w.f32(self.base_size.1);
        w.u8(self.blend_mode);
        w.u8(self.blend_src);
        w.u8(self.blend_dst);
        w.u8(self.blend_logic_op);
        w.u8(self.z_compare);
        w.u8(self.z_write);
        w.u8(self.alpha_compare_mode0);
        w.u8(self.alpha_ref0);
        w.u16(self.texture_index);
        w.u16(0);
        if let Some(idx) = &self.tex_idx_anim {
            w.u8(idx.len() as u8);
            for &b in idx {
                w.u8(b);
            }
        }
    }
}

/// `ESP1` - secondary animation curves applied uniformly (scale/alpha/spin
/// over the particle's lifetime, independent of `KFA1` keys). Exactly one
/// per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraShape {
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

impl ExtraShape {
    pub const TAG: &'static [u8; 4] = b"ESP1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            scale_in_timing: r.f32()?,
            scale_out_timing: r.f32()?,
            scale_in_value: r.f32()?,
            scale_out_value: r.f32()?,
            scale_anm_max_frame: r.u16()?,
            alpha_in_timing: {
                let _pad = r.u16()?;
                r.f32()?
            },
            alpha_out_timing: r.f32()?,
            alpha_in_value: r.f32()?,
            alpha_base_value: r.f32()?,
            alpha_out_value: r.f32()?,
            rotate_speed: r.f32()?,
            rotate_angle_random: r.f32()?,
            rotate_speed_random: r.f32()?,
            rotate_direction: {
                let dir = r.u8()?;
                let _pad = r.bytes(3)?;
                dir
            },
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.f32(self.scale_in_timing);
        w.f32(self.scale_out_timing);
        w.f32(self.scale_in_value);
        w.f32(self.scale_out_value);
        w.u16(self.scale_anm_max_frame);
        w.u16(0);
        w.f32(self.alpha_in_timing);
        w.f32(self.alpha_out_timing);
        w.f32(self.alpha_in_value);
        w.f32(self.alpha_base_value);
        w.f32(self.alpha_out_value);
        w.f32(self.rotate_speed);
        w.f32(self.rotate_angle_random);
        w.f32(self.rotate_speed_random);
        w.u8(self.rotate_direction);
        w.bytes_raw(&[0u8; 3]);
    }
}

/// `SSP1` - a child particle emitted from the parent particle. At most one
/// per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildShape {
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
    pub color_prm: [u8; 4],
    pub color_env: [u8; 4],
}

impl ChildShape {
    pub const TAG: &'static [u8; 4] = b"SSP1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            shape_type: r.u8()?,
            dir_type: r.u8()?,
            rot_type: r.u8()?,
            flags: {
                let _pad = r.u8()?;
                r.u32()?
            },
            texture_index: r.u16()?,
            base_size: {
                let _pad = r.u16()?;
                (r.f32()?, r.f32()?)
            },
            life_time: r.u16()?,
            rate: r.u16()?,
            timing: r.f32()?,
            velocity_inherit_rate: r.f32()?,
            color_prm: [r.u8()?, r.u8()?, r.u8()?, r.u8()?],
            color_env: [r.u8()?, r.u8()?, r.u8()?, r.u8()?],
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u8(self.shape_type);
        w.u8(self.dir_type);
        w.u8(self.rot_type);
        w.u8(0);
        w.u32(self.flags);
        w.u16(self.texture_index);
        w.u16(0);
        w.f32(self.base_size.0);
        w.f32(self.base_size.1);
        w.u16(self.life_time);
        w.u16(self.rate);
        w.f32(self.timing);
        w.f32(self.velocity_inherit_rate);
        w.bytes_raw(&self.color_prm);
        w.bytes_raw(&self.color_env);
    }
}

/// `ETX1` - an additional indirect/environment-mapping texture layer. At
/// most one per resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ExTexShape {
    pub flags: u32,
    pub secondary_texture_index: u16,
    pub indirect_texture_mtx: [f32; 6],
    pub scroll: (f32, f32),
    pub secondary_blend_mode: u8,
}

impl ExTexShape {
    pub const TAG: &'static [u8; 4] = b"ETX1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        let flags = r.u32()?;
        let secondary_texture_index = r.u16()?;
        let _pad = r.u16()?;
        let mut indirect_texture_mtx = [0f32; 6];
        for v in &mut indirect_texture_mtx {
            *v = r.f32()?;
        }
        let scroll = (r.f32()?, r.f32()?);
        let secondary_blend_mode = r.u8()?;
        let _pad2 = r.bytes(3)?;
        Ok(Self {
            flags,
            secondary_texture_index,
            indirect_texture_mtx,
            scroll,
            secondary_blend_mode,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u32(self.flags);
        w.u16(self.secondary_texture_index);
        w.u16(0);
        for v in &self.indirect_texture_mtx {
            w.f32(*v);
        }
        w.f32(self.scroll.0);
        w.f32(self.scroll.1);
        w.u8(self.secondary_blend_mode);
        w.bytes_raw(&[0u8; 3]);
    }
}

/// `TEX1` - the resource terminator; carries the texture-index list the
/// resource's `textures` array is built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TexTerminator {
    pub indices: Vec<u16>,
}

impl TexTerminator {
    pub const TAG: &'static [u8; 4] = b"TEX1";

    pub fn read(r: &mut Reader) -> Result<Self> {
        let count = r.u16()?;
        let _pad = r.u16()?;
        let mut indices = Vec::with_capacity(count as usize);
        for _ in 0..count {
            indices.push(r.u16()?);
        }
        Ok(Self { indices })
    }

    pub fn write(&self, w: &mut Writer) {
        w.u16(self.indices.len() as u16);
        w.u16(0);
        for &idx in &self.indices {
            w.u16(idx);
        }
    }
}
