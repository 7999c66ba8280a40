//! `BTI` - a single texture: a fixed 32-byte header plus an opaque
//! pixel/palette payload.
//!
//! Pixel and palette data are GameCube/Wii GPU tile formats (`CMPR`, `RGB5A3`,
//! `I4`, ...); decoding them to a displayable image is out of scope, so this
//! codec stores the payload as an opaque byte slab and re-emits it verbatim.

use crate::stream::{Reader, Writer};
use crate::Result;

const HEADER_LEN: usize = 32;
const ALIGN: usize = 32;

/// A decoded BTI texture: header fields plus the raw payload bytes that
/// followed the header in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub format: u8,
    pub wrap_s: u8,
    pub wrap_t: u8,
    pub palette_format: u8,
    pub palette_count: u16,
    pub palette_offset: u32,
    pub width: u16,
    pub height: u16,
    pub min_filter: u8,
    pub mag_filter: u8,
    pub mipmap_count: u8,
    pub lod_bias: i16,
    /// Everything from the texture's data offset to the end of the slab:
    /// the undecoded pixel data, and the palette if `palette_offset` points
    /// inside it.
    pub payload: Vec<u8>,
}

impl Texture {
    /// Decode a texture's 32-byte header and retain the remaining bytes as
    /// an opaque payload.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);

        let format = r.u8()?;
        let _alpha_setting = r.u8()?;
        let width = r.u16()?;
        let height = r.u16()?;
        let wrap_s = r.u8()?;
        let wrap_t = r.u8()?;
        let _unused = r.u8()?;
        let palette_format = r.u8()?;
        let palette_count = r.u16()?;
        let palette_offset = r.u32()?;
        let _border_color = r.u32()?;
        let min_filter = r.u8()?;
        let mag_filter = r.u8()?;
        let mipmap_count = r.u8()?;
        let _unused2 = r.u8()?;
        let lod_bias = r.i16()?;
        let _unused3 = r.u16()?;
        let data_offset = r.u32()? as usize;

        let payload = buf.get(data_offset..).ok_or(crate::Error::Truncated)?.to_vec();

        Ok(Self {
            format,
            wrap_s,
            wrap_t,
            palette_format,
            palette_count,
            palette_offset,
            width,
            height,
            min_filter,
            mag_filter,
            mipmap_count,
            lod_bias,
            payload,
        })
    }

    /// Encode the header followed by the payload, padded to a 32-byte
    /// boundary.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();

        w.u8(self.format);
        w.u8(1); // alpha setting: textures this crate writes always carry an alpha channel.
        w.u16(self.width);
        w.u16(self.height);
        w.u8(self.wrap_s);
        w.u8(self.wrap_t);
        w.u8(0);
        w.u8(self.palette_format);
        w.u16(self.palette_count);
        w.u32(self.palette_offset);
        w.u32(0);
        w.u8(self.min_filter);
        w.u8(self.mag_filter);
        w.u8(self.mipmap_count);
        w.u8(0);
        w.i16(self.lod_bias);
        w.u16(0);
        w.u32(HEADER_LEN as u32);
        w.bytes_raw(&self.payload);
        w.align_to(ALIGN);

        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Texture {
        Texture {
            format: 0x0E, // CMPR
            wrap_s: 0,
            wrap_t: 0,
            palette_format: 0,
            palette_count: 0,
            palette_offset: 0,
            width: 64,
            height: 64,
            min_filter: 1,
            mag_filter: 1,
            mipmap_count: 1,
            lod_bias: 0,
            payload: vec![0xAB; 2048],
        }
    }

    #[test]
    fn round_trips_header_and_payload() {
        let tex = sample();
        let bytes = tex.encode();
        let decoded = Texture::parse(&bytes).unwrap();
        assert_eq!(decoded, tex);
    }

    #[test]
    fn encoded_length_is_32_byte_aligned() {
        let bytes = sample().encode();
        assert_eq!(bytes.len() % ALIGN, 0);
    }

    #[test]
    fn data_offset_always_points_past_fixed_header() {
        let bytes = sample().encode();
        let mut r = Reader::new(&bytes);
        r.seek(28);
        assert_eq!(r.u32().unwrap(), HEADER_LEN as u32);
    }
}
