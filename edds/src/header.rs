//! DDS header structures and serialization.
//!
//! EDDS files open with a standard 124-byte DDS header (after the 4-byte
//! magic) and, when the pixel format names the `DX10` FourCC, a 20-byte
//! extension. Writers stamp the second reserved word with the `ENF1`
//! sentinel; readers ignore it.

use crate::TextureFormat;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Size of the DDS header on disk, excluding the 4-byte magic.
pub const DDS_HEADER_SIZE: u32 = 124;

/// Size of the pixel format structure embedded in the header.
pub const DDS_PIXEL_FORMAT_SIZE: u32 = 32;

/// Size of the DX10 header extension.
pub const DX10_HEADER_SIZE: u32 = 20;

// Header flags.
pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PITCH: u32 = 0x8;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20000;
pub const DDSD_LINEARSIZE: u32 = 0x80000;

// Pixel format flags.
pub const DDPF_ALPHAPIXELS: u32 = 0x1;
pub const DDPF_FOURCC: u32 = 0x4;
pub const DDPF_RGB: u32 = 0x40;
pub const DDPF_LUMINANCE: u32 = 0x20000;

// Caps flags.
pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;
pub const DDSCAPS_MIPMAP: u32 = 0x400000;

/// `"ENF1"` as a little-endian FourCC, stamped into `reserved1[1]`.
pub const ENFUSION_MARKER: u32 = make_four_cc(b'E', b'N', b'F', b'1');

const FOURCC_DX10: u32 = make_four_cc(b'D', b'X', b'1', b'0');

/// Pack four ASCII bytes into a little-endian FourCC.
pub const fn make_four_cc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    a as u32 | (b as u32) << 8 | (c as u32) << 16 | (d as u32) << 24
}

/// Unpack a FourCC back into its four bytes.
pub const fn four_cc_bytes(value: u32) -> [u8; 4] {
    [
        value as u8,
        (value >> 8) as u8,
        (value >> 16) as u8,
        (value >> 24) as u8,
    ]
}

/// The 32-byte DDS pixel format structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: u32,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

/// The 124-byte DDS header (magic excluded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

/// The 20-byte DX10 header extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dx10Header {
    pub dxgi_format: u32,
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    pub misc_flags2: u32,
}

impl DdsHeader {
    /// Read the 124-byte header at the reader's current position.
    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut header = DdsHeader {
            size: r.read_u32::<LittleEndian>()?,
            flags: r.read_u32::<LittleEndian>()?,
            height: r.read_u32::<LittleEndian>()?,
            width: r.read_u32::<LittleEndian>()?,
            pitch_or_linear_size: r.read_u32::<LittleEndian>()?,
            depth: r.read_u32::<LittleEndian>()?,
            mip_map_count: r.read_u32::<LittleEndian>()?,
            ..Default::default()
        };
        for word in &mut header.reserved1 {
            *word = r.read_u32::<LittleEndian>()?;
        }
        header.pixel_format = DdsPixelFormat {
            size: r.read_u32::<LittleEndian>()?,
            flags: r.read_u32::<LittleEndian>()?,
            four_cc: r.read_u32::<LittleEndian>()?,
            rgb_bit_count: r.read_u32::<LittleEndian>()?,
            r_bit_mask: r.read_u32::<LittleEndian>()?,
            g_bit_mask: r.read_u32::<LittleEndian>()?,
            b_bit_mask: r.read_u32::<LittleEndian>()?,
            a_bit_mask: r.read_u32::<LittleEndian>()?,
        };
        header.caps = r.read_u32::<LittleEndian>()?;
        header.caps2 = r.read_u32::<LittleEndian>()?;
        header.caps3 = r.read_u32::<LittleEndian>()?;
        header.caps4 = r.read_u32::<LittleEndian>()?;
        header.reserved2 = r.read_u32::<LittleEndian>()?;
        Ok(header)
    }

    /// Write the 124-byte header.
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.height)?;
        w.write_u32::<LittleEndian>(self.width)?;
        w.write_u32::<LittleEndian>(self.pitch_or_linear_size)?;
        w.write_u32::<LittleEndian>(self.depth)?;
        w.write_u32::<LittleEndian>(self.mip_map_count)?;
        for word in &self.reserved1 {
            w.write_u32::<LittleEndian>(*word)?;
        }
        w.write_u32::<LittleEndian>(self.pixel_format.size)?;
        w.write_u32::<LittleEndian>(self.pixel_format.flags)?;
        w.write_u32::<LittleEndian>(self.pixel_format.four_cc)?;
        w.write_u32::<LittleEndian>(self.pixel_format.rgb_bit_count)?;
        w.write_u32::<LittleEndian>(self.pixel_format.r_bit_mask)?;
        w.write_u32::<LittleEndian>(self.pixel_format.g_bit_mask)?;
        w.write_u32::<LittleEndian>(self.pixel_format.b_bit_mask)?;
        w.write_u32::<LittleEndian>(self.pixel_format.a_bit_mask)?;
        w.write_u32::<LittleEndian>(self.caps)?;
        w.write_u32::<LittleEndian>(self.caps2)?;
        w.write_u32::<LittleEndian>(self.caps3)?;
        w.write_u32::<LittleEndian>(self.caps4)?;
        w.write_u32::<LittleEndian>(self.reserved2)?;
        Ok(())
    }

    /// `true` if the pixel format signals the DX10 header extension.
    pub fn has_dx10_extension(&self) -> bool {
        self.pixel_format.flags & DDPF_FOURCC != 0 && self.pixel_format.four_cc == FOURCC_DX10
    }

    /// Build the EDDS header for a 2D texture.
    ///
    /// Returns `None` for [`TextureFormat::Unknown`].
    pub fn for_texture(
        width: u32,
        height: u32,
        mip_map_count: u32,
        format: TextureFormat,
    ) -> Option<Self> {
        let mut flags = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT;
        let mut caps = DDSCAPS_TEXTURE;
        if mip_map_count > 1 {
            flags |= DDSD_MIPMAPCOUNT;
            caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
        }

        let mut header = DdsHeader {
            size: DDS_HEADER_SIZE,
            flags,
            height,
            width,
            depth: 1,
            mip_map_count,
            reserved1: enfusion_reserved(),
            caps,
            ..Default::default()
        };
        header.pixel_format.size = DDS_PIXEL_FORMAT_SIZE;

        match format {
            TextureFormat::Dxt1 => header.set_four_cc(make_four_cc(b'D', b'X', b'T', b'1')),
            TextureFormat::Dxt3 => header.set_four_cc(make_four_cc(b'D', b'X', b'T', b'3')),
            TextureFormat::Dxt5 => header.set_four_cc(make_four_cc(b'D', b'X', b'T', b'5')),
            TextureFormat::Bc4 => header.set_four_cc(make_four_cc(b'A', b'T', b'I', b'1')),
            TextureFormat::Bc5 => header.set_four_cc(make_four_cc(b'A', b'T', b'I', b'2')),
            TextureFormat::Rgba8 => {
                header.set_rgba_masks(0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000)
            }
            TextureFormat::Bgra8 => {
                header.set_rgba_masks(0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000)
            }
            TextureFormat::Unknown => return None,
        }

        Some(header)
    }

    fn set_four_cc(&mut self, four_cc: u32) {
        self.flags |= DDSD_LINEARSIZE;
        self.pixel_format.flags = DDPF_FOURCC;
        self.pixel_format.four_cc = four_cc;
    }

    fn set_rgba_masks(&mut self, r: u32, g: u32, b: u32, a: u32) {
        self.flags |= DDSD_PITCH;
        self.pixel_format.flags = DDPF_RGB | DDPF_ALPHAPIXELS;
        self.pixel_format.rgb_bit_count = 32;
        self.pixel_format.r_bit_mask = r;
        self.pixel_format.g_bit_mask = g;
        self.pixel_format.b_bit_mask = b;
        self.pixel_format.a_bit_mask = a;
        self.pitch_or_linear_size = self.width * 4;
    }
}

impl Dx10Header {
    /// Read the 20-byte extension at the reader's current position.
    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Dx10Header {
            dxgi_format: r.read_u32::<LittleEndian>()?,
            resource_dimension: r.read_u32::<LittleEndian>()?,
            misc_flag: r.read_u32::<LittleEndian>()?,
            array_size: r.read_u32::<LittleEndian>()?,
            misc_flags2: r.read_u32::<LittleEndian>()?,
        })
    }
}

/// Reserved words for an Enfusion header: only word 1 is set.
fn enfusion_reserved() -> [u32; 11] {
    let mut reserved = [0u32; 11];
    reserved[1] = ENFUSION_MARKER;
    reserved
}
