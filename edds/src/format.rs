//! Pixel format detection and payload size math.

use crate::header::{
    four_cc_bytes, DdsHeader, Dx10Header, DDPF_ALPHAPIXELS, DDPF_FOURCC, DDPF_LUMINANCE, DDPF_RGB,
};
use crate::TextureFormat;
use tracing::debug;

/// Detect the texture format declared by a DDS header.
///
/// A DX10 extension takes precedence; otherwise the legacy FourCC set is
/// consulted, then the RGB bit masks. Luminance-8 decodes as RGBA8.
pub fn detect_format(header: &DdsHeader, dx10: Option<&Dx10Header>) -> TextureFormat {
    if let Some(dx10) = dx10 {
        let format = dxgi_format(dx10.dxgi_format);
        debug!(dxgi = dx10.dxgi_format, %format, "detected format from DX10 header");
        return format;
    }

    let pf = &header.pixel_format;
    if pf.flags & DDPF_FOURCC != 0 {
        let four_cc = four_cc_bytes(pf.four_cc);
        let format = match &four_cc {
            b"DXT1" => TextureFormat::Dxt1,
            b"DXT2" | b"DXT3" => TextureFormat::Dxt3,
            b"DXT4" | b"DXT5" => TextureFormat::Dxt5,
            b"ATI1" | b"BC4U" | b"BC4S" => TextureFormat::Bc4,
            b"ATI2" | b"BC5U" | b"BC5S" => TextureFormat::Bc5,
            _ => TextureFormat::Unknown,
        };
        debug!(four_cc = ?four_cc, %format, "detected format from FourCC");
        return format;
    }

    if pf.flags & DDPF_RGB != 0 && pf.flags & DDPF_ALPHAPIXELS != 0 && pf.rgb_bit_count == 32 {
        if pf.r_bit_mask == 0x0000_00ff
            && pf.g_bit_mask == 0x0000_ff00
            && pf.b_bit_mask == 0x00ff_0000
            && pf.a_bit_mask == 0xff00_0000
        {
            return TextureFormat::Rgba8;
        }
        if pf.r_bit_mask == 0x00ff_0000
            && pf.g_bit_mask == 0x0000_ff00
            && pf.b_bit_mask == 0x0000_00ff
            && pf.a_bit_mask == 0xff00_0000
        {
            return TextureFormat::Bgra8;
        }
    }

    if pf.flags & DDPF_LUMINANCE != 0 && pf.rgb_bit_count == 8 {
        // Single-channel inputs expand to RGBA for decoding.
        return TextureFormat::Rgba8;
    }

    TextureFormat::Unknown
}

/// Map a DXGI format code to a texture format.
fn dxgi_format(code: u32) -> TextureFormat {
    match code {
        28 => TextureFormat::Rgba8,
        71 => TextureFormat::Dxt1,
        74 => TextureFormat::Dxt3,
        77 => TextureFormat::Dxt5,
        80 => TextureFormat::Bc4,
        83 => TextureFormat::Bc5,
        87 => TextureFormat::Bgra8,
        _ => TextureFormat::Unknown,
    }
}

/// Expected payload length for a surface, `None` for unknown formats.
pub fn expected_payload_size(format: TextureFormat, width: u32, height: u32) -> Option<usize> {
    format.payload_size(width, height)
}
