//! BCn pixel codec primitives for Enfusion texture tooling.
//!
//! This crate provides the pixel-level building blocks the `edds` container
//! codec delegates to: BC1-BC5 block compression and decompression, raw
//! RGBA8/BGRA8 payload conversion, and mipmap pyramid generation.
//!
//! All decode paths produce 8-bit RGBA. BCn formats are lossy; the raw
//! formats round-trip byte-exactly.

mod alpha;
mod bc1;
mod decode;
mod encode;
mod error;
mod mipmap;
mod rgba;

pub use decode::decode_image;
pub use encode::encode_image;
pub use error::{BcnError, Result};
pub use mipmap::generate_mipmaps;

use std::fmt;

/// Texture payload format.
///
/// The DXT names follow the legacy FourCC convention used by the container
/// format: `Dxt3` is BC2 (explicit alpha) and `Dxt5` is BC3 (interpolated
/// alpha). BC7 is intentionally absent; files using it are reported as
/// [`TextureFormat::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// BC1: 8 bytes per 4x4 block, 1-bit alpha.
    Dxt1,
    /// BC2: 16 bytes per 4x4 block, explicit 4-bit alpha.
    Dxt3,
    /// BC3: 16 bytes per 4x4 block, interpolated alpha.
    Dxt5,
    /// BC4: 8 bytes per 4x4 block, single channel.
    Bc4,
    /// BC5: 16 bytes per 4x4 block, two channels.
    Bc5,
    /// Uncompressed 8-bit RGBA.
    Rgba8,
    /// Uncompressed 8-bit BGRA.
    Bgra8,
    /// Unrecognized pixel format.
    Unknown,
}

impl TextureFormat {
    /// Bytes per 4x4 block for block-compressed formats, `None` otherwise.
    pub fn bytes_per_block(self) -> Option<usize> {
        match self {
            Self::Dxt1 | Self::Bc4 => Some(8),
            Self::Dxt3 | Self::Dxt5 | Self::Bc5 => Some(16),
            Self::Rgba8 | Self::Bgra8 | Self::Unknown => None,
        }
    }

    /// `true` for the BCn formats.
    pub fn is_block_compressed(self) -> bool {
        self.bytes_per_block().is_some()
    }

    /// Exact payload size in bytes for a `width` x `height` surface.
    ///
    /// Returns `None` for [`TextureFormat::Unknown`].
    pub fn payload_size(self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        match self {
            Self::Rgba8 | Self::Bgra8 => Some(w * h * 4),
            Self::Unknown => None,
            bcn => {
                let blocks = w.div_ceil(4) * h.div_ceil(4);
                Some(blocks * bcn.bytes_per_block().unwrap_or(0))
            }
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dxt1 => "DXT1",
            Self::Dxt3 => "DXT3",
            Self::Dxt5 => "DXT5",
            Self::Bc4 => "BC4",
            Self::Bc5 => "BC5",
            Self::Rgba8 => "RGBA8",
            Self::Bgra8 => "BGRA8",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_block_formats() {
        assert_eq!(TextureFormat::Dxt1.payload_size(4, 4), Some(8));
        assert_eq!(TextureFormat::Dxt1.payload_size(5, 7), Some(32));
        assert_eq!(TextureFormat::Dxt5.payload_size(4, 4), Some(16));
        assert_eq!(TextureFormat::Bc4.payload_size(16, 16), Some(128));
        assert_eq!(TextureFormat::Bc5.payload_size(16, 16), Some(256));
    }

    #[test]
    fn test_payload_size_raw_formats() {
        assert_eq!(TextureFormat::Rgba8.payload_size(1, 1), Some(4));
        assert_eq!(TextureFormat::Bgra8.payload_size(5, 7), Some(140));
    }

    #[test]
    fn test_payload_size_unknown() {
        assert_eq!(TextureFormat::Unknown.payload_size(4, 4), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TextureFormat::Dxt1.to_string(), "DXT1");
        assert_eq!(TextureFormat::Bgra8.to_string(), "BGRA8");
        assert_eq!(TextureFormat::Unknown.to_string(), "UNKNOWN");
    }
}
