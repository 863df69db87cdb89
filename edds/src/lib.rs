//! EDDS (Enfusion DDS) texture container codec.
//!
//! EDDS is the texture format of Enfusion-engine games (Arma Reforger,
//! DayZ). A file is a standard DDS header followed by a block table and
//! block bodies, one block per mipmap level stored smallest-first. Each
//! block is either an uncompressed `COPY` body or an `LZ4 ` body holding an
//! Enfusion chunk stream: 64 KiB chunks, independently LZ4
//! block-compressed, decoded against a rolling 64 KiB dictionary.
//!
//! # Reading
//!
//! [`read_image`] decodes the largest mip into 8-bit RGBA, [`read_payload`]
//! returns it still in its storage format, and [`read_config`] probes
//! dimensions and format from the header alone. Files from older tools that
//! lack a block table fall back to a single-blob parse automatically.
//!
//! # Writing
//!
//! [`write_image`] encodes an image (with a generated mipmap chain) and
//! [`write_from_blocks`] writes pre-encoded mip payloads, supplied
//! largest-first. Compression falls back to `COPY` whenever LZ4 does not
//! pay for itself.
//!
//! Supported formats: BC1/BC2/BC3 (DXT1/3/5), BC4, BC5, RGBA8 and BGRA8.
//! BC4/BC5 output is known not to render correctly in the target engine;
//! the headers match the original tooling and the limitation is carried
//! as-is.

pub mod block;
pub mod compress;
pub mod convert;
pub mod decompress;
pub mod error;
pub mod format;
pub mod header;
pub mod mipmap;
pub mod read;
pub mod write;

pub use block::{Block, BlockHeader, BlockMagic};
pub use compress::compress_block;
pub use decompress::decompress_block;
pub use error::{Error, Result};
pub use format::{detect_format, expected_payload_size};
pub use header::{DdsHeader, DdsPixelFormat, Dx10Header};
pub use mipmap::{mip_dimension, mip_level_count};
pub use read::{read_config, read_image, read_payload, read_payload_from, EddsConfig, MipPayload};
pub use write::{
    write_blocks_to, write_from_blocks, write_from_blocks_with_compression, write_image,
    write_image_with_compression,
};

pub use edds_bcn::TextureFormat;

/// DDS file magic. The fourth byte is a space.
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Logical chunk size of the LZ4 chunk stream.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Capacity of the rolling decode dictionary.
pub const DICT_CAP: usize = 64 * 1024;

/// Chunk flags bit marking the final chunk of a stream.
pub const LAST_CHUNK_FLAG: u8 = 0x80;

/// Most mip levels a container will ever carry.
pub const MAX_MIP_LEVELS: u32 = 11;
