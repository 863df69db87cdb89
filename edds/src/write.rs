//! Container write engine.
//!
//! Callers hand over mip payloads largest-first; on disk the block table and
//! bodies are laid out smallest-first, so both emission loops walk the list
//! backwards. All validation and compression happens before the output file
//! is created.

use crate::block::{write_block_data, Block, BlockMagic};
use crate::compress::compress_block;
use crate::format::expected_payload_size;
use crate::header::DdsHeader;
use crate::mipmap::{mip_dimension, mip_level_count};
use crate::{convert, Error, Result, TextureFormat, DDS_MAGIC};
use byteorder::{LittleEndian, WriteBytesExt};
use image::RgbaImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Write an image as a compressed EDDS file with a mipmap chain.
///
/// `max_mip_levels = 0` writes the full chain (clamped to 11 levels).
pub fn write_image<P: AsRef<Path>>(
    image: &RgbaImage,
    path: P,
    format: TextureFormat,
    max_mip_levels: u32,
) -> Result<()> {
    write_image_with_compression(image, path, format, max_mip_levels, true)
}

/// Write an image as an EDDS file.
///
/// `compress = false` stores every mip as a `COPY` block.
pub fn write_image_with_compression<P: AsRef<Path>>(
    image: &RgbaImage,
    path: P,
    format: TextureFormat,
    max_mip_levels: u32,
    compress: bool,
) -> Result<()> {
    let (width, height) = image.dimensions();

    let mut mip_count = mip_level_count(width, height);
    if max_mip_levels > 0 && max_mip_levels < mip_count {
        mip_count = max_mip_levels;
    }
    let mip_count = mip_count.max(1);

    let mut mips = edds_bcn::generate_mipmaps(image);
    mips.truncate(mip_count as usize);

    let mut payloads = Vec::with_capacity(mips.len());
    for (mip, level) in mips.iter().enumerate() {
        let payload = edds_bcn::encode_image(level, format).map_err(|e| Error::CompressMipmap {
            mip,
            source: Box::new(e),
        })?;
        payloads.push(payload);
    }

    write_from_blocks_with_compression(path, format, width, height, &payloads, compress)
}

/// Write pre-encoded mip payloads (largest-first) as a compressed EDDS file.
pub fn write_from_blocks<P: AsRef<Path>>(
    path: P,
    format: TextureFormat,
    width: u32,
    height: u32,
    mipmaps: &[Vec<u8>],
) -> Result<()> {
    write_from_blocks_with_compression(path, format, width, height, mipmaps, true)
}

/// Write pre-encoded mip payloads (largest-first) as an EDDS file.
///
/// `compress = false` stores every mip as a `COPY` block.
pub fn write_from_blocks_with_compression<P: AsRef<Path>>(
    path: P,
    format: TextureFormat,
    width: u32,
    height: u32,
    mipmaps: &[Vec<u8>],
    compress: bool,
) -> Result<()> {
    let (header, blocks) = build_blocks(format, width, height, mipmaps, compress)?;

    let path = path.as_ref();
    let mut file = File::create(path).map_err(|source| Error::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;

    write_container(&mut file, &header, &blocks)?;
    debug!(path = %path.display(), mips = blocks.len(), %format, width, height, "wrote EDDS file");
    Ok(())
}

/// Write pre-encoded mip payloads (largest-first) to an arbitrary writer.
pub fn write_blocks_to<W: Write>(
    w: &mut W,
    format: TextureFormat,
    width: u32,
    height: u32,
    mipmaps: &[Vec<u8>],
    compress: bool,
) -> Result<()> {
    let (header, blocks) = build_blocks(format, width, height, mipmaps, compress)?;
    write_container(w, &header, &blocks)
}

/// Validate payload sizes and turn each mip into a block.
fn build_blocks(
    format: TextureFormat,
    width: u32,
    height: u32,
    mipmaps: &[Vec<u8>],
    compress: bool,
) -> Result<(DdsHeader, Vec<Block>)> {
    if mipmaps.is_empty() {
        return Err(Error::EmptyMipmaps);
    }
    if format == TextureFormat::Unknown {
        return Err(Error::InvalidFormat);
    }

    let mip_count = convert::u32_from_usize(mipmaps.len())?;
    let header =
        DdsHeader::for_texture(width, height, mip_count, format).ok_or(Error::InvalidFormat)?;

    let mut blocks = Vec::with_capacity(mipmaps.len());
    for (mip, payload) in mipmaps.iter().enumerate() {
        let mip_w = mip_dimension(width, mip as u32);
        let mip_h = mip_dimension(height, mip as u32);
        let expected =
            expected_payload_size(format, mip_w, mip_h).ok_or(Error::InvalidFormat)?;
        if payload.len() != expected {
            return Err(Error::MipmapSizeMismatch {
                mip,
                expected,
                actual: payload.len(),
            });
        }

        let block = if compress {
            compress_block(payload).map_err(|e| Error::CompressMipmap {
                mip,
                source: Box::new(e),
            })?
        } else {
            Block {
                magic: BlockMagic::Copy,
                size: convert::i32_from_usize(payload.len())?,
                uncompressed_size: 0,
                data: payload.clone(),
            }
        };
        blocks.push(block);
    }

    Ok((header, blocks))
}

/// Emit magic, header, then the block table and bodies smallest-mip-first.
fn write_container<W: Write>(w: &mut W, header: &DdsHeader, blocks: &[Block]) -> Result<()> {
    w.write_all(&DDS_MAGIC)
        .map_err(|source| Error::WriteDdsMagic { source })?;
    header
        .write(w)
        .map_err(|source| Error::WriteDdsHeader { source })?;

    for (mip, block) in blocks.iter().enumerate().rev() {
        w.write_all(&block.magic.as_bytes())
            .map_err(|source| Error::WriteBlockMagic { mip, source })?;
        w.write_i32::<LittleEndian>(block.size)
            .map_err(|source| Error::WriteBlockSize { mip, source })?;
    }

    for (mip, block) in blocks.iter().enumerate().rev() {
        write_block_data(w, block).map_err(|e| Error::WriteBlockData {
            mip,
            source: Box::new(e),
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::DDS_HEADER_SIZE;

    fn write_to_vec(
        format: TextureFormat,
        width: u32,
        height: u32,
        mipmaps: &[Vec<u8>],
        compress: bool,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_blocks_to(&mut out, format, width, height, mipmaps, compress)?;
        Ok(out)
    }

    #[test]
    fn test_empty_mipmaps_rejected() {
        let err = write_to_vec(TextureFormat::Dxt1, 4, 4, &[], true).unwrap_err();
        assert!(matches!(err, Error::EmptyMipmaps));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = write_to_vec(TextureFormat::Unknown, 4, 4, &[vec![0; 8]], true).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat));
    }

    #[test]
    fn test_mipmap_size_mismatch() {
        let err = write_to_vec(TextureFormat::Dxt1, 4, 4, &[vec![0; 7]], true).unwrap_err();
        assert!(matches!(
            err,
            Error::MipmapSizeMismatch {
                mip: 0,
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_single_mip_layout() {
        let payload = vec![0xABu8; 8];
        let out = write_to_vec(TextureFormat::Dxt1, 4, 4, &[payload.clone()], false).unwrap();

        let header_end = 4 + DDS_HEADER_SIZE as usize;
        assert_eq!(&out[0..4], b"DDS ");
        assert_eq!(&out[header_end..header_end + 4], b"COPY");
        assert_eq!(
            &out[header_end + 4..header_end + 8],
            &8i32.to_le_bytes()
        );
        assert_eq!(&out[header_end + 8..], payload.as_slice());
    }

    #[test]
    fn test_table_written_smallest_first() {
        // Two mips for an 8x8 BGRA8 surface: 256 and 64 bytes.
        let mips = vec![vec![1u8; 256], vec![2u8; 64]];
        let out = write_to_vec(TextureFormat::Bgra8, 8, 8, &mips, false).unwrap();

        let table = 4 + DDS_HEADER_SIZE as usize;
        // First entry is the smallest mip.
        assert_eq!(&out[table..table + 4], b"COPY");
        assert_eq!(&out[table + 4..table + 8], &64i32.to_le_bytes());
        assert_eq!(&out[table + 8..table + 12], b"COPY");
        assert_eq!(&out[table + 12..table + 16], &256i32.to_le_bytes());

        // Bodies follow in the same order.
        let bodies = table + 16;
        assert!(out[bodies..bodies + 64].iter().all(|&b| b == 2));
        assert!(out[bodies + 64..].iter().all(|&b| b == 1));
    }

    #[test]
    fn test_compressed_block_sizes_recorded() {
        let mips = vec![vec![0u8; 4096]];
        let out = write_to_vec(TextureFormat::Bgra8, 32, 32, &mips, true).unwrap();

        let table = 4 + DDS_HEADER_SIZE as usize;
        assert_eq!(&out[table..table + 4], b"LZ4 ");
        let size = i32::from_le_bytes([
            out[table + 4],
            out[table + 5],
            out[table + 6],
            out[table + 7],
        ]);
        assert!(size > 0);
        assert_eq!(out.len(), table + 8 + size as usize);
    }
}
