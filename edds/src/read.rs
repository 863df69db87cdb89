//! Container read engine.
//!
//! The block table indexes mips smallest-first while levels are numbered
//! largest-first, so table entry `i` is mip level `N - 1 - i`. The reader
//! seeks over every smaller mip and decodes only level 0. Files from older
//! tools have no block table at all; for those the whole remainder is
//! re-read as either one LZ4 block or a raw payload.

use crate::block::{read_block_body, read_block_table, Block, BlockMagic};
use crate::decompress::decompress_block;
use crate::format::{detect_format, expected_payload_size};
use crate::header::{DdsHeader, Dx10Header, DDSCAPS_MIPMAP, DDS_HEADER_SIZE, DX10_HEADER_SIZE};
use crate::{convert, Error, Result, TextureFormat, DDS_MAGIC};
use image::RgbaImage;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Surface properties reported without decoding any pixel data.
///
/// Decoded images are always 8-bit RGBA regardless of `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EddsConfig {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// The decoded largest mip of a container, still in its storage format.
#[derive(Debug, Clone)]
pub struct MipPayload {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Read width, height and format from an EDDS file header.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<EddsConfig> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let (header, dx10) = read_headers(&mut reader)?;
    Ok(EddsConfig {
        width: header.width,
        height: header.height,
        format: detect_format(&header, dx10.as_ref()),
    })
}

/// Read and decode an EDDS file into an RGBA image of its largest mip.
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let payload = read_payload(path)?;
    edds_bcn::decode_image(
        &payload.data,
        payload.width,
        payload.height,
        payload.format,
    )
    .map_err(|source| Error::DecodeImage { source })
}

/// Read an EDDS file and return the raw payload of its largest mip.
pub fn read_payload<P: AsRef<Path>>(path: P) -> Result<MipPayload> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    read_payload_from(&mut reader)
}

/// Read the largest mip payload from an arbitrary reader.
pub fn read_payload_from<R: BufRead + Seek>(reader: &mut R) -> Result<MipPayload> {
    let (header, dx10) = read_headers(reader)?;
    let format = detect_format(&header, dx10.as_ref());

    let mut mip_count = 1;
    if header.caps & DDSCAPS_MIPMAP != 0 && header.mip_map_count > 0 {
        mip_count = header.mip_map_count;
    }

    let (data, width, height) = match read_largest_mip(reader, &header, format, mip_count) {
        Ok(result) => result,
        Err(err) => {
            debug!(%err, "block-table read failed, trying legacy single-block layout");
            read_legacy_single_block(reader, &header, dx10.as_ref(), format)?
        }
    };

    Ok(MipPayload {
        data,
        width,
        height,
        format,
    })
}

/// Read the DDS magic, header and optional DX10 extension.
fn read_headers<R: Read>(r: &mut R) -> Result<(DdsHeader, Option<Dx10Header>)> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)
        .map_err(|source| Error::DdsHeaderRead { source })?;
    if magic != DDS_MAGIC {
        return Err(Error::InvalidDdsMagic { magic });
    }

    let header = DdsHeader::read(r).map_err(|source| Error::DdsHeaderRead { source })?;

    let dx10 = if header.has_dx10_extension() {
        Some(Dx10Header::read(r).map_err(|source| Error::DdsDx10Read { source })?)
    } else {
        None
    };

    Ok((header, dx10))
}

/// Walk the block table, seek over every smaller mip and decode level 0.
fn read_largest_mip<R: BufRead + Seek>(
    r: &mut R,
    header: &DdsHeader,
    format: TextureFormat,
    mip_count: u32,
) -> Result<(Vec<u8>, u32, u32)> {
    let mip_count = mip_count.max(1);

    let table = read_block_table(r, mip_count).map_err(|e| Error::ReadBlockTable {
        source: Box::new(e),
    })?;

    for (index, entry) in table.iter().enumerate() {
        let mip = index as u32;
        let mip_level = mip_count - mip - 1;

        if mip_level != 0 {
            r.seek(SeekFrom::Current(i64::from(entry.size)))
                .map_err(|source| Error::SkipBlockBody { mip, source })?;
            continue;
        }

        let block = read_block_body(r, *entry).map_err(|e| Error::ReadBlockBody {
            mip,
            source: Box::new(e),
        })?;

        let width = crate::mipmap::mip_dimension(header.width, mip_level);
        let height = crate::mipmap::mip_dimension(header.height, mip_level);
        let expected =
            expected_payload_size(format, width, height).ok_or(Error::UnknownFormat { format })?;

        let data = decompress_block(&block, expected).map_err(|e| Error::DecompressBlock {
            mip,
            source: Box::new(e),
        })?;
        if data.len() != expected {
            return Err(Error::LargestMipSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        debug!(mip_count, width, height, "decoded largest mip from block table");
        return Ok((data, width, height));
    }

    Err(Error::PickLargestMip { mip_count })
}

/// Re-read everything after the headers as a single legacy blob.
///
/// The blob is tried as an LZ4 chunk stream first; failing that, a blob
/// whose length matches the expected payload exactly is taken as raw data.
fn read_legacy_single_block<R: BufRead + Seek>(
    r: &mut R,
    header: &DdsHeader,
    dx10: Option<&Dx10Header>,
    format: TextureFormat,
) -> Result<(Vec<u8>, u32, u32)> {
    let mut header_size = u64::from(4 + DDS_HEADER_SIZE);
    if dx10.is_some() {
        header_size += u64::from(DX10_HEADER_SIZE);
    }
    r.seek(SeekFrom::Start(header_size))
        .map_err(|source| Error::SeekDataStart { source })?;

    let mut remaining = Vec::new();
    r.read_to_end(&mut remaining)
        .map_err(|source| Error::ReadRemainingData { source })?;

    let expected = expected_payload_size(format, header.width, header.height)
        .ok_or(Error::UnknownFormat { format })?;

    let size = convert::i32_from_usize(remaining.len())?;
    let block = Block {
        magic: BlockMagic::Lz4,
        size,
        uncompressed_size: 0,
        data: remaining,
    };

    match decompress_block(&block, expected) {
        Ok(data) => {
            debug!("legacy payload decoded as a single LZ4 block");
            Ok((data, header.width, header.height))
        }
        Err(err) => {
            if block.data.len() == expected {
                debug!("legacy payload taken as raw uncompressed data");
                return Ok((block.data, header.width, header.height));
            }
            Err(Error::ParseSingleBlock {
                source: Box::new(err),
            })
        }
    }
}
