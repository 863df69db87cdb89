//! Block framing: the table entries and bodies that carry each mipmap.
//!
//! A block-table entry is a 4-byte magic plus a little-endian `i32` size.
//! Only two magics exist; anything else (trailing NUL, lowercase) is from a
//! different dialect and is rejected outright.

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

/// Block encoding tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMagic {
    /// Uncompressed body, stored verbatim (`"COPY"`).
    Copy,
    /// LZ4 chunk-stream body with an uncompressed-size prefix (`"LZ4 "`).
    Lz4,
}

impl BlockMagic {
    /// On-disk tag for [`BlockMagic::Copy`].
    pub const COPY: [u8; 4] = *b"COPY";
    /// On-disk tag for [`BlockMagic::Lz4`]. The fourth byte is a space.
    pub const LZ4: [u8; 4] = *b"LZ4 ";

    /// Parse a 4-byte tag.
    pub fn from_bytes(magic: [u8; 4]) -> Result<Self> {
        match magic {
            Self::COPY => Ok(Self::Copy),
            Self::LZ4 => Ok(Self::Lz4),
            other => Err(Error::UnknownBlockMagic { magic: other }),
        }
    }

    /// The 4-byte on-disk tag.
    pub fn as_bytes(self) -> [u8; 4] {
        match self {
            Self::Copy => Self::COPY,
            Self::Lz4 => Self::LZ4,
        }
    }
}

impl fmt::Display for BlockMagic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("COPY"),
            Self::Lz4 => f.write_str("LZ4"),
        }
    }
}

/// One mipmap block.
///
/// For `COPY`, `data` is the raw payload and `size == data.len()`. For
/// `LZ4 `, `data` holds the chunk stream without the leading 4-byte
/// uncompressed-size prefix on the write side; `size` counts the prefix, so
/// the on-disk body is `4 + data.len()` bytes. On the read side the body is
/// taken as-is, prefix included, and the decompressor peels it back off.
#[derive(Debug, Clone)]
pub struct Block {
    pub magic: BlockMagic,
    pub size: i32,
    pub uncompressed_size: i32,
    pub data: Vec<u8>,
}

/// One parsed block-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub magic: BlockMagic,
    pub size: i32,
}

/// Read `mip_count` block-table entries, validating each.
pub fn read_block_table<R: Read>(r: &mut R, mip_count: u32) -> Result<Vec<BlockHeader>> {
    let mut headers = Vec::with_capacity(mip_count as usize);

    for index in 0..mip_count {
        let mut magic_bytes = [0u8; 4];
        r.read_exact(&mut magic_bytes)
            .map_err(|source| Error::BlockTableMagicRead { index, source })?;

        let size = r
            .read_i32::<LittleEndian>()
            .map_err(|source| Error::BlockTableSizeRead { index, source })?;

        let magic = BlockMagic::from_bytes(magic_bytes).map_err(|_| {
            Error::BlockTableUnknownMagic {
                index,
                magic: magic_bytes,
            }
        })?;

        if size < 0 {
            return Err(Error::BlockTableInvalidSize { index, size });
        }

        headers.push(BlockHeader { magic, size });
    }

    Ok(headers)
}

/// Read exactly `header.size` body bytes into a [`Block`].
///
/// No interpretation happens here; the chunk-stream codec owns that.
pub fn read_block_body<R: Read>(r: &mut R, header: BlockHeader) -> Result<Block> {
    if header.size < 0 {
        return Err(Error::BlockBodyInvalidSize { size: header.size });
    }

    let mut data = vec![0u8; header.size as usize];
    r.read_exact(&mut data).map_err(|source| Error::BlockBodyRead {
        magic: header.magic,
        source,
    })?;

    Ok(Block {
        magic: header.magic,
        size: header.size,
        uncompressed_size: 0,
        data,
    })
}

/// Write a block body (no table entry).
///
/// LZ4 bodies get their little-endian uncompressed-size prefix here; COPY
/// bodies are written verbatim.
pub fn write_block_data<W: Write>(w: &mut W, block: &Block) -> Result<()> {
    match block.magic {
        BlockMagic::Lz4 => {
            w.write_i32::<LittleEndian>(block.uncompressed_size)
                .map_err(|source| Error::WriteUncompressedSize { source })?;
            w.write_all(&block.data)
                .map_err(|source| Error::WriteChunkStream { source })?;
        }
        BlockMagic::Copy => {
            w.write_all(&block.data)
                .map_err(|source| Error::WriteBlockPayload { source })?;
        }
    }
    Ok(())
}
