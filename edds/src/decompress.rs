//! LZ4 chunk-stream decompression.
//!
//! Chunks are decoded in order against a rolling 64 KiB dictionary of the
//! most recently produced bytes, so back-references that cross a chunk
//! boundary resolve. The dictionary is a plain window: after every chunk it
//! ends with the newest decoded byte and never exceeds 64 KiB.

use crate::block::{Block, BlockMagic};
use crate::{Error, Result, CHUNK_SIZE, DICT_CAP, LAST_CHUNK_FLAG};
use std::io::Read;
use tracing::trace;

/// Decompress a block into its raw payload.
///
/// `expected_uncompressed_size` comes from the caller's mip geometry; an
/// embedded uncompressed size in the block overrides it.
pub fn decompress_block(block: &Block, expected_uncompressed_size: usize) -> Result<Vec<u8>> {
    match block.magic {
        BlockMagic::Copy => {
            if block.data.len() != expected_uncompressed_size {
                return Err(Error::CopySizeMismatch {
                    expected: expected_uncompressed_size,
                    actual: block.data.len(),
                });
            }
            Ok(block.data.clone())
        }
        BlockMagic::Lz4 => decompress_chunk_stream(block, expected_uncompressed_size),
    }
}

fn decompress_chunk_stream(block: &Block, expected_uncompressed_size: usize) -> Result<Vec<u8>> {
    let mut target_size = expected_uncompressed_size as i64;
    if block.uncompressed_size > 0 {
        target_size = i64::from(block.uncompressed_size);
    }

    // Some bodies carry the uncompressed-size prefix inside the data (the
    // reader hands bodies over verbatim); others had it stripped by the
    // body writer. Treat the first 4 bytes as that prefix only when they
    // match a size we already expect AND the following chunk size is
    // plausible.
    let mut data: &[u8] = &block.data;
    if data.len() >= 8 {
        let peek = i64::from(u32::from_le_bytes([data[0], data[1], data[2], data[3]]));
        let c0 = data[4] as u32 | (data[5] as u32) << 8 | (data[6] as u32) << 16;
        if (peek == expected_uncompressed_size as i64 || peek == target_size)
            && c0 > 0
            && c0 < (1 << 20)
        {
            trace!(peek, "consumed embedded uncompressed-size prefix");
            target_size = peek;
            data = &data[4..];
        }
    }

    if target_size <= 0 {
        return Err(Error::InvalidTargetSize { size: target_size });
    }
    let target_size = target_size as usize;

    let mut dict = vec![0u8; DICT_CAP];
    let mut dict_size = 0usize;

    let mut target = vec![0u8; target_size];
    let mut out = 0usize;

    let mut reader = data;

    loop {
        if reader.len() < 4 {
            return Err(Error::ChunkStreamTruncated {
                remaining: reader.len(),
            });
        }

        let mut header = [0u8; 4];
        reader
            .read_exact(&mut header)
            .map_err(|source| Error::ChunkHeaderRead { source })?;

        let c_size =
            header[0] as usize | (header[1] as usize) << 8 | (header[2] as usize) << 16;
        let flags = header[3];
        if flags & !LAST_CHUNK_FLAG != 0 {
            return Err(Error::UnknownLz4Flags { flags });
        }
        if c_size == 0 || c_size > reader.len() {
            return Err(Error::InvalidChunkSize {
                size: c_size,
                remaining: reader.len(),
            });
        }

        let mut compressed = vec![0u8; c_size];
        reader
            .read_exact(&mut compressed)
            .map_err(|source| Error::ChunkDataRead { source })?;

        let remaining = target_size - out;
        if remaining == 0 {
            return Err(Error::DecodeOverrun);
        }
        let want = CHUNK_SIZE.min(remaining);

        let produced = lz4_flex::block::decompress_into_with_dict(
            &compressed,
            &mut target[out..out + want],
            &dict[..dict_size],
        )
        .map_err(|source| Error::Lz4Decode { source })?;

        out += produced;

        update_dictionary(&mut dict, &mut dict_size, &target[out - produced..out]);

        if flags & LAST_CHUNK_FLAG != 0 {
            break;
        }
    }

    if out != target_size {
        return Err(Error::DecodedSizeMismatch {
            expected: target_size,
            actual: out,
        });
    }
    if !reader.is_empty() {
        return Err(Error::BlockLengthMismatch {
            remaining: reader.len(),
        });
    }

    Ok(target)
}

/// Roll the dictionary forward so it ends with the newest decoded bytes.
///
/// Three cases: a chunk of 64 KiB or more replaces the window outright; a
/// chunk that fits the remaining capacity is appended; otherwise the
/// existing contents shift left to make exactly enough tail room.
fn update_dictionary(dict: &mut [u8], dict_size: &mut usize, decoded: &[u8]) {
    if decoded.len() >= DICT_CAP {
        dict.copy_from_slice(&decoded[decoded.len() - DICT_CAP..]);
        *dict_size = DICT_CAP;
    } else if decoded.len() <= DICT_CAP - *dict_size {
        dict[*dict_size..*dict_size + decoded.len()].copy_from_slice(decoded);
        *dict_size += decoded.len();
    } else {
        let shift = decoded.len() - (DICT_CAP - *dict_size);
        dict.copy_within(shift..*dict_size, 0);
        dict[DICT_CAP - decoded.len()..].copy_from_slice(decoded);
        *dict_size = DICT_CAP;
    }
}
