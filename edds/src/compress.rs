//! LZ4 chunk-stream compression.
//!
//! A payload is cut into 64 KiB chunks, each independently LZ4
//! block-compressed and framed with a 4-byte header: a 24-bit little-endian
//! compressed size and a flags byte whose high bit marks the last chunk.
//! Compression that does not pay for itself falls back to a `COPY` block for
//! the whole payload, never per chunk.

use crate::block::{Block, BlockMagic};
use crate::{convert, Error, Result, CHUNK_SIZE, LAST_CHUNK_FLAG};
use tracing::trace;

/// Payloads shorter than this are always stored as `COPY`.
const MIN_COMPRESS_SIZE: usize = 1024;

/// Compressed output (per chunk and whole payload) must stay below this
/// fraction of the input or the block falls back to `COPY`.
const MAX_COMPRESSED_RATIO: f64 = 0.85;

/// Largest value the 24-bit chunk size field can carry.
const MAX_CHUNK_COMPRESSED_SIZE: usize = 0x7F_FFFF;

/// Compress a payload into an `LZ4 ` block, or a `COPY` block when
/// compression is not profitable or the payload is short.
pub fn compress_block(data: &[u8]) -> Result<Block> {
    if data.len() > i32::MAX as usize {
        return Err(Error::InputTooLarge { len: data.len() });
    }
    let uncompressed_size = convert::i32_from_usize(data.len())?;

    if data.len() < MIN_COMPRESS_SIZE {
        trace!(len = data.len(), "payload below compression threshold, storing COPY");
        return Ok(copy_block(data, uncompressed_size));
    }

    let mut chunk_stream = Vec::new();
    let mut scratch = vec![0u8; lz4_flex::block::get_maximum_output_size(CHUNK_SIZE)];

    for (index, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
        let is_last = (index + 1) * CHUNK_SIZE >= data.len();

        let compressed_len = lz4_flex::block::compress_into(chunk, &mut scratch)
            .map_err(|source| Error::Lz4Compress { source })?;

        if compressed_len == 0
            || compressed_len as f64 > chunk.len() as f64 * MAX_COMPRESSED_RATIO
        {
            trace!(
                chunk = index,
                compressed_len,
                chunk_len = chunk.len(),
                "chunk not compressible, storing whole payload as COPY"
            );
            return Ok(copy_block(data, uncompressed_size));
        }
        if compressed_len > MAX_CHUNK_COMPRESSED_SIZE {
            return Err(Error::ChunkTooLarge { len: compressed_len });
        }

        chunk_stream.push(compressed_len as u8);
        chunk_stream.push((compressed_len >> 8) as u8);
        chunk_stream.push((compressed_len >> 16) as u8);
        chunk_stream.push(if is_last { LAST_CHUNK_FLAG } else { 0x00 });
        chunk_stream.extend_from_slice(&scratch[..compressed_len]);
    }

    // The body writer prepends the 4-byte uncompressed size.
    let total = 4 + chunk_stream.len();
    if total > i32::MAX as usize {
        return Err(Error::CompressedDataTooLarge { len: total });
    }
    if total as f64 > data.len() as f64 * MAX_COMPRESSED_RATIO {
        trace!(
            total,
            len = data.len(),
            "chunk stream not profitable, storing COPY"
        );
        return Ok(copy_block(data, uncompressed_size));
    }

    let size = convert::i32_from_usize(total)?;
    trace!(len = data.len(), total, "compressed payload into chunk stream");

    Ok(Block {
        magic: BlockMagic::Lz4,
        size,
        uncompressed_size,
        data: chunk_stream,
    })
}

fn copy_block(data: &[u8], size: i32) -> Block {
    Block {
        magic: BlockMagic::Copy,
        size,
        uncompressed_size: 0,
        data: data.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_payload_is_copy() {
        let data = vec![0u8; MIN_COMPRESS_SIZE - 1];
        let block = compress_block(&data).unwrap();
        assert_eq!(block.magic, BlockMagic::Copy);
        assert_eq!(block.size, data.len() as i32);
        assert_eq!(block.data, data);
    }

    #[test]
    fn test_empty_payload_is_copy() {
        let block = compress_block(&[]).unwrap();
        assert_eq!(block.magic, BlockMagic::Copy);
        assert_eq!(block.size, 0);
        assert!(block.data.is_empty());
    }

    #[test]
    fn test_zeros_compress() {
        let data = vec![0u8; 128 * 1024];
        let block = compress_block(&data).unwrap();
        assert_eq!(block.magic, BlockMagic::Lz4);
        assert_eq!(block.uncompressed_size, data.len() as i32);
        assert_eq!(block.size as usize, 4 + block.data.len());
        assert!((block.size as f64) < data.len() as f64 * MAX_COMPRESSED_RATIO);
    }

    #[test]
    fn test_incompressible_payload_falls_back_to_copy() {
        // A ramp with varying stride defeats LZ4 matching.
        let data: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let block = compress_block(&data).unwrap();
        assert_eq!(block.magic, BlockMagic::Copy);
        assert_eq!(block.data, data);
    }

    #[test]
    fn test_chunk_framing() {
        // Two full chunks and one partial.
        let data = vec![7u8; CHUNK_SIZE * 2 + 100];
        let block = compress_block(&data).unwrap();
        assert_eq!(block.magic, BlockMagic::Lz4);

        let mut offset = 0;
        let mut chunks = 0;
        let mut saw_last = false;
        while offset < block.data.len() {
            let c_size = block.data[offset] as usize
                | (block.data[offset + 1] as usize) << 8
                | (block.data[offset + 2] as usize) << 16;
            let flags = block.data[offset + 3];
            assert_eq!(flags & !LAST_CHUNK_FLAG, 0);
            saw_last = flags & LAST_CHUNK_FLAG != 0;
            offset += 4 + c_size;
            chunks += 1;
        }
        assert_eq!(offset, block.data.len());
        assert_eq!(chunks, 3);
        assert!(saw_last);
    }

    #[test]
    fn test_last_flag_only_on_final_chunk() {
        let data = vec![0u8; CHUNK_SIZE + CHUNK_SIZE / 2];
        let block = compress_block(&data).unwrap();

        let first_size = block.data[0] as usize
            | (block.data[1] as usize) << 8
            | (block.data[2] as usize) << 16;
        assert_eq!(block.data[3], 0x00);
        assert_eq!(block.data[4 + first_size + 3], LAST_CHUNK_FLAG);
    }
}
