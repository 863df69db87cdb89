//! Error types for EDDS container parsing, compression and writing.
//!
//! Every distinct failure condition is its own variant so callers can match
//! on the kind without string inspection. Variants wrapping another error
//! carry it as `#[source]`.

use crate::block::BlockMagic;
use edds_bcn::{BcnError, TextureFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for EDDS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// EDDS error types.
#[derive(Debug, Error)]
pub enum Error {
    // -- size and conversion guards --
    /// A length or dimension does not fit the on-disk 32-bit field.
    #[error("size exceeds 32-bit range: {value}")]
    SizeOverflow { value: u64 },

    /// Input payload is too large to compress.
    #[error("input data too large: {len} bytes")]
    InputTooLarge { len: usize },

    /// The assembled chunk stream exceeds the 32-bit block size field.
    #[error("compressed data too large: {len} bytes")]
    CompressedDataTooLarge { len: usize },

    /// A single compressed chunk exceeds the 24-bit size field.
    #[error("compressed chunk too large: {len} bytes")]
    ChunkTooLarge { len: usize },

    // -- LZ4 chunk-stream codec --
    /// LZ4 block compression failed.
    #[error("LZ4 compression failed")]
    Lz4Compress {
        #[source]
        source: lz4_flex::block::CompressError,
    },

    /// LZ4 block decode failed.
    #[error("LZ4 decode failed")]
    Lz4Decode {
        #[source]
        source: lz4_flex::block::DecompressError,
    },

    /// Fewer than 4 bytes remain where a chunk header is required.
    #[error("LZ4 chunk-stream truncated: need 4 bytes header, have {remaining}")]
    ChunkStreamTruncated { remaining: usize },

    /// A chunk header carries flag bits other than the last-chunk marker.
    #[error("unknown LZ4 flags: {flags:#04x}")]
    UnknownLz4Flags { flags: u8 },

    /// A chunk header declares a zero or overrunning compressed size.
    #[error("invalid compressed chunk size: {size} (remaining {remaining})")]
    InvalidChunkSize { size: usize, remaining: usize },

    /// More chunks follow after the output buffer is already full.
    #[error("decoded LZ4 overruns target buffer")]
    DecodeOverrun,

    /// The chunk stream decoded to fewer bytes than declared.
    #[error("LZ4 decoded size mismatch: expected {expected}, got {actual}")]
    DecodedSizeMismatch { expected: usize, actual: usize },

    /// Bytes remain after the last-chunk marker.
    #[error("LZ4 block length mismatch: {remaining} bytes left after decode")]
    BlockLengthMismatch { remaining: usize },

    /// The resolved decode target size is not positive.
    #[error("invalid target size: {size}")]
    InvalidTargetSize { size: i64 },

    /// A COPY block body does not match the expected payload size.
    #[error("COPY block size mismatch: expected {expected}, got {actual}")]
    CopySizeMismatch { expected: usize, actual: usize },

    /// A 4-byte tag is neither `COPY` nor `LZ4 `.
    #[error("unknown block magic: {magic:?}")]
    UnknownBlockMagic { magic: [u8; 4] },

    // -- block table and bodies --
    /// Reading a block-table magic failed.
    #[error("reading block table magic {index} failed")]
    BlockTableMagicRead {
        index: u32,
        #[source]
        source: std::io::Error,
    },

    /// Reading a block-table size failed.
    #[error("reading block table size {index} failed")]
    BlockTableSizeRead {
        index: u32,
        #[source]
        source: std::io::Error,
    },

    /// A block-table entry carries an unknown magic.
    #[error("unknown block magic in table entry {index}: {magic:?}")]
    BlockTableUnknownMagic { index: u32, magic: [u8; 4] },

    /// A block-table entry carries a negative size.
    #[error("invalid block size in table entry {index}: {size}")]
    BlockTableInvalidSize { index: u32, size: i32 },

    /// A block body size is negative.
    #[error("invalid block size: {size}")]
    BlockBodyInvalidSize { size: i32 },

    /// Reading a block body failed.
    #[error("reading {magic} block body failed")]
    BlockBodyRead {
        magic: BlockMagic,
        #[source]
        source: std::io::Error,
    },

    // -- container I/O --
    /// Opening the input file failed.
    #[error("open file failed: {path:?}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the output file failed.
    #[error("create file failed: {path:?}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with the `DDS ` magic.
    #[error("invalid DDS magic: expected \"DDS \", got {magic:?}")]
    InvalidDdsMagic { magic: [u8; 4] },

    /// Writing the DDS magic failed.
    #[error("writing DDS magic failed")]
    WriteDdsMagic {
        #[source]
        source: std::io::Error,
    },

    /// Writing the DDS header failed.
    #[error("writing DDS header failed")]
    WriteDdsHeader {
        #[source]
        source: std::io::Error,
    },

    /// Writing a block-table magic failed.
    #[error("writing block magic for mipmap {mip} failed")]
    WriteBlockMagic {
        mip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Writing a block-table size failed.
    #[error("writing block size for mipmap {mip} failed")]
    WriteBlockSize {
        mip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Writing a block body failed.
    #[error("writing block data for mipmap {mip} failed")]
    WriteBlockData {
        mip: usize,
        #[source]
        source: Box<Error>,
    },

    /// Writing the LZ4 uncompressed-size prefix failed.
    #[error("writing uncompressed size failed")]
    WriteUncompressedSize {
        #[source]
        source: std::io::Error,
    },

    /// Writing the LZ4 chunk stream failed.
    #[error("writing chunk stream failed")]
    WriteChunkStream {
        #[source]
        source: std::io::Error,
    },

    /// Writing a COPY payload failed.
    #[error("writing block payload failed")]
    WriteBlockPayload {
        #[source]
        source: std::io::Error,
    },

    /// Reading the DDS header failed.
    #[error("reading DDS header failed")]
    DdsHeaderRead {
        #[source]
        source: std::io::Error,
    },

    /// Reading the DX10 header extension failed.
    #[error("reading DDS DX10 header failed")]
    DdsDx10Read {
        #[source]
        source: std::io::Error,
    },

    /// Reading the block table failed.
    #[error("read block table failed")]
    ReadBlockTable {
        #[source]
        source: Box<Error>,
    },

    /// Seeking over a smaller mip body failed.
    #[error("skip block body failed: mipmap {mip}")]
    SkipBlockBody {
        mip: u32,
        #[source]
        source: std::io::Error,
    },

    /// Reading the largest mip body failed.
    #[error("read block body failed: mipmap {mip}")]
    ReadBlockBody {
        mip: u32,
        #[source]
        source: Box<Error>,
    },

    /// Seeking to the start of the legacy payload failed.
    #[error("seek to data start failed")]
    SeekDataStart {
        #[source]
        source: std::io::Error,
    },

    /// Reading the legacy payload failed.
    #[error("reading remaining data failed")]
    ReadRemainingData {
        #[source]
        source: std::io::Error,
    },

    /// Reading an LZ4 chunk header failed.
    #[error("reading chunk header failed")]
    ChunkHeaderRead {
        #[source]
        source: std::io::Error,
    },

    /// Reading LZ4 chunk data failed.
    #[error("reading chunk data failed")]
    ChunkDataRead {
        #[source]
        source: std::io::Error,
    },

    // -- semantic --
    /// The requested format cannot be written.
    #[error("invalid format")]
    InvalidFormat,

    /// The file's pixel format is not supported.
    #[error("unknown format: {format}")]
    UnknownFormat { format: TextureFormat },

    /// No mipmap payloads were supplied.
    #[error("empty mipmaps")]
    EmptyMipmaps,

    /// A mipmap payload does not match its expected size.
    #[error("mipmap size mismatch: mipmap {mip}: expected {expected}, got {actual}")]
    MipmapSizeMismatch {
        mip: usize,
        expected: usize,
        actual: usize,
    },

    /// The decompressed largest mip does not match its expected size.
    #[error("largest mip size mismatch: expected {expected}, got {actual}")]
    LargestMipSizeMismatch { expected: usize, actual: usize },

    /// The block-table walk never reached mip level 0.
    #[error("failed to pick largest mip: mipmaps={mip_count}")]
    PickLargestMip { mip_count: u32 },

    /// The legacy single-block payload is neither a chunk stream nor raw data.
    #[error("failed to parse single block")]
    ParseSingleBlock {
        #[source]
        source: Box<Error>,
    },

    /// Decoding the mip payload into pixels failed.
    #[error("decode image failed")]
    DecodeImage {
        #[source]
        source: BcnError,
    },

    /// Compressing (or encoding) a mipmap failed.
    #[error("compress mipmap failed: mipmap {mip}")]
    CompressMipmap {
        mip: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Decompressing a block failed.
    #[error("decompress block failed: mipmap {mip}")]
    DecompressBlock {
        mip: u32,
        #[source]
        source: Box<Error>,
    },
}
