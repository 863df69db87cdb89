//! End-to-end tests over real files and handcrafted containers.

use edds::{
    compress_block, decompress_block, expected_payload_size, header::DDS_HEADER_SIZE,
    mip_dimension, read_config, read_image, read_payload, write_from_blocks, write_image,
    BlockMagic, Error, TextureFormat,
};
use image::RgbaImage;
use proptest::prelude::*;

fn pattern(len: usize, kind: u8) -> Vec<u8> {
    match kind {
        0 => vec![0u8; len],
        1 => vec![0xFFu8; len],
        2 => (0..len).map(|i| (i & 0xff) as u8).collect(),
        _ => (0..len).map(|i| ((i * 31 + 7) & 0xff) as u8).collect(),
    }
}

#[test]
fn test_codec_round_trip_grid() {
    for len in [0usize, 1, 1023, 1024, 65535, 65536, 65537, 131072, 1_000_003] {
        for kind in 0..4u8 {
            let data = pattern(len, kind);
            let block = compress_block(&data).unwrap();
            let out = decompress_block(&block, data.len()).unwrap();
            assert_eq!(out, data, "len {len} pattern {kind}");
        }
    }
}

#[test]
fn test_copy_short_circuit() {
    for len in [0usize, 1, 512, 1023] {
        let data = pattern(len, 3);
        let block = compress_block(&data).unwrap();
        assert_eq!(block.magic, BlockMagic::Copy, "len {len}");
        assert_eq!(block.data, data);
    }
}

#[test]
fn test_compression_threshold() {
    // All zeros must compress well under the 85% bound.
    let zeros = vec![0u8; 65536];
    let block = compress_block(&zeros).unwrap();
    assert_eq!(block.magic, BlockMagic::Lz4);
    assert!((block.size as f64) < zeros.len() as f64 * 0.85);

    // Pseudo-random noise must fall back to COPY.
    let noise: Vec<u8> = (0..65536u32)
        .map(|i| (i.wrapping_mul(2654435761).rotate_right(11) ^ i) as u8)
        .collect();
    let block = compress_block(&noise).unwrap();
    assert_eq!(block.magic, BlockMagic::Copy);
}

#[test]
fn test_end_to_end_bgra8_byte_exact() {
    let img = RgbaImage::from_fn(8, 8, |x, y| {
        image::Rgba([(x * 30) as u8, (y * 30) as u8, 100, 255])
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.edds");

    write_image(&img, &path, TextureFormat::Bgra8, 0).unwrap();

    let got = read_image(&path).unwrap();
    assert_eq!(got.dimensions(), (8, 8));
    assert_eq!(got.as_raw(), img.as_raw());
}

#[test]
fn test_round_trip_uncompressed_copy_path() {
    let img = RgbaImage::from_fn(8, 8, |x, y| {
        image::Rgba([(x * 20) as u8, (y * 20) as u8, 90, 255])
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.edds");

    edds::write_image_with_compression(&img, &path, TextureFormat::Bgra8, 1, false).unwrap();

    let got = read_image(&path).unwrap();
    assert_eq!(got.as_raw(), img.as_raw());
}

#[test]
fn test_large_compressible_image_uses_lz4() {
    // 64x64 BGRA8 is a 16 KiB payload of long runs; it must land on the
    // LZ4 path and still round-trip exactly.
    let img = RgbaImage::from_fn(64, 64, |_, y| image::Rgba([(y * 4) as u8, 10, 20, 255]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.edds");
    write_image(&img, &path, TextureFormat::Bgra8, 1).unwrap();

    let raw = std::fs::read(&path).unwrap();
    let table = 4 + DDS_HEADER_SIZE as usize;
    assert_eq!(&raw[table..table + 4], b"LZ4 ");

    let got = read_image(&path).unwrap();
    assert_eq!(got.as_raw(), img.as_raw());
}

#[test]
fn test_block_table_invariant() {
    // 16x16 BGRA8 with 5 levels, stored uncompressed so every table size is
    // the exact payload size.
    let mips: Vec<Vec<u8>> = (0..5u32)
        .map(|level| {
            let dim = mip_dimension(16, level);
            vec![level as u8; (dim * dim * 4) as usize]
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mips.edds");
    edds::write_from_blocks_with_compression(&path, TextureFormat::Bgra8, 16, 16, &mips, false)
        .unwrap();

    let raw = std::fs::read(&path).unwrap();
    let mut offset = 4 + DDS_HEADER_SIZE as usize;
    let mut sizes = Vec::new();
    for _ in 0..5 {
        let magic = &raw[offset..offset + 4];
        assert!(magic == b"COPY" || magic == b"LZ4 ");
        let size = i32::from_le_bytes([
            raw[offset + 4],
            raw[offset + 5],
            raw[offset + 6],
            raw[offset + 7],
        ]);
        assert!(size >= 0);
        sizes.push(size as usize);
        offset += 8;
    }

    // Entry i is mip level N-1-i: smallest body first.
    assert_eq!(sizes, vec![4, 16, 64, 256, 1024]);
}

#[test]
fn test_mip_dimension_chain_in_file() {
    let img = RgbaImage::from_pixel(16, 4, image::Rgba([5, 6, 7, 255]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.edds");
    write_image(&img, &path, TextureFormat::Bgra8, 0).unwrap();

    // 16x4 has 5 levels; each block size follows the dimension law.
    let raw = std::fs::read(&path).unwrap();
    let mut offset = 4 + DDS_HEADER_SIZE as usize;
    for i in 0..5u32 {
        let level = 5 - 1 - i;
        let expected = expected_payload_size(
            TextureFormat::Bgra8,
            mip_dimension(16, level),
            mip_dimension(4, level),
        )
        .unwrap();
        let size = i32::from_le_bytes([
            raw[offset + 4],
            raw[offset + 5],
            raw[offset + 6],
            raw[offset + 7],
        ]);
        assert_eq!(size as usize, expected, "table entry {i}");
        offset += 8;
    }
}

#[test]
fn test_write_rejections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.edds");

    let err = write_from_blocks(&path, TextureFormat::Dxt1, 4, 4, &[]).unwrap_err();
    assert!(matches!(err, Error::EmptyMipmaps));

    let err = write_from_blocks(&path, TextureFormat::Unknown, 4, 4, &[vec![0; 8]]).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat));

    let err = write_from_blocks(&path, TextureFormat::Dxt1, 4, 4, &[vec![0; 7]]).unwrap_err();
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
fn test_read_config_bcn() {
    let img = RgbaImage::from_pixel(16, 16, image::Rgba([100, 150, 200, 255]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dxt5.edds");
    write_image(&img, &path, TextureFormat::Dxt5, 1).unwrap();

    let config = read_config(&path).unwrap();
    assert_eq!(config.width, 16);
    assert_eq!(config.height, 16);
    assert_eq!(config.format, TextureFormat::Dxt5);
}

#[test]
fn test_read_config_all_bcn_formats() {
    let img = RgbaImage::from_pixel(8, 8, image::Rgba([40, 80, 120, 255]));
    let dir = tempfile::tempdir().unwrap();

    for format in [
        TextureFormat::Dxt1,
        TextureFormat::Dxt3,
        TextureFormat::Dxt5,
        TextureFormat::Bc4,
        TextureFormat::Bc5,
    ] {
        let path = dir.path().join(format!("{format}.edds"));
        write_image(&img, &path, format, 2).unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.format, format, "format {format}");
        assert_eq!((config.width, config.height), (8, 8));

        // The mip payload must also decode to an image of the right size.
        let decoded = read_image(&path).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }
}

#[test]
fn test_mip_cap_respected() {
    let img = RgbaImage::from_pixel(64, 64, image::Rgba([9, 9, 9, 255]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capped.edds");
    write_image(&img, &path, TextureFormat::Bgra8, 3).unwrap();

    let payload = read_payload(&path).unwrap();
    assert_eq!((payload.width, payload.height), (64, 64));

    // Only 3 table entries were written.
    let raw = std::fs::read(&path).unwrap();
    let table = 4 + DDS_HEADER_SIZE as usize;
    let body_total: usize = (0..3)
        .map(|i| {
            i32::from_le_bytes([
                raw[table + i * 8 + 4],
                raw[table + i * 8 + 5],
                raw[table + i * 8 + 6],
                raw[table + i * 8 + 7],
            ]) as usize
        })
        .sum();
    assert_eq!(raw.len(), table + 3 * 8 + body_total);
}

#[test]
fn test_legacy_single_block_file() {
    // A valid header followed by a bare RGBA payload: no table, no framing.
    let header = edds::DdsHeader::for_texture(4, 4, 1, TextureFormat::Rgba8).unwrap();
    let mut raw = Vec::new();
    raw.extend_from_slice(&edds::DDS_MAGIC);
    header.write(&mut raw).unwrap();
    let payload: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(3)).collect();
    raw.extend_from_slice(&payload);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.edds");
    std::fs::write(&path, &raw).unwrap();

    let mip = read_payload(&path).unwrap();
    assert_eq!(mip.data, payload);
    assert_eq!((mip.width, mip.height), (4, 4));
}

#[test]
fn test_missing_file_error() {
    let err = read_config("/nonexistent/missing.edds").unwrap_err();
    assert!(matches!(err, Error::OpenFile { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any payload survives a compress/decompress round trip.
    #[test]
    fn codec_round_trip_always(data in prop::collection::vec(any::<u8>(), 0..100_000)) {
        let block = compress_block(&data).unwrap();
        let out = decompress_block(&block, data.len()).unwrap();
        prop_assert_eq!(out, data);
    }

    /// The COPY short-circuit always applies below 1024 bytes.
    #[test]
    fn short_payloads_stay_copy(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let block = compress_block(&data).unwrap();
        prop_assert_eq!(block.magic, BlockMagic::Copy);
    }
}
