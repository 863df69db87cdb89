//! Texture payload to RGBA image decoding.

use crate::{alpha, bc1, rgba, BcnError, Result, TextureFormat};
use image::RgbaImage;

/// Decode a raw payload of the given format into an RGBA image.
///
/// The payload length must match [`TextureFormat::payload_size`] exactly.
pub fn decode_image(
    data: &[u8],
    width: u32,
    height: u32,
    format: TextureFormat,
) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(BcnError::InvalidDimensions { width, height });
    }

    let expected = format
        .payload_size(width, height)
        .ok_or(BcnError::UnsupportedFormat(format))?;
    if data.len() != expected {
        return Err(BcnError::PayloadSizeMismatch {
            format,
            width,
            height,
            expected,
            actual: data.len(),
        });
    }

    match format {
        TextureFormat::Rgba8 => raw_image(data.to_vec(), width, height, format),
        TextureFormat::Bgra8 => raw_image(rgba::bgra_to_rgba(data), width, height, format),
        TextureFormat::Unknown => Err(BcnError::UnsupportedFormat(format)),
        bcn => Ok(decode_blocks(data, width, height, bcn)),
    }
}

fn raw_image(data: Vec<u8>, width: u32, height: u32, format: TextureFormat) -> Result<RgbaImage> {
    let expected = (width as usize) * (height as usize) * 4;
    let actual = data.len();
    RgbaImage::from_raw(width, height, data).ok_or(BcnError::PayloadSizeMismatch {
        format,
        width,
        height,
        expected,
        actual,
    })
}

fn decode_blocks(data: &[u8], width: u32, height: u32, format: TextureFormat) -> RgbaImage {
    let blocks_wide = width.div_ceil(4);
    let blocks_high = height.div_ceil(4);
    let block_size = format.bytes_per_block().unwrap_or(0);

    let mut image = RgbaImage::new(width, height);

    for block_y in 0..blocks_high {
        for block_x in 0..blocks_wide {
            let offset = ((block_y * blocks_wide + block_x) as usize) * block_size;
            let block = &data[offset..offset + block_size];
            let tile = decode_tile(block, format);
            place_tile(&mut image, block_x, block_y, &tile);
        }
    }

    image
}

fn decode_tile(block: &[u8], format: TextureFormat) -> [[u8; 4]; 16] {
    match format {
        TextureFormat::Dxt1 => bc1::decode_block(block, false),
        TextureFormat::Dxt3 => {
            let alphas = alpha::decode_explicit_block(&block[0..8]);
            let mut tile = bc1::decode_block(&block[8..16], true);
            for (pixel, a) in tile.iter_mut().zip(alphas.iter()) {
                pixel[3] = *a;
            }
            tile
        }
        TextureFormat::Dxt5 => {
            let alphas = alpha::decode_interpolated_block(&block[0..8]);
            let mut tile = bc1::decode_block(&block[8..16], true);
            for (pixel, a) in tile.iter_mut().zip(alphas.iter()) {
                pixel[3] = *a;
            }
            tile
        }
        TextureFormat::Bc4 => {
            let reds = alpha::decode_interpolated_block(&block[0..8]);
            let mut tile = [[0u8; 4]; 16];
            for (pixel, r) in tile.iter_mut().zip(reds.iter()) {
                *pixel = [*r, *r, *r, 255];
            }
            tile
        }
        TextureFormat::Bc5 => {
            let reds = alpha::decode_interpolated_block(&block[0..8]);
            let greens = alpha::decode_interpolated_block(&block[8..16]);
            let mut tile = [[0u8; 4]; 16];
            for (i, pixel) in tile.iter_mut().enumerate() {
                // Blue is not stored; normal maps reconstruct it in the shader.
                *pixel = [reds[i], greens[i], 128, 255];
            }
            tile
        }
        TextureFormat::Rgba8 | TextureFormat::Bgra8 | TextureFormat::Unknown => {
            unreachable!("raw formats handled by decode_image")
        }
    }
}

/// Write a decoded 4x4 tile into the image, clipping past-the-edge pixels.
fn place_tile(image: &mut RgbaImage, block_x: u32, block_y: u32, tile: &[[u8; 4]; 16]) {
    for y in 0..4u32 {
        for x in 0..4u32 {
            let px = block_x * 4 + x;
            let py = block_y * 4 + y;
            if px < image.width() && py < image.height() {
                image.put_pixel(px, py, image::Rgba(tile[(y * 4 + x) as usize]));
            }
        }
    }
}
