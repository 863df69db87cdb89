//! RGBA image to texture payload encoding.

use crate::{alpha, bc1, rgba, BcnError, Result, TextureFormat};
use image::RgbaImage;

/// Encode an RGBA image into a raw payload of the given format.
///
/// The output is exactly [`TextureFormat::payload_size`] bytes. Block
/// formats pad partial edge blocks with transparent black, matching how the
/// decoder clips them back out.
pub fn encode_image(image: &RgbaImage, format: TextureFormat) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BcnError::InvalidDimensions { width, height });
    }

    match format {
        TextureFormat::Rgba8 => Ok(image.as_raw().clone()),
        TextureFormat::Bgra8 => Ok(rgba::rgba_to_bgra(image.as_raw())),
        TextureFormat::Unknown => Err(BcnError::UnsupportedFormat(format)),
        bcn => Ok(encode_blocks(image, bcn)),
    }
}

fn encode_blocks(image: &RgbaImage, format: TextureFormat) -> Vec<u8> {
    let blocks_wide = image.width().div_ceil(4);
    let blocks_high = image.height().div_ceil(4);
    let block_size = format.bytes_per_block().unwrap_or(0);

    let mut output = Vec::with_capacity((blocks_wide * blocks_high) as usize * block_size);

    for block_y in 0..blocks_high {
        for block_x in 0..blocks_wide {
            let tile = extract_tile(image, block_x, block_y);
            match format {
                TextureFormat::Dxt1 => {
                    output.extend_from_slice(&bc1::encode_block(&tile));
                }
                TextureFormat::Dxt3 => {
                    let alphas = channel(&tile, 3);
                    output.extend_from_slice(&alpha::encode_explicit_block(&alphas));
                    output.extend_from_slice(&bc1::encode_block(&tile));
                }
                TextureFormat::Dxt5 => {
                    let alphas = channel(&tile, 3);
                    output.extend_from_slice(&alpha::encode_interpolated_block(&alphas));
                    output.extend_from_slice(&bc1::encode_block(&tile));
                }
                TextureFormat::Bc4 => {
                    let reds = channel(&tile, 0);
                    output.extend_from_slice(&alpha::encode_interpolated_block(&reds));
                }
                TextureFormat::Bc5 => {
                    let reds = channel(&tile, 0);
                    let greens = channel(&tile, 1);
                    output.extend_from_slice(&alpha::encode_interpolated_block(&reds));
                    output.extend_from_slice(&alpha::encode_interpolated_block(&greens));
                }
                TextureFormat::Rgba8 | TextureFormat::Bgra8 | TextureFormat::Unknown => {
                    unreachable!("raw formats handled by encode_image")
                }
            }
        }
    }

    output
}

/// Pull one 4x4 tile out of the image, padding past-the-edge pixels with
/// transparent black.
fn extract_tile(image: &RgbaImage, block_x: u32, block_y: u32) -> [[u8; 4]; 16] {
    let mut tile = [[0u8; 4]; 16];
    for y in 0..4u32 {
        for x in 0..4u32 {
            let px = block_x * 4 + x;
            let py = block_y * 4 + y;
            if px < image.width() && py < image.height() {
                tile[(y * 4 + x) as usize] = image.get_pixel(px, py).0;
            }
        }
    }
    tile
}

fn channel(tile: &[[u8; 4]; 16], index: usize) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (value, pixel) in out.iter_mut().zip(tile.iter()) {
        *value = pixel[index];
    }
    out
}
