//! Mipmap pyramid generation.

use image::RgbaImage;

/// Generate the full mipmap chain for an image, largest first.
///
/// Each level halves both dimensions with a 2x2 box filter; a dimension
/// stops at 1 while the other keeps halving, so a 8x2 source yields
/// 8x2, 4x1, 2x1, 1x1.
pub fn generate_mipmaps(source: &RgbaImage) -> Vec<RgbaImage> {
    let mut chain = vec![source.clone()];

    let mut current = source.clone();
    while current.width() > 1 || current.height() > 1 {
        current = downsample(&current);
        chain.push(current.clone());
    }

    chain
}

fn downsample(source: &RgbaImage) -> RgbaImage {
    let new_width = (source.width() / 2).max(1);
    let new_height = (source.height() / 2).max(1);

    RgbaImage::from_fn(new_width, new_height, |x, y| {
        let x0 = (x * 2).min(source.width() - 1);
        let y0 = (y * 2).min(source.height() - 1);
        let x1 = (x * 2 + 1).min(source.width() - 1);
        let y1 = (y * 2 + 1).min(source.height() - 1);

        let samples = [
            source.get_pixel(x0, y0).0,
            source.get_pixel(x1, y0).0,
            source.get_pixel(x0, y1).0,
            source.get_pixel(x1, y1).0,
        ];

        let mut avg = [0u8; 4];
        for c in 0..4 {
            let sum: u16 = samples.iter().map(|p| p[c] as u16).sum();
            avg[c] = (sum / 4) as u8;
        }
        image::Rgba(avg)
    })
}
