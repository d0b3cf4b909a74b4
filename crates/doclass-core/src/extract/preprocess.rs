//! Image cleanup before OCR.

use image::{imageops, DynamicImage, GrayImage, Luma};

/// Gaussian blur sigma applied before thresholding.
const BLUR_SIGMA: f32 = 1.1;
/// Side of the neighbourhood used for the local threshold.
const THRESHOLD_BLOCK: u32 = 11;
/// Offset subtracted from the local mean.
const THRESHOLD_OFFSET: i32 = 2;

/// Grayscale, blur, binarise with a local threshold and close small gaps.
pub fn prepare_for_ocr(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let blurred = imageops::blur(&gray, BLUR_SIGMA);
    let binary = adaptive_threshold(&blurred, THRESHOLD_BLOCK, THRESHOLD_OFFSET);
    DynamicImage::ImageLuma8(close(&binary))
}

/// Pixels brighter than their neighbourhood mean minus `offset` become white.
fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let half = block_size / 2;

    // Summed-area table, one row and column larger than the image.
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += u64::from(image.get_pixel(x as u32, y as u32)[0]);
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(half) as usize;
        let y0 = y.saturating_sub(half) as usize;
        let x1 = (x + half + 1).min(width) as usize;
        let y1 = (y + half + 1).min(height) as usize;

        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        let mean = (sum / count) as i32;

        let value = i32::from(image.get_pixel(x, y)[0]);
        Luma([if value > mean - offset { 255 } else { 0 }])
    })
}

/// Morphological closing (dilate then erode) with a 3x3 square.
fn close(image: &GrayImage) -> GrayImage {
    let dilated = filter3x3(image, u8::max);
    filter3x3(&dilated, u8::min)
}

fn filter3x3(image: &GrayImage, pick: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut value = image.get_pixel(x, y)[0];
        for ny in y.saturating_sub(1)..(y + 2).min(height) {
            for nx in x.saturating_sub(1)..(x + 2).min(width) {
                value = pick(value, image.get_pixel(nx, ny)[0]);
            }
        }
        Luma([value])
    })
}
