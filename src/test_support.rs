//! Image fixtures shared by the unit tests.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

fn photo_like(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let noise = ((x * 7919 + y * 104729) % 31) as u8;
        Rgb([
            (x % 256) as u8 ^ noise,
            (y % 256) as u8,
            ((x + y) % 256) as u8 ^ (noise << 2),
        ])
    })
}

/// Write a high quality JPEG with photographic-ish content
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    write_jpeg_with_quality(path, width, height, 100);
}

/// Write a JPEG with photographic-ish content at the given quality
pub fn write_jpeg_with_quality(path: &Path, width: u32, height: u32, quality: u8) {
    let img = photo_like(width, height);
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality)
        .encode(img.as_raw(), width, height, ColorType::Rgb8)
        .unwrap();
    std::fs::write(path, output).unwrap();
}

/// Write an RGB PNG with fast, unfiltered compression
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = photo_like(width, height);
    let mut output = Vec::new();
    PngEncoder::new_with_quality(&mut output, CompressionType::Fast, FilterType::NoFilter)
        .write_image(img.as_raw(), width, height, ColorType::Rgb8)
        .unwrap();
    std::fs::write(path, output).unwrap();
}

/// Write a PNG carrying an alpha channel, with fast, unfiltered compression
pub fn write_rgba_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, ((x + y) % 256) as u8])
    });
    let mut output = Vec::new();
    PngEncoder::new_with_quality(&mut output, CompressionType::Fast, FilterType::NoFilter)
        .write_image(img.as_raw(), width, height, ColorType::Rgba8)
        .unwrap();
    std::fs::write(path, output).unwrap();
}
