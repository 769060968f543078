#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Synthetic photo: a bright block, a dark disc and a vertical shade.
/// `seed` moves the shapes so different seeds give unrelated pictures.
pub fn scene(width: u32, height: u32, seed: u32) -> DynamicImage {
    let shift = (seed % 5) as f32 * 0.12;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32 / width as f32, y as f32 / height as f32);
        let disc = (fx - 0.7 + shift).powi(2) + (fy - 0.6).powi(2) < 0.04;
        let v = if disc {
            20
        } else if (fx + shift) % 1.0 < 0.4 && fy < 0.5 {
            230
        } else {
            120 + (fy * 60.0) as u8
        };
        image::Rgb([v, v / 2 + 60, 255 - v])
    }))
}

/// Save `img` under `dir/name`, the format taken from the extension
pub fn save_image(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    let format = ImageFormat::from_path(&path).unwrap();
    img.save_with_format(&path, format).unwrap();
    path
}

/// Save `img` as a JPEG with an explicit quality
pub fn save_jpeg(dir: &Path, name: &str, img: &DynamicImage, quality: u8) -> PathBuf {
    let path = dir.join(name);
    let rgb = img.to_rgb8();
    let mut writer = BufWriter::new(File::create(&path).unwrap());
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .unwrap();
    path
}

/// A file with an image extension that does not decode
pub fn create_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(b"DUMMY IMAGE DATA").unwrap();
    path
}

/// Edited copies of one base picture, the kind a photo library accumulates
pub struct ImageVariant {
    base: DynamicImage,
}

impl ImageVariant {
    pub fn new(base: DynamicImage) -> Self {
        Self { base }
    }

    pub fn identical(&self) -> DynamicImage {
        self.base.clone()
    }

    /// Scaled by `factor`, aspect ratio kept
    pub fn resized(&self, factor: f32) -> DynamicImage {
        let width = (self.base.width() as f32 * factor).round() as u32;
        let height = (self.base.height() as f32 * factor).round() as u32;
        self.base.resize_exact(width, height, FilterType::Triangle)
    }

    pub fn brightened(&self, value: i32) -> DynamicImage {
        self.base.brighten(value)
    }

    /// Write the base and its variants into `dir`, returning the base path first
    pub fn write_all(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
        vec![
            save_image(dir, &format!("{}.png", stem), &self.identical()),
            save_image(dir, &format!("{}_small.png", stem), &self.resized(0.5)),
            save_image(dir, &format!("{}_large.png", stem), &self.resized(1.5)),
            save_image(dir, &format!("{}_bright.png", stem), &self.brightened(10)),
            save_jpeg(dir, &format!("{}_recompressed.jpg", stem), &self.base, 90),
        ]
    }
}
