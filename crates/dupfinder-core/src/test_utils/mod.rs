use image::{DynamicImage, ImageFormat, RgbImage};
use std::fs::File;
use std::io::Write;
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

/// A file with an image extension that does not decode
pub fn create_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(b"DUMMY IMAGE DATA").unwrap();
    path
}
