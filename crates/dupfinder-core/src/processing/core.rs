//! Core hash calculation algorithms

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma};
use rustdct::{Dct2, DctPlanner};

use super::types::{Fingerprint, HashAlgorithm, MAX_HASH_SIZE};
use crate::error::{Error, Result};

type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Dispatch to the hash function of `algorithm`
pub fn calculate_fingerprint(
    img: &DynamicImage,
    algorithm: HashAlgorithm,
    hash_size: u32,
) -> Result<Fingerprint> {
    match algorithm {
        HashAlgorithm::Phash => calculate_phash(img, hash_size),
        HashAlgorithm::Dhash => calculate_dhash(img, hash_size),
        HashAlgorithm::Whash => calculate_whash(img, hash_size),
    }
}

/// Every algorithm needs 1 <= hash_size <= MAX_HASH_SIZE
fn check_hash_size(algorithm: HashAlgorithm, hash_size: u32) -> Result<()> {
    if hash_size == 0 || hash_size > MAX_HASH_SIZE {
        return Err(Error::InvalidHashSize {
            algorithm,
            hash_size,
            reason: format!("hash size must be between 1 and {}", MAX_HASH_SIZE),
        });
    }
    Ok(())
}

/// DCT perceptual hash.
///
/// The grayscale image is shrunk to (4 * hash_size)^2, transformed with a 2-D DCT-II
/// and the top-left hash_size^2 low frequencies are compared against their median.
pub fn calculate_phash(img: &DynamicImage, hash_size: u32) -> Result<Fingerprint> {
    check_hash_size(HashAlgorithm::Phash, hash_size)?;

    let side = hash_size * 4;
    let n = side as usize;
    let small = imageops::resize(&to_luma(img), side, side, FilterType::Lanczos3);

    // Rows are contiguous in the pixel buffer
    let mut coefficients: Vec<f32> = small.into_raw();

    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(n);

    for row in coefficients.chunks_exact_mut(n) {
        dct.process_dct2(row);
    }

    // Columns: transpose, transform rows, transpose back
    let mut transposed = transpose(&coefficients, n);
    for row in transposed.chunks_exact_mut(n) {
        dct.process_dct2(row);
    }
    coefficients = transpose(&transposed, n);

    let hs = hash_size as usize;
    let low_freq: Vec<f32> = (0..hs)
        .flat_map(|y| coefficients[y * n..y * n + hs].iter().copied())
        .collect();

    let med = median(&low_freq);
    Ok(Fingerprint::from_bits(
        hash_size,
        low_freq.iter().map(|&c| c > med),
    ))
}

/// Difference hash: each bit records whether a pixel is darker than its right neighbour
pub fn calculate_dhash(img: &DynamicImage, hash_size: u32) -> Result<Fingerprint> {
    check_hash_size(HashAlgorithm::Dhash, hash_size)?;

    let small = imageops::resize(&to_luma(img), hash_size + 1, hash_size, FilterType::Lanczos3);

    let bits = (0..hash_size).flat_map(|y| {
        let small = &small;
        (0..hash_size).map(move |x| small.get_pixel(x + 1, y)[0] > small.get_pixel(x, y)[0])
    });

    Ok(Fingerprint::from_bits(hash_size, bits))
}

/// Haar wavelet hash.
///
/// `hash_size` must be a power of two. The image is resized to the largest power of
/// two that fits inside its shorter side, or to `hash_size` when that is larger, so
/// thumbnails are upscaled rather than rejected.
pub fn calculate_whash(img: &DynamicImage, hash_size: u32) -> Result<Fingerprint> {
    check_hash_size(HashAlgorithm::Whash, hash_size)?;
    if !hash_size.is_power_of_two() {
        return Err(Error::InvalidHashSize {
            algorithm: HashAlgorithm::Whash,
            hash_size,
            reason: "hash size must be a power of two".to_string(),
        });
    }

    let (width, height) = img.dimensions();
    let shorter = width.min(height);
    if shorter == 0 {
        return Err(Error::InvalidHashSize {
            algorithm: HashAlgorithm::Whash,
            hash_size,
            reason: "image has no pixels".to_string(),
        });
    }

    // Largest power of two <= shorter side, never below the hash size
    let natural_scale = 1u32 << (31 - shorter.leading_zeros());
    let image_scale = natural_scale.max(hash_size);

    let small = imageops::resize(&to_luma(img), image_scale, image_scale, FilterType::Lanczos3);
    let mut pixels: Vec<f32> = small.into_raw();

    // Zeroing the deepest Haar approximation coefficient leaves the image minus its mean
    let mean = pixels.iter().sum::<f32>() / pixels.len() as f32;
    for p in pixels.iter_mut() {
        *p -= mean;
    }

    let levels = image_scale.trailing_zeros() - hash_size.trailing_zeros();
    let mut side = image_scale as usize;
    for _ in 0..levels {
        pixels = haar_approximation(&pixels, side);
        side /= 2;
    }

    let med = median(&pixels);
    Ok(Fingerprint::from_bits(
        hash_size,
        pixels.iter().map(|&c| c > med),
    ))
}

/// Grayscale conversion: 0.299*R + 0.587*G + 0.114*B, scaled to [0, 1].
///
/// Float resampling in `imageops` clamps to [0, 1], so values must stay in that range.
fn to_luma(img: &DynamicImage) -> GrayF32 {
    let rgb = img.to_rgb8();
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let gray = 0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32;
        Luma([gray / 255.0])
    })
}

/// One level of the orthonormal 2-D Haar transform, keeping only the LL band
fn haar_approximation(pixels: &[f32], side: usize) -> Vec<f32> {
    let half = side / 2;
    let mut out = Vec::with_capacity(half * half);

    for y in 0..half {
        for x in 0..half {
            let top = (2 * y) * side + 2 * x;
            let bottom = top + side;
            out.push((pixels[top] + pixels[top + 1] + pixels[bottom] + pixels[bottom + 1]) / 2.0);
        }
    }

    out
}

fn transpose(values: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0; values.len()];
    for y in 0..n {
        for x in 0..n {
            out[x * n + y] = values[y * n + x];
        }
    }
    out
}

/// Median; the mean of the two central values for even lengths
pub(crate) fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 255) / width.max(1)) as u8;
            image::Rgb([v, ((y * 255) / height.max(1)) as u8, 128])
        }))
    }

    /// Large flat shapes: a bright block, a dark disc and a mid-grey background
    fn scene(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let (fx, fy) = (x as f32 / width as f32, y as f32 / height as f32);
            let disc = (fx - 0.65).powi(2) + (fy - 0.6).powi(2) < 0.04;
            let v = if disc {
                20
            } else if fx < 0.4 && fy < 0.5 {
                230
            } else {
                120 + (fy * 60.0) as u8
            };
            image::Rgb([v, v, v])
        }))
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_haar_approximation_averages_blocks() {
        let pixels = [1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 3.0, 3.0, 4.0, 4.0];
        let ll = haar_approximation(&pixels, 4);
        assert_eq!(ll, vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_every_algorithm_honours_hash_size() {
        let img = gradient(128, 96);
        for algorithm in HashAlgorithm::ALL {
            for hash_size in [4, 8, 16] {
                let fp = calculate_fingerprint(&img, algorithm, hash_size).unwrap();
                assert_eq!(fp.hash_size(), hash_size, "{}", algorithm);
                assert_eq!(fp.bit_len(), (hash_size * hash_size) as usize);
            }
        }
    }

    #[test]
    fn test_out_of_range_hash_size_is_rejected() {
        let img = gradient(32, 32);
        for algorithm in HashAlgorithm::ALL {
            for hash_size in [0, MAX_HASH_SIZE * 2, u32::MAX] {
                let err = calculate_fingerprint(&img, algorithm, hash_size).unwrap_err();
                assert!(
                    matches!(err, Error::InvalidHashSize { hash_size: h, .. } if h == hash_size),
                    "{} {}",
                    algorithm,
                    hash_size
                );
            }
        }
    }

    #[test]
    fn test_largest_hash_size_is_accepted() {
        let fp = calculate_fingerprint(&gradient(40, 30), HashAlgorithm::Dhash, MAX_HASH_SIZE)
            .unwrap();
        assert_eq!(fp.bit_len(), (MAX_HASH_SIZE * MAX_HASH_SIZE) as usize);
    }

    #[test]
    fn test_whash_rejects_non_power_of_two() {
        let img = gradient(64, 64);
        assert!(matches!(
            calculate_whash(&img, 6),
            Err(Error::InvalidHashSize { .. })
        ));
    }

    #[test]
    fn test_whash_upscales_tiny_image() {
        // Natural scale is 4, below an 8x8 hash
        let thumb = gradient(6, 40);
        let fp = calculate_whash(&thumb, 8).unwrap();
        assert_eq!(fp.hash_size(), 8);

        let strip = gradient(100, 6);
        assert_eq!(calculate_whash(&strip, 8).unwrap().bit_len(), 64);
        assert_eq!(calculate_whash(&strip, 4).unwrap().bit_len(), 16);
    }

    #[test]
    fn test_dhash_of_mirrored_image_is_inverted() {
        let img = gradient(90, 80);
        let mirrored = img.fliph();
        let a = calculate_dhash(&img, 8).unwrap();
        let b = calculate_dhash(&mirrored, 8).unwrap();
        assert!(a.distance(&b) >= 56, "distance {}", a.distance(&b));
    }

    #[test]
    fn test_resized_copy_stays_close() {
        let large = scene(256, 192);
        let small = DynamicImage::ImageRgba8(imageops::resize(
            &large,
            128,
            96,
            FilterType::Triangle,
        ));

        for algorithm in HashAlgorithm::ALL {
            let a = calculate_fingerprint(&large, algorithm, 8).unwrap();
            let b = calculate_fingerprint(&small, algorithm, 8).unwrap();
            assert!(
                a.distance(&b) <= algorithm.default_threshold(),
                "{} distance {}",
                algorithm,
                a.distance(&b)
            );
        }
    }
}
