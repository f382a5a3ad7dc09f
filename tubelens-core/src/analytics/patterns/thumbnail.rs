//! Pixel statistics for thumbnail images.
//!
//! All values are computed on the RGB image. Channel statistics are
//! averaged across R, G and B; standard deviations are population std.

use crate::analytics::stats::round2;
use crate::error::{Error, Result};
use image::{Rgb, RgbImage};
use serde::Serialize;

/// Skin-tone pixel fraction must lie strictly inside this range to count as a face.
const FACE_SKIN_RATIO: (f64, f64) = (0.05, 0.6);

/// Edge intensity above this reads as text or sharp overlays.
const TEXT_EDGE_THRESHOLD: f64 = 20.0;

/// Features extracted from one thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailFeatures {
    /// Mean channel intensity, 0-255
    pub brightness: f64,
    /// Mean of per-channel std
    pub contrast: f64,
    /// Sum of pairwise absolute differences between channel means
    pub colorfulness: f64,
    /// Mean intensity after a 3×3 edge-detection filter
    pub edge_intensity: f64,
    pub has_face_like_features: bool,
    pub has_text_like_features: bool,
    /// Summed channel variance / 1000, capped at 100
    pub composition_score: f64,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

/// Decode image bytes and extract features.
pub fn analyze_thumbnail(bytes: &[u8]) -> Result<ThumbnailFeatures> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::InvalidImage(format!("Failed to analyze image: {}", e)))?
        .to_rgb8();
    analyze_rgb(&image)
}

/// Extract features from an already decoded image.
pub fn analyze_rgb(image: &RgbImage) -> Result<ThumbnailFeatures> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidImage("Image has no pixels".to_string()));
    }

    let (means, variances) = channel_stats(image.pixels().map(|p| p.0));
    let stds = variances.map(f64::sqrt);

    let brightness = means.iter().sum::<f64>() / 3.0;
    let contrast = stds.iter().sum::<f64>() / 3.0;
    let colorfulness = (means[0] - means[1]).abs()
        + (means[1] - means[2]).abs()
        + (means[2] - means[0]).abs();

    let (edge_means, _) = channel_stats(find_edges(image).pixels().map(|p| p.0));
    let edge_intensity = edge_means.iter().sum::<f64>() / 3.0;

    let total = (width as u64 * height as u64) as f64;
    let skin = image.pixels().filter(|p| is_skin_tone(p.0)).count() as f64;
    let skin_ratio = skin / total;

    Ok(ThumbnailFeatures {
        brightness: round2(brightness),
        contrast: round2(contrast),
        colorfulness: round2(colorfulness),
        edge_intensity: round2(edge_intensity),
        has_face_like_features: skin_ratio > FACE_SKIN_RATIO.0 && skin_ratio < FACE_SKIN_RATIO.1,
        has_text_like_features: edge_intensity > TEXT_EDGE_THRESHOLD,
        composition_score: round2((variances.iter().sum::<f64>() / 1000.0).min(100.0)),
        width,
        height,
        aspect_ratio: round2(width as f64 / height as f64),
    })
}

/// Per-channel mean and population variance.
fn channel_stats(pixels: impl Iterator<Item = [u8; 3]>) -> ([f64; 3], [f64; 3]) {
    let mut n = 0.0;
    let mut sum = [0.0f64; 3];
    let mut sum_sq = [0.0f64; 3];
    for px in pixels {
        n += 1.0;
        for c in 0..3 {
            let v = px[c] as f64;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }
    if n == 0.0 {
        return ([0.0; 3], [0.0; 3]);
    }
    let means = sum.map(|s| s / n);
    let mut vars = [0.0f64; 3];
    for c in 0..3 {
        vars[c] = (sum_sq[c] / n - means[c] * means[c]).max(0.0);
    }
    (means, vars)
}

/// 3×3 Laplacian-style edge filter (centre 8, neighbours −1), clamped to
/// 0-255. Border pixels keep their source value.
fn find_edges(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0i32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let px = image.get_pixel(x + dx - 1, y + dy - 1).0;
                    let weight = if dx == 1 && dy == 1 { 8 } else { -1 };
                    for c in 0..3 {
                        acc[c] += weight * px[c] as i32;
                    }
                }
            }
            out.put_pixel(x, y, Rgb(acc.map(|v| v.clamp(0, 255) as u8)));
        }
    }
    out
}

fn is_skin_tone([r, g, b]: [u8; 3]) -> bool {
    let (r, g, b) = (r as i16, g as i16, b as i16);
    r > 60 && g > 40 && b > 20 && r > g && r > b && (r - g).abs() > 15 && (r - b).abs() > 15
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::png_bytes;

    #[test]
    fn test_flat_grey_image() {
        let image = RgbImage::from_pixel(160, 90, Rgb([128, 128, 128]));
        let features = analyze_thumbnail(&png_bytes(&image)).unwrap();
        assert_eq!(features.brightness, 128.0);
        assert_eq!(features.contrast, 0.0);
        assert_eq!(features.colorfulness, 0.0);
        assert!(!features.has_face_like_features);
        assert!(!features.has_text_like_features);
        assert_eq!(features.aspect_ratio, 1.78);
        // Interior is flat so only the copied border contributes
        assert!(features.edge_intensity < 20.0);
    }

    #[test]
    fn test_skin_tone_fraction() {
        let mut image = RgbImage::from_pixel(10, 10, Rgb([20, 20, 200]));
        for x in 0..10 {
            for y in 0..2 {
                image.put_pixel(x, y, Rgb([220, 170, 140]));
            }
        }
        let features = analyze_rgb(&image).unwrap();
        assert!(features.has_face_like_features);

        let all_skin = RgbImage::from_pixel(10, 10, Rgb([220, 170, 140]));
        assert!(!analyze_rgb(&all_skin).unwrap().has_face_like_features);
    }

    #[test]
    fn test_checkerboard_has_edges() {
        let image = RgbImage::from_fn(32, 18, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let features = analyze_rgb(&image).unwrap();
        assert!(features.edge_intensity > TEXT_EDGE_THRESHOLD);
        assert!(features.has_text_like_features);
        assert!(features.contrast > 100.0);
    }

    #[test]
    fn test_invalid_bytes() {
        let err = analyze_thumbnail(b"not an image").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_colorfulness() {
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 100, 0]));
        let features = analyze_rgb(&image).unwrap();
        assert_eq!(features.colorfulness, 400.0);
    }
}
