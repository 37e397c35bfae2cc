//! Quality Analyzer (spec.md §4.1).
//!
//! Pure function of the input bytes: decode once, compute every component
//! score off the same luma buffer, never touch the filesystem.

use image::{GenericImageView, ImageBuffer, Luma};

use crate::error::{ExpedienteError, Result};
use crate::types::ImageQualityAssessment;

/// Decodes `image_bytes` and computes every component of an
/// [`ImageQualityAssessment`]. Deterministic: same bytes always produce the
/// same scores.
pub fn analyze(image_bytes: &[u8]) -> Result<ImageQualityAssessment> {
    if image_bytes.is_empty() {
        return Err(ExpedienteError::InvalidImage("empty image bytes".into()));
    }
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| ExpedienteError::InvalidImage(e.to_string()))?;
    let gray = decoded.to_luma8();
    if gray.width() < 3 || gray.height() < 3 {
        return Err(ExpedienteError::InvalidImage(
            "image too small to assess (minimum 3x3)".into(),
        ));
    }

    let (mean, contrast_level) = mean_and_std_dev(&gray);
    let blur_score = variance_of_laplacian(&gray, mean);
    let noise_level = estimate_noise_level(&gray);
    let sharpness_level = estimate_sharpness(&gray);
    let edge_density = estimate_edge_density(&gray);

    let quality_index = aggregate_index(blur_score, contrast_level, noise_level, edge_density);

    Ok(ImageQualityAssessment::new(
        blur_score,
        noise_level,
        contrast_level,
        sharpness_level,
        edge_density,
        quality_index,
    ))
}

fn mean_and_std_dev(img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> (f64, f64) {
    let pixels: Vec<f64> = img.pixels().map(|p| p[0] as f64).collect();
    let n = pixels.len() as f64;
    let mean = pixels.iter().sum::<f64>() / n;
    let variance = pixels.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    (mean, (variance.sqrt() / 255.0).clamp(0.0, 1.0))
}

/// Variance of the discrete Laplacian (second-derivative) response,
/// normalized so a higher score means a sharper image.
fn variance_of_laplacian(img: &ImageBuffer<Luma<u8>, Vec<u8>>, _mean: f64) -> f64 {
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }
    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = img.get_pixel(x, y)[0] as f64;
            let up = img.get_pixel(x, y - 1)[0] as f64;
            let down = img.get_pixel(x, y + 1)[0] as f64;
            let left = img.get_pixel(x - 1, y)[0] as f64;
            let right = img.get_pixel(x + 1, y)[0] as f64;
            responses.push(up + down + left + right - 4.0 * center);
        }
    }
    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    let variance = responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance / (255.0 * 255.0)
}

/// Mean absolute deviation of each sampled pixel from its 3x3-neighborhood
/// average, sampled on a grid to keep this linear-ish in image size.
fn estimate_noise_level(img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> f64 {
    let (width, height) = img.dimensions();
    if width < 11 || height < 11 {
        return 0.0;
    }
    let mut residuals = Vec::new();
    let mut y = 5;
    while y < height - 5 {
        let mut x = 5;
        while x < width - 5 {
            let center = img.get_pixel(x, y)[0] as f64;
            let mut neighbor_sum = 0.0;
            let mut neighbor_count = 0.0;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let px = (x as i32 + dx) as u32;
                    let py = (y as i32 + dy) as u32;
                    neighbor_sum += img.get_pixel(px, py)[0] as f64;
                    neighbor_count += 1.0;
                }
            }
            let neighbor_avg = neighbor_sum / neighbor_count;
            residuals.push((center - neighbor_avg).abs());
            x += 10;
        }
        y += 10;
    }
    if residuals.is_empty() {
        return 0.0;
    }
    let mad = residuals.iter().sum::<f64>() / residuals.len() as f64;
    (mad / 255.0).clamp(0.0, 1.0)
}

/// Mean gradient magnitude over interior pixels via central differences.
fn estimate_sharpness(img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> f64 {
    let (width, height) = img.dimensions();
    let mut gradient_sum = 0.0;
    let mut count = 0.0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let left = img.get_pixel(x - 1, y)[0] as f64;
            let right = img.get_pixel(x + 1, y)[0] as f64;
            let top = img.get_pixel(x, y - 1)[0] as f64;
            let bottom = img.get_pixel(x, y + 1)[0] as f64;
            let grad_x = (right - left) / 2.0;
            let grad_y = (bottom - top) / 2.0;
            gradient_sum += (grad_x * grad_x + grad_y * grad_y).sqrt();
            count += 1.0;
        }
    }
    if count == 0.0 {
        0.0
    } else {
        (gradient_sum / count / 255.0).clamp(0.0, 1.0)
    }
}

/// Fraction of interior pixels whose gradient magnitude exceeds a fixed
/// edge threshold — a cheap ratio of edge-detector responses (spec.md §4.1).
const EDGE_THRESHOLD: f64 = 30.0;

fn estimate_edge_density(img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> f64 {
    let (width, height) = img.dimensions();
    let mut edge_pixels = 0.0;
    let mut count = 0.0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let left = img.get_pixel(x - 1, y)[0] as f64;
            let right = img.get_pixel(x + 1, y)[0] as f64;
            let top = img.get_pixel(x, y - 1)[0] as f64;
            let bottom = img.get_pixel(x, y + 1)[0] as f64;
            let grad_x = (right - left) / 2.0;
            let grad_y = (bottom - top) / 2.0;
            let magnitude = (grad_x * grad_x + grad_y * grad_y).sqrt();
            if magnitude > EDGE_THRESHOLD {
                edge_pixels += 1.0;
            }
            count += 1.0;
        }
    }
    if count == 0.0 {
        0.0
    } else {
        edge_pixels / count
    }
}

/// Weighted geometric mean of the four component scores, normalized to
/// [0,1]. Blur and contrast dominate since they correlate most directly
/// with OCR-ability; noise is inverted (lower noise is better).
fn aggregate_index(blur_score: f64, contrast_level: f64, noise_level: f64, edge_density: f64) -> f64 {
    let blur_component = (blur_score / 500.0).clamp(0.0, 1.0).max(1e-6);
    let contrast_component = contrast_level.clamp(0.0, 1.0).max(1e-6);
    let noise_component = (1.0 - noise_level).clamp(0.0, 1.0).max(1e-6);
    let edge_component = edge_density.clamp(0.0, 1.0).max(1e-6);

    let weights = [0.35, 0.25, 0.25, 0.15];
    let components = [
        blur_component,
        contrast_component,
        noise_component,
        edge_component,
    ];
    let log_sum: f64 = weights
        .iter()
        .zip(components.iter())
        .map(|(w, c)| w * c.ln())
        .sum();
    log_sum.exp().clamp(0.0, 1.0)
}
