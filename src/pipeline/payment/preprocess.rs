//! Screenshot preprocessing for OCR.
//!
//! Transfer screenshots arrive in every shape: dark-mode banking apps, low
//! resolution forwards, compression noise. Four cleanup modes cover the
//! spread, from no-op color through hard binarization; the orchestrator walks
//! them in order of expected yield until a pass reads well enough.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat};

use super::AmountError;

/// Width above which screenshots are downscaled before OCR.
const LARGE_WIDTH: u32 = 1600;
/// Target width for downscaled screenshots.
const DOWNSCALE_WIDTH: u32 = 1200;
/// Width below which screenshots are doubled before OCR.
const SMALL_WIDTH: u32 = 600;
/// Threshold for the aggressive mode's binarization.
const BINARY_THRESHOLD: u8 = 160;
/// Unsharp-mask parameters for the grayscale modes.
const UNSHARP_SIGMA: f32 = 1.2;
const UNSHARP_THRESHOLD: i32 = 3;
/// Percentile bounds for contrast stretching.
const STRETCH_LOW_PCT: f32 = 0.05;
const STRETCH_HIGH_PCT: f32 = 0.95;
/// Top and bottom of the band where banking apps put the amount, as
/// fractions of image height.
const BAND_TOP: f32 = 0.30;
const BAND_BOTTOM: f32 = 0.65;
/// Width the cropped band is rescaled to before single-line OCR.
const BAND_WIDTH: u32 = 1000;

/// One preprocessing recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessMode {
    /// Resize only, keep color. For screenshots where grayscale loses the
    /// amount (colored balance text on colored cards).
    Color,
    /// Grayscale plus contrast stretch.
    Light,
    /// Grayscale, contrast stretch, median denoise.
    Balanced,
    /// Balanced plus hard binarization. Last resort for noisy dark-mode
    /// captures; destroys anti-aliasing, so it goes late.
    Aggressive,
}

impl PreprocessMode {
    /// Attempt order, best expected yield first.
    pub const ATTEMPT_ORDER: [PreprocessMode; 4] = [
        PreprocessMode::Balanced,
        PreprocessMode::Light,
        PreprocessMode::Aggressive,
        PreprocessMode::Color,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PreprocessMode::Color => "color",
            PreprocessMode::Light => "light",
            PreprocessMode::Balanced => "balanced",
            PreprocessMode::Aggressive => "aggressive",
        }
    }
}

/// Run one preprocessing mode over an encoded screenshot. Returns PNG bytes.
pub fn preprocess(image_bytes: &[u8], mode: PreprocessMode) -> Result<Vec<u8>, AmountError> {
    let img = image::load_from_memory(image_bytes)?;
    let img = normalize_size(img);

    let out = match mode {
        PreprocessMode::Color => img,
        PreprocessMode::Light => {
            let gray = sharpen(&contrast_stretch(img.to_luma8()));
            DynamicImage::ImageLuma8(gray)
        }
        PreprocessMode::Balanced => {
            let gray = sharpen(&median_denoise(&contrast_stretch(img.to_luma8())));
            DynamicImage::ImageLuma8(gray)
        }
        PreprocessMode::Aggressive => {
            let gray = sharpen(&median_denoise(&contrast_stretch(img.to_luma8())));
            DynamicImage::ImageLuma8(binarize(gray))
        }
    };

    encode_png(&out)
}

/// Crop the horizontal band where banking apps render the transfer amount
/// and rescale it for line-at-a-time OCR. Returns PNG bytes.
pub fn crop_prominent_band(image_bytes: &[u8]) -> Result<Vec<u8>, AmountError> {
    let img = image::load_from_memory(image_bytes)?;
    let (w, h) = (img.width(), img.height());
    let top = (h as f32 * BAND_TOP) as u32;
    let bottom = ((h as f32 * BAND_BOTTOM) as u32).min(h);
    if bottom <= top || w == 0 {
        return Err(AmountError::ImageProcessing(
            "image too small for band crop".to_string(),
        ));
    }
    let band = img.crop_imm(0, top, w, bottom - top);
    let scale = BAND_WIDTH as f32 / w as f32;
    let band = band.resize_exact(
        BAND_WIDTH,
        ((bottom - top) as f32 * scale).max(1.0) as u32,
        image::imageops::FilterType::Lanczos3,
    );
    encode_png(&band)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, AmountError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)?;
    Ok(buf)
}

/// Bring extreme resolutions into the range Tesseract handles well: shrink
/// very wide screenshots, double very small ones.
fn normalize_size(img: DynamicImage) -> DynamicImage {
    let w = img.width();
    if w > LARGE_WIDTH {
        let h = (img.height() as u64 * DOWNSCALE_WIDTH as u64 / w as u64).max(1) as u32;
        img.resize_exact(DOWNSCALE_WIDTH, h, image::imageops::FilterType::Lanczos3)
    } else if w < SMALL_WIDTH && w > 0 {
        img.resize_exact(w * 2, img.height() * 2, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Linear contrast stretch between the 5th and 95th intensity percentiles.
fn contrast_stretch(gray: GrayImage) -> GrayImage {
    let mut histogram = [0u32; 256];
    for p in gray.pixels() {
        histogram[p.0[0] as usize] += 1;
    }
    let total: u32 = gray.width() * gray.height();
    if total == 0 {
        return gray;
    }

    let pct = |target: f32| -> u8 {
        let cutoff = (total as f32 * target) as u32;
        let mut seen = 0u32;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen >= cutoff {
                return value as u8;
            }
        }
        255
    };

    let low = pct(STRETCH_LOW_PCT);
    let high = pct(STRETCH_HIGH_PCT);
    if high <= low {
        return gray;
    }
    let range = (high - low) as f32;

    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, p) in gray.enumerate_pixels() {
        let v = p.0[0].saturating_sub(low) as f32 / range * 255.0;
        out.put_pixel(x, y, image::Luma([v.min(255.0) as u8]));
    }
    out
}

/// 3x3 median filter. Border pixels are copied through unchanged.
fn median_denoise(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = gray.clone();
    if w < 3 || h < 3 {
        return out;
    }
    let mut window = [0u8; 9];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut i = 0;
            for dy in 0..3 {
                for dx in 0..3 {
                    window[i] = gray.get_pixel(x + dx - 1, y + dy - 1).0[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, image::Luma([window[4]]));
        }
    }
    out
}

fn sharpen(gray: &GrayImage) -> GrayImage {
    image::imageops::unsharpen(gray, UNSHARP_SIGMA, UNSHARP_THRESHOLD)
}

fn binarize(mut gray: GrayImage) -> GrayImage {
    for p in gray.pixels_mut() {
        p.0[0] = if p.0[0] >= BINARY_THRESHOLD { 255 } else { 0 };
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| {
            // Diagonal gradient so the stretch and median have work to do.
            image::Rgb([((x + y) % 256) as u8, (x % 256) as u8, (y % 256) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn every_mode_produces_decodable_png() {
        let src = sample_png(800, 600);
        for mode in PreprocessMode::ATTEMPT_ORDER {
            let out = preprocess(&src, mode).unwrap();
            let decoded = image::load_from_memory(&out).unwrap();
            assert_eq!(decoded.width(), 800, "mode {}", mode.as_str());
        }
    }

    #[test]
    fn large_images_are_downscaled() {
        let src = sample_png(3200, 1600);
        let out = preprocess(&src, PreprocessMode::Color).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), DOWNSCALE_WIDTH);
        assert_eq!(decoded.height(), 600);
    }

    #[test]
    fn small_images_are_doubled() {
        let src = sample_png(300, 200);
        let out = preprocess(&src, PreprocessMode::Balanced).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 600);
        assert_eq!(decoded.height(), 400);
    }

    #[test]
    fn aggressive_output_is_binary() {
        let src = sample_png(640, 640);
        let out = preprocess(&src, PreprocessMode::Aggressive).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_luma8();
        assert!(decoded.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn band_crop_targets_middle_of_image() {
        let src = sample_png(500, 1000);
        let out = crop_prominent_band(&src).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), BAND_WIDTH);
        // 35% of the height, scaled by 1000/500.
        assert_eq!(decoded.height(), 700);
    }

    #[test]
    fn garbage_bytes_are_image_processing_errors() {
        let err = preprocess(b"not an image", PreprocessMode::Light).unwrap_err();
        assert!(matches!(err, AmountError::ImageProcessing(_)));
    }

    #[test]
    fn contrast_stretch_expands_narrow_range() {
        let gray = GrayImage::from_fn(64, 64, |x, _| image::Luma([120 + (x % 16) as u8]));
        let stretched = contrast_stretch(gray);
        let min = stretched.pixels().map(|p| p.0[0]).min().unwrap();
        let max = stretched.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(max - min > 100, "range {min}..{max} not expanded");
    }
}
