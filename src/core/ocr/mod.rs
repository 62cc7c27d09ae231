//! # OCR Module
//!
//! Text recognition capability used by the OCR fallback matcher.
//!
//! Thumbnails that carry a brand only as pixels (a logo card with no
//! caption) are run through a recognizer after a logo-oriented
//! preprocessing pass.
//!
//! ## Backends
//! - **Tesseract**: command-line `tesseract`, single text line mode

mod tesseract;

pub use tesseract::{TesseractConfig, TesseractRecognizer};

use crate::error::OcrError;
use image::{imageops, DynamicImage, GrayImage, Luma};

/// Luma cut-off used when binarizing logos
pub const BINARIZE_THRESHOLD: u8 = 160;

/// A text-recognition capability
pub trait TextRecognizer: Send + Sync {
    /// Recover text from an image
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Prepare a logo or thumbnail for recognition.
///
/// Grayscale, stretch contrast to the full range, binarize at
/// [`BINARIZE_THRESHOLD`] and upscale 2x.
pub fn preprocess_for_logo(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    autocontrast(&mut gray);

    for pixel in gray.pixels_mut() {
        pixel[0] = if pixel[0] < BINARIZE_THRESHOLD { 0 } else { 255 };
    }

    let (width, height) = gray.dimensions();
    imageops::resize(
        &gray,
        width.saturating_mul(2).max(1),
        height.saturating_mul(2).max(1),
        imageops::FilterType::Nearest,
    )
}

/// Linearly map the darkest pixel to 0 and the brightest to 255
fn autocontrast(gray: &mut GrayImage) {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return;
    }

    let range = (max - min) as u32;
    for pixel in gray.pixels_mut() {
        let stretched = (pixel[0] - min) as u32 * 255 / range;
        *pixel = Luma([stretched as u8]);
    }
}
