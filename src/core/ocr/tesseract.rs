//! Tesseract OCR backend implementation.
//!
//! Runs the `tesseract` binary on a preprocessed temporary PNG and reads
//! the recognized text from stdout.

use super::{preprocess_for_logo, TextRecognizer};
use crate::error::OcrError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Tesseract invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    /// Path or name of the tesseract binary
    pub binary: String,
    /// Recognition language (`-l`)
    pub language: String,
    /// OCR engine mode (`--oem`); 1 = LSTM only
    pub engine_mode: u8,
    /// Page segmentation mode (`--psm`); 7 = single text line
    pub page_segmentation_mode: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            engine_mode: 1,
            page_segmentation_mode: 7,
        }
    }
}

/// Tesseract OCR backend.
pub struct TesseractRecognizer {
    config: TesseractConfig,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::with_config(TesseractConfig::default())
    }

    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.config.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .args(["--oem", &self.config.engine_mode.to_string()])
            .args(["--psm", &self.config.page_segmentation_mode.to_string()])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.binary
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let processed = preprocess_for_logo(image);

        let file = tempfile::Builder::new()
            .prefix("exposure-ocr-")
            .suffix(".png")
            .tempfile()?;
        processed
            .save_with_format(file.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::OcrFailed(format!("failed to write OCR input: {}", e)))?;

        self.run_tesseract(file.path())
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn default_config_reads_a_single_english_line() {
        let config = TesseractConfig::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.engine_mode, 1);
        assert_eq!(config.page_segmentation_mode, 7);
    }

    #[test]
    fn missing_binary_is_reported_as_unavailable() {
        let recognizer = TesseractRecognizer::with_config(TesseractConfig {
            binary: "definitely-not-a-real-tesseract-binary".to_string(),
            ..TesseractConfig::default()
        });
        let image = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(8, 8, Luma([255])));

        let err = recognizer.recognize(&image).unwrap_err();

        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }
}
