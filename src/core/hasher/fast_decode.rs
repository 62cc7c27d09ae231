//! Image decoding for templates and thumbnails.
//!
//! JPEG goes through zune-jpeg, everything else through the image crate.
//! Remote thumbnails carry no reliable extension, so the container is
//! sniffed from its magic bytes.

use crate::error::HashError;
use image::{DynamicImage, ImageBuffer};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Container formats recognized by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Jpeg,
    Png,
    WebP,
    Gif,
    Unknown,
}

impl Encoding {
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Self::Jpeg,
            [0x89, b'P', b'N', b'G', ..] => Self::Png,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Self::WebP,
            [b'G', b'I', b'F', b'8', ..] => Self::Gif,
            _ => Self::Unknown,
        }
    }
}

pub struct FastDecoder;

impl FastDecoder {
    /// Decode an in-memory image. `source_id` labels errors.
    ///
    /// A JPEG that zune-jpeg rejects is retried with the image crate.
    pub fn decode_bytes(bytes: &[u8], source_id: &str) -> Result<DynamicImage, HashError> {
        if Encoding::sniff(bytes) == Encoding::Jpeg {
            if let Some(image) = Self::decode_jpeg(bytes) {
                return Ok(image);
            }
        }
        Self::decode_generic(bytes, source_id)
    }

    pub fn decode_file(path: &Path) -> Result<DynamicImage, HashError> {
        let bytes = fs::read(path).map_err(|source| HashError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_bytes(&bytes, &path.display().to_string())
    }

    /// `None` when zune-jpeg fails or yields a colorspace we do not map
    fn decode_jpeg(bytes: &[u8]) -> Option<DynamicImage> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().ok()?;
        let info = decoder.info()?;
        let (width, height) = (info.width as u32, info.height as u32);

        match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
            }
            ColorSpace::RGBA => {
                ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
            }
            ColorSpace::Luma => {
                ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
            }
            _ => None,
        }
    }

    fn decode_generic(bytes: &[u8], source_id: &str) -> Result<DynamicImage, HashError> {
        image::load_from_memory(bytes).map_err(|e| HashError::DecodeError {
            source_id: source_id.to_string(),
            reason: e.to_string(),
        })
    }
}
