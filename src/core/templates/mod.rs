//! # Templates Module
//!
//! The logo template library: named perceptual hashes of known brand
//! images. Loaded once at startup and read-only afterwards.
//!
//! A library always holds at least one template; loading an empty
//! directory is a fatal initialization error.

mod filter;

pub use filter::TemplateFilter;

use crate::core::hasher::{HashAlgorithm, ImageHashValue, PerceptualHash};
use crate::error::{ExposureError, TemplateError};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A named logo hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoTemplate {
    name: String,
    hash: ImageHashValue,
}

impl LogoTemplate {
    pub fn new(name: impl Into<String>, hash: ImageHashValue) -> Self {
        Self {
            name: name.into(),
            hash,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &ImageHashValue {
        &self.hash
    }
}

/// Immutable, non-empty collection of logo templates
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<LogoTemplate>,
}

impl TemplateLibrary {
    /// Build a library from precomputed templates.
    ///
    /// `origin` only labels the error when `templates` is empty.
    pub fn from_templates(
        templates: Vec<LogoTemplate>,
        origin: &Path,
    ) -> Result<Self, TemplateError> {
        if templates.is_empty() {
            return Err(TemplateError::Empty {
                path: origin.to_path_buf(),
            });
        }
        Ok(Self { templates })
    }

    /// Hash every template image in a directory (non-recursive).
    ///
    /// Files are visited in file-name order so the library order (and with
    /// it tie-breaking between equidistant templates) is reproducible.
    /// Images that fail to decode are skipped with a warning.
    pub fn load_dir(dir: &Path, hasher: &dyn HashAlgorithm) -> Result<Self, ExposureError> {
        if !dir.is_dir() {
            return Err(TemplateError::DirectoryNotFound {
                path: dir.to_path_buf(),
            }
            .into());
        }

        let filter = TemplateFilter::new();
        let mut templates = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| TemplateError::ReadDirectory {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !filter.should_include(path) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            match hasher.hash_file(path) {
                Ok(hash) => {
                    debug!(template = %name, hash = %hash.to_hex(), "loaded logo template");
                    templates.push(LogoTemplate::new(name, hash));
                }
                Err(e) => warn!(template = %name, error = %e, "skipping unreadable logo template"),
            }
        }

        let library = Self::from_templates(templates, dir)?;
        info!(count = library.len(), dir = %dir.display(), "logo template library loaded");
        Ok(library)
    }

    pub fn templates(&self) -> &[LogoTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always false for a constructed library
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template with the minimum Hamming distance to `hash`.
    ///
    /// Ties go to the template encountered first.
    pub fn nearest(&self, hash: &ImageHashValue) -> (&LogoTemplate, u32) {
        let mut best = &self.templates[0];
        let mut best_distance = best.hash.distance(hash);

        for template in &self.templates[1..] {
            let distance = template.hash.distance(hash);
            if distance < best_distance {
                best = template;
                best_distance = distance;
            }
        }

        (best, best_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::PerceptualHasher;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn template(name: &str, bytes: &[u8]) -> LogoTemplate {
        LogoTemplate::new(name, ImageHashValue::new(bytes.to_vec()))
    }

    fn library(templates: Vec<LogoTemplate>) -> TemplateLibrary {
        TemplateLibrary::from_templates(templates, Path::new("/templates")).unwrap()
    }

    #[test]
    fn empty_library_is_rejected() {
        let err = TemplateLibrary::from_templates(Vec::new(), Path::new("/templates")).unwrap_err();
        assert!(matches!(err, TemplateError::Empty { path } if path == PathBuf::from("/templates")));
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let lib = library(vec![
            template("far.png", &[0x00]),
            template("near.png", &[0xF0]),
        ]);

        let (best, distance) = lib.nearest(&ImageHashValue::new(vec![0xF1]));

        assert_eq!(best.name(), "near.png");
        assert_eq!(distance, 1);
    }

    #[test]
    fn nearest_breaks_ties_by_library_order() {
        let lib = library(vec![
            template("first.png", &[0b0000_0001]),
            template("second.png", &[0b0000_0010]),
        ]);

        let (best, distance) = lib.nearest(&ImageHashValue::new(vec![0b0000_0000]));

        assert_eq!(best.name(), "first.png");
        assert_eq!(distance, 1);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let hasher = PerceptualHasher::default();
        let err = TemplateLibrary::load_dir(Path::new("/nonexistent/logos"), &hasher).unwrap_err();
        assert!(matches!(
            err,
            ExposureError::Template(TemplateError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn directory_without_images_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a logo").unwrap();

        let hasher = PerceptualHasher::default();
        let err = TemplateLibrary::load_dir(dir.path(), &hasher).unwrap_err();

        assert!(matches!(err, ExposureError::Template(TemplateError::Empty { .. })));
    }

    #[test]
    fn loads_images_in_name_order_and_skips_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(32, 32, |x, _| {
            Rgb([if x < 16 { 0 } else { 255 }; 3])
        }));
        img.save(dir.path().join("b_logo.png")).unwrap();
        img.save(dir.path().join("a_logo.png")).unwrap();
        std::fs::write(dir.path().join("c_broken.jpg"), b"garbage").unwrap();

        let hasher = PerceptualHasher::default();
        let lib = TemplateLibrary::load_dir(dir.path(), &hasher).unwrap();

        let names: Vec<_> = lib.templates().iter().map(LogoTemplate::name).collect();
        assert_eq!(names, vec!["a_logo.png", "b_logo.png"]);
    }
}
