//! File filtering for the template directory.

use std::collections::HashSet;
use std::path::Path;

/// Decides which files in the template directory are logo images
pub struct TemplateFilter {
    /// File extensions to include
    extensions: HashSet<String>,
}

impl TemplateFilter {
    /// Create a filter accepting PNG and JPEG templates
    pub fn new() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Check if a file should be loaded as a template
    pub fn should_include(&self, path: &Path) -> bool {
        // Editor backups and OS metadata files
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for TemplateFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_png_and_jpeg() {
        let filter = TemplateFilter::new();
        assert!(filter.should_include(Path::new("/logos/yk.png")));
        assert!(filter.should_include(Path::new("/logos/yk.JPEG")));
        assert!(filter.should_include(Path::new("/logos/yk.jpg")));
    }

    #[test]
    fn filter_excludes_other_files() {
        let filter = TemplateFilter::new();
        assert!(!filter.should_include(Path::new("/logos/yk.gif")));
        assert!(!filter.should_include(Path::new("/logos/notes.txt")));
        assert!(!filter.should_include(Path::new("/logos/no_extension")));
    }

    #[test]
    fn filter_excludes_hidden_files() {
        let filter = TemplateFilter::new();
        assert!(!filter.should_include(Path::new("/logos/._yk.png")));
    }
}
