//! Image file scanner
//!
//! Recursive discovery of product photos under a scan root. Only files with
//! an image extension (png/jpg/jpeg, case-insensitive) are yielded; a bad
//! root fails loudly, while unreadable entries inside the tree are logged
//! and skipped so one inaccessible subfolder cannot abort a whole
//! reconciliation scan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::models::ImageFile;

/// Image scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Recursive image file scanner
pub struct ImageScanner {
    ignore_patterns: Vec<String>,
    max_depth: Option<usize>,
}

impl ImageScanner {
    /// Create new scanner with default ignore patterns
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git, etc.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                "node_modules".to_string(),
            ],
            max_depth: None,
        }
    }

    /// Scan directory tree for image files
    ///
    /// Traversal is sequential because the symlink visited-set is mutable.
    /// Entries that cannot be read (permission denied, vanished files) are
    /// logged and skipped; the walk continues.
    pub fn scan(&self, root_path: &Path) -> Result<Vec<ImageFile>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut images = Vec::new();
        let mut symlink_visited = HashSet::new();

        // Sorted traversal keeps discovery order stable across scans, so
        // repeated runs over the same tree report identical results.
        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !has_image_extension(path) {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().to_string();
            let relative_path = path
                .strip_prefix(root_path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf());

            images.push(ImageFile {
                filename,
                full_path: path.to_path_buf(),
                relative_path,
            });
        }

        tracing::debug!(
            root = %root_path.display(),
            count = images.len(),
            "Image scan complete"
        );

        Ok(images)
    }

    /// Check if entry should be processed
    fn should_process_entry(
        &self,
        entry: &DirEntry,
        symlink_visited: &mut HashSet<PathBuf>,
    ) -> bool {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        // Skip ignored patterns
        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern) {
                return false;
            }
        }

        // Detect symlink loops
        if entry.file_type().is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", path.display());
                    return false;
                }
            }
        }

        true
    }
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if the path carries an image extension (png/jpg/jpeg)
pub fn has_image_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => is_image_extension(&ext.to_string_lossy().to_lowercase()),
        None => false,
    }
}

/// Check if a lowercase extension is in the image allow-list
pub fn is_image_extension(ext: &str) -> bool {
    matches!(ext, "png" | "jpg" | "jpeg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_image_extension_detection() {
        assert!(is_image_extension("png"));
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("jpeg"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("gif"));
        assert!(!is_image_extension("pdf"));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = ImageScanner::new();
        let result = scanner.scan(Path::new("/nonexistent/path"));
        match result.unwrap_err() {
            ScanError::PathNotFound(_) => {}
            other => panic!("Expected PathNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("plain.txt");
        fs::write(&file_path, b"not a directory").unwrap();

        let scanner = ImageScanner::new();
        match scanner.scan(&file_path).unwrap_err() {
            ScanError::NotADirectory(_) => {}
            other => panic!("Expected NotADirectory error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();

        let scanner = ImageScanner::new();
        let result = scanner.scan(temp_dir.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_filters_extensions() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.PNG")).unwrap();
        File::create(temp_dir.path().join("c.jpeg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join("clip.gif")).unwrap();

        let scanner = ImageScanner::new();
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|img| {
            let ext = img
                .full_path
                .extension()
                .unwrap()
                .to_string_lossy()
                .to_lowercase();
            is_image_extension(&ext)
        }));
    }

    #[test]
    fn test_scan_recurses_and_records_relative_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("warehouse").join("aisle-3");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("ABC123.jpg")).unwrap();

        let scanner = ImageScanner::new();
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].filename, "ABC123.jpg");
        assert_eq!(
            result[0].relative_path,
            Path::new("warehouse/aisle-3/ABC123.jpg")
        );
        assert!(result[0].full_path.is_absolute() || result[0].full_path.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_scan_skips_ignored_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("real.jpg")).unwrap();
        let litter = temp_dir.path().join(".git");
        fs::create_dir_all(&litter).unwrap();
        File::create(litter.join("objects.png")).unwrap();

        let scanner = ImageScanner::new();
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].filename, "real.jpg");
    }
}
