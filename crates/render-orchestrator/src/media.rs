//! Media file serving for the preview player.
//!
//! A byte-range-capable static store keyed by an opaque per-user path.
//! Path authorization happens entirely on the string form: any path
//! that could escape the store root is rejected before a single
//! filesystem call is made.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::download::{read_file_range, DownloadResponse};
use crate::error::{RenderError, RenderResult};

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Serve a media file by its store-relative path, honoring an
    /// optional `Range` header. Unauthorized paths fail with
    /// [`RenderError::Forbidden`] without touching the filesystem.
    pub fn serve(&self, user_path: &str, range_header: Option<&str>) -> RenderResult<DownloadResponse> {
        let resolved = self.authorize(user_path)?;
        match read_file_range(&resolved, range_header) {
            Err(RenderError::RangeNotSatisfiable { size }) => {
                Ok(DownloadResponse::not_satisfiable(size))
            }
            Err(RenderError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DownloadResponse::not_found())
            }
            other => other,
        }
    }

    /// Validate a user-supplied path purely lexically: relative, no
    /// parent traversal, no root/prefix components.
    fn authorize(&self, user_path: &str) -> RenderResult<PathBuf> {
        let candidate = Path::new(user_path);
        let safe = !user_path.is_empty()
            && candidate.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            warn!(path = user_path, "rejected media path");
            return Err(RenderError::Forbidden {
                path: user_path.to_string(),
            });
        }
        Ok(self.root.join(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_file(name: &str) -> (MediaStore, PathBuf) {
        let root = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("clips")).unwrap();
        std::fs::write(root.join("clips").join("a.mp4"), vec![1u8; 400]).unwrap();
        (MediaStore::new(&root), root)
    }

    #[test]
    fn test_serves_relative_paths_with_ranges() {
        let (store, root) = store_with_file("montage_test_media_ok");

        let full = store.serve("clips/a.mp4", None).unwrap();
        assert_eq!(full.status, 200);
        assert_eq!(full.body.len(), 400);

        let partial = store.serve("clips/a.mp4", Some("bytes=100-199")).unwrap();
        assert_eq!(partial.status, 206);
        assert_eq!(partial.content_range.as_deref(), Some("bytes 100-199/400"));

        let out_of_range = store.serve("clips/a.mp4", Some("bytes=500-")).unwrap();
        assert_eq!(out_of_range.status, 416);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_missing_file_is_404() {
        let (store, root) = store_with_file("montage_test_media_missing");
        let response = store.serve("clips/nope.mp4", None).unwrap();
        assert_eq!(response.status, 404);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_traversal_rejected_before_fs_access() {
        let (store, root) = store_with_file("montage_test_media_traversal");

        for path in [
            "../etc/passwd",
            "clips/../../secret",
            "/etc/passwd",
            "",
            "./clips/a.mp4",
        ] {
            assert!(
                matches!(store.serve(path, None), Err(RenderError::Forbidden { .. })),
                "path {path:?} should be forbidden"
            );
        }

        std::fs::remove_dir_all(&root).ok();
    }
}
