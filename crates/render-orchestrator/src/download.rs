//! Byte-range download support for finished artifacts.
//!
//! Implements the subset of HTTP range semantics the download contract
//! needs: `200` with full content, `206` with a `Content-Range` for a
//! valid range, `416` for a range outside `[0, size)`. A syntactically
//! malformed `Range` header is ignored and the full content served, per
//! RFC 9110.

use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// An HTTP-shaped download answer, transport-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_range: Option<String>,
}

impl DownloadResponse {
    pub fn full(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            content_range: None,
        }
    }

    pub fn partial(body: Vec<u8>, start: u64, end_inclusive: u64, size: u64) -> Self {
        Self {
            status: 206,
            body,
            content_range: Some(format!("bytes {start}-{end_inclusive}/{size}")),
        }
    }

    pub fn not_satisfiable(size: u64) -> Self {
        Self {
            status: 416,
            body: Vec::new(),
            content_range: Some(format!("bytes */{size}")),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Vec::new(),
            content_range: None,
        }
    }
}

/// Parsed `Range` header: `(start, inclusive_end)` with an open end for
/// `bytes=a-`, or a suffix length for `bytes=-n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSpec {
    FromTo(u64, Option<u64>),
    Suffix(u64),
}

/// Parse a `Range` header value. `None` means malformed or multi-range
/// (not supported), which callers treat as "serve the full content".
fn parse_range_header(header: &str) -> Option<RangeSpec> {
    let spec = header.trim().strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }
    let (start, end) = spec.split_once('-')?;
    let start = start.trim();
    let end = end.trim();

    if start.is_empty() {
        return end.parse().ok().map(RangeSpec::Suffix);
    }
    let start: u64 = start.parse().ok()?;
    if end.is_empty() {
        return Some(RangeSpec::FromTo(start, None));
    }
    Some(RangeSpec::FromTo(start, Some(end.parse().ok()?)))
}

/// Resolve a header against a resource size into an inclusive byte
/// window, or `Ok(None)` for "full content".
fn resolve_range(header: Option<&str>, size: u64) -> RenderResult<Option<(u64, u64)>> {
    let Some(header) = header else {
        return Ok(None);
    };
    let Some(spec) = parse_range_header(header) else {
        return Ok(None);
    };
    if size == 0 {
        return Err(RenderError::RangeNotSatisfiable { size });
    }

    match spec {
        RangeSpec::FromTo(start, end) => {
            if start >= size {
                return Err(RenderError::RangeNotSatisfiable { size });
            }
            let end = end.map_or(size - 1, |e| e.min(size - 1));
            if end < start {
                return Err(RenderError::RangeNotSatisfiable { size });
            }
            Ok(Some((start, end)))
        }
        RangeSpec::Suffix(len) => {
            if len == 0 {
                return Err(RenderError::RangeNotSatisfiable { size });
            }
            Ok(Some((size.saturating_sub(len), size - 1)))
        }
    }
}

/// Serve a file, honoring an optional `Range` header.
///
/// Out-of-bounds ranges surface as
/// [`RenderError::RangeNotSatisfiable`] carrying the resource size so
/// the caller can emit the `bytes */size` form.
pub fn read_file_range(path: &Path, range_header: Option<&str>) -> RenderResult<DownloadResponse> {
    let data = std::fs::read(path)?;
    let size = data.len() as u64;

    match resolve_range(range_header, size)? {
        None => Ok(DownloadResponse::full(data)),
        Some((start, end)) => {
            let body = data[start as usize..=end as usize].to_vec();
            Ok(DownloadResponse::partial(body, start, end, size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            parse_range_header("bytes=0-99"),
            Some(RangeSpec::FromTo(0, Some(99)))
        );
        assert_eq!(
            parse_range_header("bytes=100-"),
            Some(RangeSpec::FromTo(100, None))
        );
        assert_eq!(parse_range_header("bytes=-500"), Some(RangeSpec::Suffix(500)));
        assert_eq!(parse_range_header("frames=0-99"), None);
        assert_eq!(parse_range_header("bytes=0-49,100-149"), None);
        assert_eq!(parse_range_header("bytes=abc-def"), None);
    }

    #[test]
    fn test_resolve_clamps_and_rejects() {
        // End past the resource clamps to the last byte.
        assert_eq!(
            resolve_range(Some("bytes=900-2000"), 1000).unwrap(),
            Some((900, 999))
        );
        // Start past the resource is not satisfiable.
        assert!(matches!(
            resolve_range(Some("bytes=2000-3000"), 1000),
            Err(RenderError::RangeNotSatisfiable { size: 1000 })
        ));
        // Inverted window is not satisfiable.
        assert!(matches!(
            resolve_range(Some("bytes=50-20"), 1000),
            Err(RenderError::RangeNotSatisfiable { .. })
        ));
        // Suffix larger than the resource means the whole resource.
        assert_eq!(
            resolve_range(Some("bytes=-5000"), 1000).unwrap(),
            Some((0, 999))
        );
        // Malformed header degrades to full content.
        assert_eq!(resolve_range(Some("bytes=oops"), 1000).unwrap(), None);
    }

    #[test]
    fn test_file_round_trip_with_ranges() {
        let path = std::env::temp_dir().join("montage_test_download_range.bin");
        std::fs::write(&path, vec![7u8; 1000]).unwrap();

        let full = read_file_range(&path, None).unwrap();
        assert_eq!(full.status, 200);
        assert_eq!(full.body.len(), 1000);
        assert_eq!(full.content_range, None);

        let partial = read_file_range(&path, Some("bytes=0-99")).unwrap();
        assert_eq!(partial.status, 206);
        assert_eq!(partial.body.len(), 100);
        assert_eq!(partial.content_range.as_deref(), Some("bytes 0-99/1000"));

        let err = read_file_range(&path, Some("bytes=2000-3000")).unwrap_err();
        assert!(matches!(err, RenderError::RangeNotSatisfiable { size: 1000 }));

        std::fs::remove_file(&path).ok();
    }
}
