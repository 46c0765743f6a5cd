//! HTTP file responses.
//!
//! The routing layer decides *whether* a file is served; everything about
//! *how* bytes leave the process lives behind [`FileServer`]. The default
//! [`DiskServer`] covers content types, conditional requests, HEAD, and
//! Range requests.

use anyhow::{Context, Result};
use std::{fs, path::Path, time::UNIX_EPOCH};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime;

use super::decision::ServableFile;

/// File-serving collaborator boundary.
pub trait FileServer: Send + Sync {
    /// Produce the full HTTP response for a resolved file.
    fn respond(&self, request: Request, file: &ServableFile) -> Result<()>;
}

/// Disk-backed file server.
pub struct DiskServer {
    cache_control: &'static str,
}

impl DiskServer {
    pub fn new(autorefresh: bool) -> Self {
        Self {
            // Autorefresh exists to make edits visible immediately; tell
            // clients to revalidate every time.
            cache_control: if autorefresh {
                "no-cache"
            } else {
                "public, max-age=3600"
            },
        }
    }
}

impl FileServer for DiskServer {
    fn respond(&self, request: Request, file: &ServableFile) -> Result<()> {
        let path = &file.path;
        let content_type = mime::from_path(path);

        let etag = match &file.etag {
            Some(tag) => Some(tag.clone()),
            None => metadata_etag(path),
        };

        // Conditional request: unchanged validator short-circuits the body.
        if let (Some(tag), Some(client)) = (&etag, if_none_match(&request)) {
            if client.trim_matches('"') == tag.as_str() {
                return send_not_modified(request, tag);
            }
        }

        if request.method() == &Method::Head {
            return self.send_head(request, content_type, etag.as_deref());
        }

        if let Some(range) = get_range_header(&request) {
            return respond_range(request, path, content_type, &range);
        }

        let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let mut response = Response::from_data(body)
            .with_header(make_header("Content-Type", content_type))
            .with_header(make_header("Cache-Control", self.cache_control));
        if let Some(tag) = &etag {
            response = response.with_header(make_header("ETag", &format!("\"{tag}\"")));
        }
        request.respond(response)?;
        Ok(())
    }
}

impl DiskServer {
    fn send_head(
        &self,
        request: Request,
        content_type: &'static str,
        etag: Option<&str>,
    ) -> Result<()> {
        let mut response = Response::empty(StatusCode(200))
            .with_header(make_header("Content-Type", content_type))
            .with_header(make_header("Cache-Control", self.cache_control));
        if let Some(tag) = etag {
            response = response.with_header(make_header("ETag", &format!("\"{tag}\"")));
        }
        request.respond(response)?;
        Ok(())
    }
}

/// Weak validator from file metadata, for autorefresh mode where no
/// content hash was precomputed.
fn metadata_etag(path: &Path) -> Option<String> {
    let meta = fs::metadata(path).ok()?;
    let mtime = meta
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_secs();
    Some(format!("{:x}-{:x}", meta.len(), mtime))
}

/// Extract If-None-Match header from request.
fn if_none_match(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("if-none-match"))
        .map(|h| h.value.to_string())
}

fn send_not_modified(request: Request, etag: &str) -> Result<()> {
    let response = Response::empty(StatusCode(304))
        .with_header(make_header("ETag", &format!("\"{etag}\"")));
    request.respond(response)?;
    Ok(())
}

/// Handle Range request (e.g. font or media seeking).
fn respond_range(
    request: Request,
    path: &Path,
    content_type: &'static str,
    range: &str,
) -> Result<()> {
    use std::io::{Read, Seek, SeekFrom};

    let file_size = fs::metadata(path)?.len();
    if file_size == 0 {
        return send_body(request, 200, content_type, Vec::new());
    }

    // Parse "bytes=start-end" format
    let range = range.strip_prefix("bytes=").unwrap_or(range);
    let (start, end) = parse_range(range, file_size);
    let length = end - start + 1;

    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    let content_range = format!("bytes {}-{}/{}", start, end, file_size);
    let response = Response::new(
        StatusCode(206),
        vec![
            Header::from_bytes("Content-Type", content_type).unwrap(),
            Header::from_bytes("Content-Range", content_range.as_bytes()).unwrap(),
            Header::from_bytes("Accept-Ranges", "bytes").unwrap(),
        ],
        reader,
        Some(length as usize),
        None,
    );

    request.respond(response)?;
    Ok(())
}

/// Parse Range header value "start-end" into (start, end) bytes.
fn parse_range(range: &str, file_size: u64) -> (u64, u64) {
    let parts: Vec<&str> = range.trim().split('-').collect();

    let (start, end) = match parts.as_slice() {
        // "0-499" - specific range
        [s, e] if !s.is_empty() && !e.is_empty() => {
            let start: u64 = s.trim().parse().unwrap_or(0);
            let end: u64 = e.trim().parse().unwrap_or(file_size - 1);
            (start, end.min(file_size - 1))
        }
        // "0-" - from start to end
        [s, ""] if !s.is_empty() => {
            let start: u64 = s.trim().parse().unwrap_or(0);
            (start, file_size - 1)
        }
        // "-500" - last 500 bytes
        ["", e] if !e.is_empty() => {
            let suffix: u64 = e.trim().parse().unwrap_or(0);
            (file_size.saturating_sub(suffix), file_size - 1)
        }
        _ => (0, file_size - 1),
    };

    // A reversed range ("500-400") degrades to the whole file.
    if start > end {
        (0, file_size - 1)
    } else {
        (start, end)
    }
}

/// Extract Range header from request.
fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

/// Plain 404 response.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with an HTML page.
pub fn respond_html(request: Request, body: String) -> Result<()> {
    send_body(request, 200, mime::types::HTML, body.into_bytes())
}

/// Respond with a render error page (500).
pub fn respond_error(request: Request, error: &anyhow::Error) -> Result<()> {
    let rendered = format!("{error:#}");
    let msg = crate::utils::html::escape(&rendered);
    let body = format!("<html><body><h1>Render Error</h1><pre>{msg}</pre></body></html>");
    send_body(request, 500, mime::types::HTML, body.into_bytes())
}

pub(super) fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_range_variants() {
        assert_eq!(parse_range("0-499", 1000), (0, 499));
        assert_eq!(parse_range("500-", 1000), (500, 999));
        assert_eq!(parse_range("-200", 1000), (800, 999));
        assert_eq!(parse_range("0-5000", 1000), (0, 999));
        assert_eq!(parse_range("500-400", 1000), (0, 999));
        assert_eq!(parse_range("garbage", 1000), (0, 999));
    }

    #[test]
    fn test_metadata_etag_changes_with_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, "one").unwrap();
        let first = metadata_etag(&path).unwrap();

        fs::write(&path, "longer content").unwrap();
        let second = metadata_etag(&path).unwrap();
        assert_ne!(first, second);
    }
}
