//! services/viewer/src/bridge/file_type.rs
//!
//! Content type detection for files handed over by the host. Magic bytes win;
//! the file extension is only consulted when the bytes are not recognized.

use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
const OCTET_STREAM: &str = "application/octet-stream";

/// Detects the MIME type of `data`.
///
/// Order: magic bytes via `infer`, then `claimed`, then the extension of
/// `path`. A binary type (PDF or raster image) that the bytes did not confirm
/// is downgraded to `application/octet-stream`.
pub fn detect_content_type(path: &Path, data: &[u8], claimed: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    let fallback = claimed
        .map(str::to_string)
        .or_else(|| mime_from_extension(path).map(str::to_string));

    match fallback {
        Some(mime) if claimed_is_binary(&mime) => OCTET_STREAM.to_string(),
        Some(mime) => mime,
        None => OCTET_STREAM.to_string(),
    }
}

pub fn is_pdf(mime: &str) -> bool {
    mime == PDF_MIME
}

pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Types that always carry recognizable magic bytes.
fn claimed_is_binary(mime: &str) -> bool {
    // SVG is text and has no signature.
    (mime.starts_with("image/") && mime != "image/svg+xml") || mime == PDF_MIME
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}
