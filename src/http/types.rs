//! File extension → MIME type table.

use std::path::Path;

/// Canonical `Content-Type` for a format name or file extension.
///
/// Matching is case-insensitive. Returns `None` for extensions outside
/// the built-in table.
pub fn content_type_for(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let ty = match ext.as_str() {
        "appcache" => "text/cache-manifest",
        "atom" => "application/atom+xml",
        "bin" => "application/octet-stream",
        "css" => "text/css",
        "gif" => "image/gif",
        "gz" => "application/x-gzip",
        "htm" => "text/html",
        "html" => "text/html;charset=UTF-8",
        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" => "application/javascript",
        "json" => "application/json;charset=UTF-8",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "ogg" => "audio/ogg",
        "ogv" => "video/ogg",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "rss" => "application/rss+xml",
        "svg" => "image/svg+xml",
        "ttf" => "font/ttf",
        "txt" => "text/plain;charset=UTF-8",
        "webm" => "video/webm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(ty)
}

/// `Content-Type` for a file path: the built-in table first, then
/// `mime_guess`, then `application/octet-stream`.
pub fn content_type_for_path(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for)
        .map(str::to_string)
        .unwrap_or_else(|| mime_guess::from_path(path).first_or_octet_stream().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        assert_eq!(content_type_for("html"), Some("text/html;charset=UTF-8"));
        assert_eq!(content_type_for(".JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("xml"), Some("application/xml"));
        assert_eq!(content_type_for("nope"), None);
    }

    #[test]
    fn test_path_fallback() {
        assert_eq!(content_type_for_path("public/index.html"), "text/html;charset=UTF-8");
        assert_eq!(content_type_for_path("doc.csv"), "text/csv");
        assert_eq!(content_type_for_path("blob"), "application/octet-stream");
    }
}
