/// Content type used when the extension is unknown.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Maps a file extension (with or without the leading dot) to a content type.
///
/// Matching ignores ASCII case.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME,
    }
}

/// Content type for a path, judged by the text after its last dot.
pub fn content_type_for_path(path: &str) -> &'static str {
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => content_type_for_extension(ext),
        _ => DEFAULT_MIME,
    }
}
