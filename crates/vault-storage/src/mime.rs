//! MIME type guessing for uploads that arrive without a content type.

/// Fallback content type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess MIME type from a file name extension.
pub fn mime_from_name(name: &str) -> Option<String> {
    mime_guess::from_path(name).first_raw().map(str::to_string)
}

/// Resolve the content type of an upload: the declared type when present,
/// otherwise a guess from the name, otherwise `application/octet-stream`.
pub fn resolve_mime_type(declared: Option<&str>, name: &str) -> String {
    declared
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| mime_from_name(name))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
