//! File extension extraction from URL path.

/// Returns the extension of the last URL path segment, including the leading
/// dot (e.g. `".jpg"`). Query and fragment are ignored.
///
/// Returns `None` if the URL cannot be parsed or the last segment has no
/// extension.
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext))
}
