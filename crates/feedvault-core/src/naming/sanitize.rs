//! Filename sanitization for titles and resolution tags.

/// Longest file name most filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename so it is valid on Linux, macOS and Windows.
///
/// - Replaces NUL, path separators, Windows-reserved punctuation
///   (`: * ? " < > |`) and control characters with `_`
/// - Collapses consecutive underscores produced by replacement
/// - Trims leading/trailing spaces and dots
/// - Limits length to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_replaced = false;

    for c in name.chars() {
        let invalid = matches!(c, '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            || c.is_control();
        if invalid {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '.');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].trim_end_matches(|c: char| c == ' ' || c == '.').to_string()
    } else {
        trimmed.to_string()
    }
}
