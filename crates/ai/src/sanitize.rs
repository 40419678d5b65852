//! Stripping formatting artifacts from raw provider text.

const FENCE: &str = "```";

/// Trim whitespace, drop a leading code fence (with or without a language
/// tag) and a trailing fence, then trim again.
///
/// The inner content is returned untouched.
pub fn sanitize(raw: &str) -> &str {
    let mut s = raw.trim();

    if let Some(rest) = s.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !is_tag_char(c))
            .unwrap_or(rest.len());
        s = &rest[tag_len..];
    }
    if let Some(rest) = s.strip_suffix(FENCE) {
        s = rest;
    }

    s.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')
}
