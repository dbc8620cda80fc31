use fetch_core::Resource;
use sha2::{Digest, Sha256};

/// Deterministic, Windows-safe filename: `{sanitized_id}--{short_hash(bytes)}.{ext}`.
///
/// The same bytes fetched under the same id always map to the same name.
pub fn deterministic_filename(resource: &Resource) -> String {
    let stem = sanitize_id(&resource.id);
    let hash = short_hash(&resource.bytes);
    let ext = extension_for(resource.content_type.as_deref());
    format!("{stem}--{hash}.{ext}")
}

fn sanitize_id(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut cleaned = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "resource".to_string();
    }
    if cleaned.len() > 64 {
        let mut end = 64;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("image/png") => "png",
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        Some("image/svg+xml") => "svg",
        Some("application/xml") | Some("text/xml") => "xml",
        _ => "bin",
    }
}

fn short_hash(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use fetch_core::Resource;

    use super::deterministic_filename;

    #[test]
    fn same_bytes_same_name() {
        let a = Resource::new("42", &b"png-bytes"[..]).with_content_type("image/png");
        let b = Resource::new("42", &b"png-bytes"[..]).with_content_type("image/png");
        assert_eq!(deterministic_filename(&a), deterministic_filename(&b));
        assert!(deterministic_filename(&a).starts_with("42--"));
        assert!(deterministic_filename(&a).ends_with(".png"));
    }

    #[test]
    fn forbidden_characters_collapse() {
        let resource = Resource::new("a/b: c??", &b"x"[..]).with_content_type("image/jpeg; q=1");
        let name = deterministic_filename(&resource);
        assert!(name.starts_with("a_b_c--"), "{name}");
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn reserved_and_empty_ids_are_fixed_up() {
        let con = deterministic_filename(&Resource::new("con", &b"x"[..]));
        assert!(con.starts_with("con_--"));
        assert!(con.ends_with(".bin"));

        let empty = deterministic_filename(&Resource::new("..", &b"x"[..]));
        assert!(empty.starts_with("resource--"));
    }
}
