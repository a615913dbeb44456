use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9.\-]").unwrap());

const TOKEN_BYTES: usize = 16;

/// Name a stored upload: `<32 hex chars>-<sanitized basename>`.
pub fn stored_file_name(original: &str) -> String {
    format!("{}-{}", random_token(), sanitize_basename(original))
}

/// 16 random bytes, hex encoded.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Strip directory components, then replace anything outside `[A-Za-z0-9.-]`
/// with `_`.
pub fn sanitize_basename(original: &str) -> String {
    DISALLOWED_CHARS
        .replace_all(basename(original), "_")
        .into_owned()
}

fn basename(name: &str) -> &str {
    let trimmed = name.trim_end_matches(is_separator);
    trimmed
        .rsplit(is_separator)
        .next()
        .unwrap_or(trimmed)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Lowercased text after the last `.`; `None` when the name has no dot.
pub fn file_extension(original: &str) -> Option<String> {
    original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(original: &str, allowed: &[String]) -> bool {
    match file_extension(original) {
        Some(ext) => allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}
