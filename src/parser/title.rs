use crate::constants::MUSIC_EXTENSIONS;
use regex::Regex;
use std::sync::OnceLock;

/// Canonical form of a display name used as an equality key across the local
/// dataset and the Janeway mirror.
///
/// Lower-cases, drops everything that is not alphanumeric or whitespace and
/// collapses whitespace. The result is stable under repeated application.
#[must_use]
pub fn generate_search_title(title: &str) -> String {
    let filtered: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn music_extension_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        let alternation = MUSIC_EXTENSIONS
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");

        (
            Regex::new(&format!(r"(?i)^(?:{alternation})\.")).expect("Invalid Regex"),
            Regex::new(&format!(r"(?i)\.(?:{alternation})$")).expect("Invalid Regex"),
        )
    })
}

/// Removes a trailing `.mod`-style extension and a leading Amiga-style
/// `mod.` prefix from a music title. A title consisting of nothing but the
/// extension is returned unchanged.
#[must_use]
pub fn strip_music_extensions(title: &str) -> String {
    let (prefix, suffix) = music_extension_patterns();
    let trimmed = title.trim();

    let without_suffix = match suffix.find(trimmed) {
        Some(m) if m.start() > 0 => &trimmed[..m.start()],
        _ => trimmed,
    };

    let without_prefix = match prefix.find(without_suffix) {
        Some(m) if m.end() < without_suffix.len() => &without_suffix[m.end()..],
        _ => without_suffix,
    };

    without_prefix.trim().to_string()
}
