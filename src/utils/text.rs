use regex::Regex;
use std::sync::LazyLock;

/// Entities decoded by `html_to_text`, in decoding order
const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Strip the first matching organizational prefix from a title
pub fn display_title<S: AsRef<str>>(title: &str, prefixes: &[S]) -> String {
    prefixes
        .iter()
        .find_map(|prefix| title.strip_prefix(prefix.as_ref()))
        .unwrap_or(title)
        .to_string()
}

/// Cut text to at most `max` characters on a word boundary, adding an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let cut: String = text.chars().take(max).collect();

    // Drop the trailing partial word along with the whitespace before it
    let kept = match cut.rfind(char::is_whitespace) {
        Some(pos) => cut[..pos].trim_end(),
        None => cut.as_str(),
    };

    format!("{}…", kept)
}

/// Complete tags only; a bare `<` is text
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid html tag regex"));

/// Reduce an HTML fragment to plain text
pub fn html_to_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, " ");

    let decoded = ENTITIES
        .iter()
        .fold(stripped.into_owned(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        });

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
