/// Number of characters in a search excerpt.
pub const EXCERPT_LENGTH: usize = 150;

/// Characters of context kept before a match that is far enough into the
/// content.
pub const EXCERPT_LEAD: usize = 50;

/// Marker placed where an excerpt cuts the content.
pub const ELLIPSIS: &str = "...";

/// Build the excerpt shown under a search result.
///
/// The content and the raw query are case-folded and the first literal
/// occurrence of the query is located. When it starts at character offset
/// [`EXCERPT_LEAD`] or later, the excerpt opens with [`ELLIPSIS`] and starts
/// `EXCERPT_LEAD` characters before the match; otherwise (including no
/// match at all) it is the head of the content. The excerpt is always
/// [`EXCERPT_LENGTH`] characters at most, taken from the original-case
/// content, followed by [`ELLIPSIS`].
///
/// The locate step is a plain substring search and is independent of token
/// matching: a multi-word query can match a document without occurring in
/// it literally, in which case the head of the content is shown.
pub fn excerpt(content: &str, query: &str) -> String {
    let start = find_folded(content, query)
        .filter(|&offset| offset >= EXCERPT_LEAD)
        .map(|offset| offset - EXCERPT_LEAD);

    let mut out = String::new();
    if start.is_some() {
        out.push_str(ELLIPSIS);
    }
    out.extend(content.chars().skip(start.unwrap_or(0)).take(EXCERPT_LENGTH));
    out.push_str(ELLIPSIS);
    out
}

/// Character offset (in `haystack`) of the first case-insensitive
/// occurrence of `needle`.
///
/// Lowercasing can change the number of characters, so every folded
/// character remembers which original character it came from.
fn find_folded(haystack: &str, needle: &str) -> Option<usize> {
    let needle = fold_case(needle);
    let mut folded = String::with_capacity(haystack.len());
    let mut origin = Vec::with_capacity(haystack.len());
    for (idx, c) in haystack.chars().enumerate() {
        for lower in c.to_lowercase() {
            folded.push(lower);
            origin.push(idx);
        }
    }

    let byte_offset = folded.find(&needle)?;
    let folded_idx = folded[..byte_offset].chars().count();
    Some(origin.get(folded_idx).copied().unwrap_or(0))
}

/// Lowercase text one character at a time, without the context-sensitive
/// rules of [`str::to_lowercase`] (a final `Σ` still becomes `σ`).
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Whether `c` belongs to the `\w` class: alphanumeric or underscore.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Clean a notebook title: drop everything except word characters,
/// whitespace and hyphens, collapse runs of whitespace and trim.
pub fn clean_title(text: &str) -> String {
    text.chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace() || c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Anchor id of a heading: drop everything except word characters,
/// whitespace and hyphens, lowercase, and turn spaces into hyphens.
pub fn heading_anchor(text: &str) -> String {
    text.chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace() || c == '-')
        .collect::<String>()
        .to_lowercase()
        .replace(' ', "-")
}

/// Title-case a directory name: underscores become spaces, the first letter
/// of every run of letters is uppercased and the rest lowercased
/// (`machine_learning` → `Machine Learning`, `nlp2go` → `Nlp2Go`).
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Remove inline markdown markers (`#`, `*`, `_`, backticks) from text.
pub fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '#' | '*' | '_' | '`'))
        .collect()
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
