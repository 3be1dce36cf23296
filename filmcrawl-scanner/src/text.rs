use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::LazyLock;

static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[0-9]+\]").expect("footnote pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Clean up text scraped out of page markup.
///
/// Non-breaking spaces become plain spaces, numeric footnote markers such as
/// `[12]` are removed, whitespace runs collapse to a single space and the
/// result is trimmed.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.replace('\u{a0}', " ");

    // Removing one marker can expose another ("[[1]2]"), so strip to a fixpoint
    while FOOTNOTE.is_match(&text) {
        text = FOOTNOTE.replace_all(&text, "").into_owned();
    }

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Deduplicate while keeping the first occurrence of every value.
pub fn uniq_preserve<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
