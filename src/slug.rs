//! Derives URL path segments from entry titles.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Derives a URL-safe slug from a title: periods become spaces, the result
/// is lowercased, characters other than word characters, whitespace, and
/// hyphens are stripped, and runs of whitespace collapse to single hyphens.
/// Applying [`slugify`] to its own output returns it unchanged.
pub fn slugify(title: &str) -> String {
    let lowered = title.replace('.', " ").to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, "-").into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!("hello-world", slugify("Hello World"));
    }

    #[test]
    fn test_slugify_periods_become_separators() {
        assert_eq!("hello-world", slugify("Hello.World"));
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!("dont-panic", slugify("Don't Panic!"));
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!("a-b", slugify("a \t  b"));
    }

    #[test]
    fn test_slugify_keeps_existing_hyphens() {
        assert_eq!("re-run", slugify("Re-run"));
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let slug = slugify("Announcing: The 2020.01 Release!");
        assert_eq!(slug, slugify(&slug));
    }

    #[test]
    fn test_slugify_is_lowercase_and_url_safe() {
        let slug = slugify("A Rather LOUD Title, Verily");
        assert!(slug.chars().all(|c| {
            c.is_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
        }));
    }
}
