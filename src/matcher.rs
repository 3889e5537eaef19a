//! Key matching.
//!
//! Pure functions deciding whether a stored key reaches a subscription:
//! - exact: string equality (the registry does this through its bucket map)
//! - regex: the pattern matches anywhere the caller's pattern allows
//! - topic: the key shares the leading separator-delimited segments of a
//!   wildcard topic such as `"a/b/*"`

use regex::Regex;

/// True if `key` is a wildcard topic: the bare wildcard token, or a key
/// ending in `separator` followed by the wildcard token.
pub fn is_wildcard(key: &str, separator: &str, wildcard: &str) -> bool {
    if key == wildcard {
        return true;
    }
    key.strip_suffix(wildcard)
        .is_some_and(|rest| rest.ends_with(separator))
}

/// Leading segments of a wildcard topic, without the trailing wildcard.
///
/// `"a/b/*"` yields `["a", "b"]`; the bare wildcard yields no segments.
pub fn topic_prefix(topic: &str, separator: &str) -> Vec<String> {
    let mut segments: Vec<String> = topic.split(separator).map(str::to_string).collect();
    segments.pop();
    segments
}

/// True if `key` sits under `prefix`.
///
/// The key must contain the separator and its first `prefix.len()` segments
/// must equal the prefix.
pub fn topic_matches(prefix: &[String], key: &str, separator: &str) -> bool {
    if !key.contains(separator) {
        return false;
    }

    let mut segments = key.split(separator);
    prefix
        .iter()
        .all(|expected| segments.next() == Some(expected.as_str()))
}

/// Regex test against the full stored key.
pub fn regex_matches(regex: &Regex, key: &str) -> bool {
    regex.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prefix(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("a/b/*", "/", "*"));
        assert!(is_wildcard("a/*", "/", "*"));
        assert!(is_wildcard("*", "/", "*"));
        assert!(!is_wildcard("a/b", "/", "*"));
        assert!(!is_wildcard("ab*", "/", "*"));
        assert!(!is_wildcard("a/*/b", "/", "*"));
        assert!(is_wildcard("a.b.#", ".", "#"));
        assert!(is_wildcard("a::*", "::", "*"));
    }

    #[test]
    fn test_topic_prefix() {
        assert_eq!(topic_prefix("a/b/*", "/"), prefix(&["a", "b"]));
        assert_eq!(topic_prefix("a/*", "/"), prefix(&["a"]));
        assert!(topic_prefix("*", "/").is_empty());
        assert_eq!(topic_prefix("x::y::*", "::"), prefix(&["x", "y"]));
    }

    #[test]
    fn test_topic_matches() {
        let a = prefix(&["a"]);
        assert!(topic_matches(&a, "a/b", "/"));
        assert!(topic_matches(&a, "a/c/d", "/"));
        assert!(!topic_matches(&a, "x/b", "/"));
        assert!(!topic_matches(&a, "ab/c", "/"));
        // No separator, never under a topic
        assert!(!topic_matches(&a, "a", "/"));

        let ab = prefix(&["a", "b"]);
        assert!(topic_matches(&ab, "a/b", "/"));
        assert!(topic_matches(&ab, "a/b/c", "/"));
        assert!(!topic_matches(&ab, "a/c", "/"));
        assert!(!topic_matches(&prefix(&["a", "b", "c"]), "a/b", "/"));

        assert!(topic_matches(&[], "any/thing", "/"));
        assert!(!topic_matches(&[], "flat", "/"));
    }

    #[test]
    fn test_regex_is_unanchored() {
        let re = Regex::new("(t|r|b)est").unwrap();
        assert!(regex_matches(&re, "test"));
        assert!(regex_matches(&re, "contest"));
        assert!(!regex_matches(&re, "pest"));

        let anchored = Regex::new("^(t|r|b)est$").unwrap();
        assert!(!regex_matches(&anchored, "contest"));
    }

    proptest! {
        #[test]
        fn prop_key_matches_its_own_topic(
            segments in prop::collection::vec("[a-z]{1,6}", 2..6),
            cut in 0usize..5,
        ) {
            let key = segments.join("/");
            let cut = cut.min(segments.len() - 1);
            let topic = format!("{}/*", segments[..cut].join("/"));
            let topic = if cut == 0 { "*".to_string() } else { topic };

            prop_assert!(is_wildcard(&topic, "/", "*"));
            let p = topic_prefix(&topic, "/");
            prop_assert_eq!(p.len(), cut);
            prop_assert!(topic_matches(&p, &key, "/"));
        }

        #[test]
        fn prop_differing_first_segment_never_matches(
            head in "[a-z]{1,6}",
            other in "[A-Z]{1,6}",
            tail in "[a-z]{1,6}",
        ) {
            let p = vec![head];
            let key = format!("{}/{}", other, tail);
            prop_assert!(!topic_matches(&p, &key, "/"));
        }
    }
}
