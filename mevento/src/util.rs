//! Shared utility functions
//!
//! Typo suggestions used by parser diagnostics and call tracing, and the
//! stack-growth limits shared by the parser and the evaluator.

/// Stack size for deep recursion (parser and evaluator)
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Maximum edit distance for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: usize = 2;

/// Calculate Levenshtein edit distance between two strings.
/// Uses O(min(m,n)) space with two-row optimization.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find the most similar name among the candidates.
/// Returns `Some(suggestion)` if a match is found within the threshold.
/// Exact matches are not suggestions and are skipped.
pub fn find_similar_name<'a, I>(name: &str, candidates: I, threshold: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match: Option<&str> = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = levenshtein_distance(name, candidate);
        if distance < best_distance && distance <= threshold {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}

/// Format a "did you mean" suggestion hint for an unknown name.
pub fn format_suggestion_hint(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(name) => format!(" (hint: did you mean `{}`?)", name),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein_distance("while", "while"), 0);
    }

    #[test]
    fn test_levenshtein_single_edit() {
        assert_eq!(levenshtein_distance("while", "whle"), 1);
    }

    #[test]
    fn test_levenshtein_transposition_counts_two() {
        assert_eq!(levenshtein_distance("while", "whiel"), 2);
    }

    #[test]
    fn test_levenshtein_empty_strings() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_levenshtein_non_ascii() {
        assert_eq!(levenshtein_distance("jusqua", "jusquà"), 1);
    }

    #[test]
    fn test_find_similar_name_close() {
        assert_eq!(find_similar_name("pour", ["pour", "jusqua"], 2), None);
        assert_eq!(find_similar_name("por", ["pour", "jusqua"], 2), Some("pour"));
    }

    #[test]
    fn test_find_similar_name_picks_closest() {
        let candidates = ["while", "with", "till"];
        assert_eq!(find_similar_name("wile", candidates, 2), Some("while"));
    }

    #[test]
    fn test_find_similar_name_none() {
        assert_eq!(find_similar_name("xyz", ["hello", "world"], 2), None);
    }

    #[test]
    fn test_format_suggestion_hint() {
        assert_eq!(
            format_suggestion_hint(Some("while")),
            " (hint: did you mean `while`?)"
        );
        assert_eq!(format_suggestion_hint(None), "");
    }
}
