//! Property-based tests for patterns and matching using proptest.

use proptest::prelude::*;
use waypath::{tokenize, Pattern, TokenKind};

// ============================================================================
// Strategies
// ============================================================================

fn word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn whitespace() -> impl Strategy<Value = String> {
    "[ \t\n]{1,4}"
}

fn words(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word(), 1..max)
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Any run of whitespace separates tokens the same way a single space does.
    #[test]
    fn whitespace_is_normalized(
        parts in words(6),
        gaps in prop::collection::vec(whitespace(), 6),
        lead in "[ \t]{0,3}",
        trail in "[ \t]{0,3}",
    ) {
        let mut messy = lead;
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                messy.push_str(&gaps[index - 1]);
            }
            messy.push_str(part);
        }
        messy.push_str(&trail);

        prop_assert_eq!(tokenize(&messy).unwrap(), tokenize(&parts.join(" ")).unwrap());
    }

    /// A pattern of plain words matches exactly those words.
    #[test]
    fn literal_pattern_matches_itself(parts in words(6)) {
        let pattern = Pattern::parse(&parts.join(" ")).unwrap();
        let result = pattern.eval(&parts);
        prop_assert!(result.matched);
        prop_assert_eq!(result.consumed, parts.len());
        prop_assert!(result.params.is_empty());
    }

    /// Without a wildcard, any extra input word breaks the match.
    #[test]
    fn extra_input_never_matches(parts in words(6), extra in word()) {
        let pattern = Pattern::parse(&parts.join(" ")).unwrap();
        let mut input = parts.clone();
        input.push(extra);
        prop_assert!(!pattern.eval(&input).matched);
    }

    /// A trailing wildcard accepts any suffix.
    #[test]
    fn wildcard_accepts_any_suffix(parts in words(4), suffix in prop::collection::vec(word(), 0..5)) {
        let pattern = Pattern::parse(&format!("{} *", parts.join(" "))).unwrap();
        let mut input = parts.clone();
        input.extend(suffix);
        let result = pattern.eval(&input);
        prop_assert!(result.matched);
        prop_assert_eq!(result.consumed, input.len());
    }

    /// Every parameter binds the word at its position.
    #[test]
    fn parameters_bind_positionally(values in words(6)) {
        let source: Vec<String> = (0..values.len()).map(|i| format!(":p{i}")).collect();
        let pattern = Pattern::parse(&source.join(" ")).unwrap();
        prop_assert!(pattern.tokens().iter().all(|t| t.kind == TokenKind::Parameter));

        let result = pattern.eval(&values);
        prop_assert!(result.matched);
        for (index, value) in values.iter().enumerate() {
            prop_assert_eq!(&result.params[&format!("p{index}")], value);
        }
    }

    /// A token starting with a dash is always rejected.
    #[test]
    fn dash_tokens_are_rejected(parts in words(4), flag in "-{1,2}[a-z]{1,5}") {
        let source = format!("{} {}", parts.join(" "), flag);
        prop_assert!(Pattern::parse(&source).is_err());
    }

    /// Matching never panics, whatever the input.
    #[test]
    fn eval_is_total(
        pattern in "(:?\\[?[a-z]{1,3}\\]? ){0,4}\\*?",
        input in prop::collection::vec("[a-zA-Z0-9-]{0,4}", 0..6),
    ) {
        if let Ok(pattern) = Pattern::parse(&pattern) {
            let result = pattern.eval(&input);
            prop_assert!(result.consumed <= input.len());
        }
    }
}
