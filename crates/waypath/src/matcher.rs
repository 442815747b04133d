//! Pattern matching.
//!
//! [`eval_path`] walks a [`Pattern`] and a slice of positional arguments
//! together and reports whether they match, binding parameter values on the
//! way. Matching is strict about length: without a wildcard, every input
//! word must be covered by a token, and every required token must find an
//! input word.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::pattern::{Pattern, TokenKind};
use crate::validate::{SpecScope, SpecSet};

/// Bound parameter values, by parameter name.
pub type Params = BTreeMap<String, String>;

/// Resolved option values, by canonical option name.
pub type Options = BTreeMap<String, Value>;

/// The outcome of one match attempt. Created fresh for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    pub params: Params,
    pub options: Options,
    /// Number of input words covered by the match.
    pub consumed: usize,
}

impl MatchResult {
    fn no_match() -> Self {
        Self::default()
    }
}

/// Knobs that change how literals compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub case_sensitive: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl MatchSettings {
    fn literal_eq(&self, expected: &str, actual: &str) -> bool {
        if self.case_sensitive {
            expected == actual
        } else {
            expected.eq_ignore_ascii_case(actual)
        }
    }
}

/// Evaluates `pattern` against `input`.
///
/// Parameter values are checked against the specs visible from `scope`.
pub fn eval_path<S: AsRef<str>>(
    input: &[S],
    pattern: &Pattern,
    scope: &SpecScope<'_>,
    settings: MatchSettings,
) -> MatchResult {
    let mut result = MatchResult::default();

    for (index, token) in pattern.tokens().iter().enumerate() {
        let arg = input.get(index).map(AsRef::as_ref);
        match token.kind {
            TokenKind::Wildcard => {
                result.matched = true;
                result.consumed = input.len();
                return result;
            }
            TokenKind::Literal => match arg {
                Some(arg) if settings.literal_eq(&token.name, arg) => {}
                _ => return MatchResult::no_match(),
            },
            TokenKind::Parameter => match arg {
                Some(arg) if scope.accepts_param(&token.name, arg) => {
                    result.params.insert(token.name.clone(), arg.to_string());
                }
                _ => return MatchResult::no_match(),
            },
            TokenKind::OptionalParameter => match arg {
                None => {}
                Some(arg) if scope.accepts_param(&token.name, arg) => {
                    result.params.insert(token.name.clone(), arg.to_string());
                }
                Some(_) => return MatchResult::no_match(),
            },
        }
    }

    if input.len() > pattern.len() {
        return MatchResult::no_match();
    }

    result.matched = true;
    result.consumed = input.len();
    result
}

impl Pattern {
    /// Matches without any registered specs, using default settings.
    pub fn eval<S: AsRef<str>>(&self, input: &[S]) -> MatchResult {
        let specs = SpecSet::new();
        eval_path(input, self, &SpecScope::new(&specs), MatchSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ParamSpec;

    fn pattern(source: &str) -> Pattern {
        Pattern::parse(source).unwrap()
    }

    #[test]
    fn test_literal_exact_match() {
        let result = pattern("hello").eval(&["hello"]);
        assert!(result.matched);
        assert_eq!(result.consumed, 1);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_extra_input_fails_without_wildcard() {
        assert!(!pattern("a").eval(&["a", "b"]).matched);
    }

    #[test]
    fn test_missing_input_fails() {
        assert!(!pattern("hello :myParam world").eval(&["hello", "myValue"]).matched);
    }

    #[test]
    fn test_single_param_binds() {
        let result = pattern("hello :param").eval(&["hello", "world"]);
        assert!(result.matched);
        assert_eq!(result.params.get("param").map(String::as_str), Some("world"));
    }

    #[test]
    fn test_two_params_bind() {
        let result = pattern("hello :p1 :p2").eval(&["hello", "foo", "bar"]);
        assert!(result.matched);
        assert_eq!(result.params["p1"], "foo");
        assert_eq!(result.params["p2"], "bar");
    }

    #[test]
    fn test_param_between_literals() {
        let result = pattern("hello :myParam world").eval(&["hello", "myValue", "world"]);
        assert!(result.matched);
        assert_eq!(result.params["myParam"], "myValue");
    }

    #[test]
    fn test_wildcard_absorbs_suffix() {
        let result = pattern("myRoute *").eval(&["myRoute", "anything", "hello"]);
        assert!(result.matched);
        assert_eq!(result.consumed, 3);
    }

    #[test]
    fn test_wildcard_matches_empty_suffix() {
        assert!(pattern("myRoute *").eval(&["myRoute"]).matched);
        assert!(pattern("*").eval::<&str>(&[]).matched);
    }

    #[test]
    fn test_literal_before_wildcard_still_checked() {
        assert!(!pattern("myRoute *").eval(&["other", "x"]).matched);
    }

    #[test]
    fn test_optional_param_present_and_absent() {
        let p = pattern("greet :[name]");
        let present = p.eval(&["greet", "bob"]);
        assert!(present.matched);
        assert_eq!(present.params["name"], "bob");

        let absent = p.eval(&["greet"]);
        assert!(absent.matched);
        assert!(absent.params.is_empty());
        assert_eq!(absent.consumed, 1);
    }

    #[test]
    fn test_optional_param_does_not_excuse_later_required_token() {
        assert!(!pattern("a :[b] c").eval(&["a"]).matched);
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_input() {
        let empty = pattern("");
        assert!(empty.eval::<&str>(&[]).matched);
        assert!(!empty.eval(&["x"]).matched);
    }

    #[test]
    fn test_validator_rejection_is_no_match() {
        let mut specs = SpecSet::new();
        specs.insert_param("myParam", ParamSpec::new().regex("[0-9]*").unwrap());
        let scope = SpecScope::new(&specs);
        let p = pattern("hello :myParam");

        let accepted = eval_path(&["hello", "1234"], &p, &scope, MatchSettings::default());
        assert!(accepted.matched);

        let rejected = eval_path(&["hello", "world"], &p, &scope, MatchSettings::default());
        assert_eq!(rejected, MatchResult::default());
    }

    #[test]
    fn test_optional_param_validator_rejection() {
        let mut specs = SpecSet::new();
        specs.insert_param("n", ParamSpec::new().validator(|v| v.len() == 1));
        let scope = SpecScope::new(&specs);
        let p = pattern("take :[n]");

        assert!(eval_path(&["take", "1"], &p, &scope, MatchSettings::default()).matched);
        assert!(!eval_path(&["take", "12"], &p, &scope, MatchSettings::default()).matched);
        assert!(eval_path(&["take"], &p, &scope, MatchSettings::default()).matched);
    }

    #[test]
    fn test_case_insensitive_literals() {
        let specs = SpecSet::new();
        let scope = SpecScope::new(&specs);
        let p = pattern("Hello :name");
        let insensitive = MatchSettings {
            case_sensitive: false,
        };

        assert!(!eval_path(&["hello", "Bob"], &p, &scope, MatchSettings::default()).matched);
        let result = eval_path(&["hello", "Bob"], &p, &scope, insensitive);
        assert!(result.matched);
        // Parameter values keep their original case.
        assert_eq!(result.params["name"], "Bob");
    }
}
