//! Parameter and option specifications.
//!
//! A [`ParamSpec`] decides whether an input word may bind to a named
//! parameter; an [`OptionSpec`] carries alias names and an optional value
//! check for a flag. Specs are registered on routes and commands and looked
//! up by name through a [`SpecScope`]: the chain of spec sets from the
//! innermost registration point (a command) out to the root.
//!
//! A spec that rejects a value is not an error. The candidate simply does not
//! match and dispatch moves on to the next sibling.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use serde_json::Value;

use crate::options::AliasTable;

/// Predicate over a parameter value.
pub type ParamValidatorFn = Rc<dyn Fn(&str) -> bool>;

/// Predicate over a resolved option value.
pub type OptionValidatorFn = Rc<dyn Fn(&Value) -> bool>;

/// Validation metadata for a named parameter.
///
/// # Example
///
/// ```rust
/// use waypath::ParamSpec;
///
/// let digits = ParamSpec::new().regex("[0-9]*").unwrap();
/// assert!(digits.accepts("1234"));
/// assert!(!digits.accepts("world"));
/// ```
#[derive(Clone, Default)]
pub struct ParamSpec {
    friendly_name: Option<String>,
    validation_regex: Option<Regex>,
    validator: Option<ParamValidatorFn>,
}

impl ParamSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a human-readable name, shown in place of `:name` by
    /// [`Route::help_entries`](crate::Route::help_entries).
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Requires values to match `pattern` in full.
    ///
    /// The expression is anchored on both ends, so `[0-9]*` accepts `"1234"`
    /// but not `"12a"`.
    pub fn regex(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.validation_regex = Some(anchored(pattern)?);
        Ok(self)
    }

    /// Requires values to satisfy `f`.
    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.validator = Some(Rc::new(f));
        self
    }

    pub fn get_friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    /// Returns true if `value` passes the regex and the validator, whichever
    /// are set.
    pub fn accepts(&self, value: &str) -> bool {
        if let Some(regex) = &self.validation_regex {
            if !regex.is_match(value) {
                return false;
            }
        }
        self.validator.as_ref().map_or(true, |f| f(value))
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("friendly_name", &self.friendly_name)
            .field(
                "validation_regex",
                &self.validation_regex.as_ref().map(Regex::as_str),
            )
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Alias and validation metadata for a named option.
///
/// ```rust
/// use waypath::OptionSpec;
///
/// let spec = OptionSpec::new().alias("t").describe("run in test mode");
/// assert_eq!(spec.aliases(), ["t"]);
/// ```
#[derive(Clone, Default)]
pub struct OptionSpec {
    aliases: Vec<String>,
    description: Option<String>,
    validator: Option<OptionValidatorFn>,
}

impl OptionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an alternative spelling, e.g. `t` for `--test`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases_from<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.validator = Some(Rc::new(f));
        self
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.validator.as_ref().map_or(true, |f| f(value))
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// The parameter and option specs registered at one point of the tree.
#[derive(Debug, Clone, Default)]
pub struct SpecSet {
    params: BTreeMap<String, ParamSpec>,
    options: BTreeMap<String, OptionSpec>,
}

impl SpecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter spec, replacing any previous one of that name.
    pub fn insert_param(&mut self, name: impl Into<String>, spec: ParamSpec) {
        self.params.insert(name.into(), spec);
    }

    /// Registers an option spec, replacing any previous one of that name.
    pub fn insert_option(&mut self, name: impl Into<String>, spec: OptionSpec) {
        self.options.insert(name.into(), spec);
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &OptionSpec)> {
        self.options.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.options.is_empty()
    }
}

/// A chain of [`SpecSet`]s, innermost first.
///
/// Scopes live on the stack of the traversal: each route pushes its own set
/// on top of its parent's scope, and each command pushes its set on top of
/// its route's. Lookups return the innermost registration.
#[derive(Clone, Copy)]
pub struct SpecScope<'a> {
    specs: &'a SpecSet,
    parent: Option<&'a SpecScope<'a>>,
}

impl<'a> SpecScope<'a> {
    /// A scope with a single spec set and no parent.
    pub fn new(specs: &'a SpecSet) -> Self {
        Self {
            specs,
            parent: None,
        }
    }

    /// A scope with `specs` layered on top of `self`.
    pub fn child<'b>(&'b self, specs: &'b SpecSet) -> SpecScope<'b> {
        SpecScope {
            specs,
            parent: Some(self),
        }
    }

    /// Spec sets from innermost to outermost.
    pub fn sets(&self) -> impl Iterator<Item = &'a SpecSet> {
        std::iter::successors(Some(*self), |scope| scope.parent.copied())
            .map(|scope| scope.specs)
    }

    pub fn param(&self, name: &str) -> Option<&'a ParamSpec> {
        self.sets().find_map(|set| set.param(name))
    }

    pub fn option(&self, name: &str) -> Option<&'a OptionSpec> {
        self.sets().find_map(|set| set.option(name))
    }

    /// Returns true if `value` may bind to the parameter `name`.
    ///
    /// Parameters without a registered spec accept any value.
    pub fn accepts_param(&self, name: &str, value: &str) -> bool {
        self.param(name).map_or(true, |spec| spec.accepts(value))
    }

    /// Builds the alias table for every option visible from this scope.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::new();
        for set in self.sets() {
            for (name, spec) in set.options() {
                table.insert(name, spec.aliases());
            }
        }
        table
    }
}

impl fmt::Debug for SpecScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecScope")
            .field("depth", &self.sets().count())
            .finish()
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
