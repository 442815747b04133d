//! Option resolution.
//!
//! On the command line, the first argument starting with `-` switches the
//! rest of the arguments into option mode for the current route:
//!
//! ```text
//! fruit banana eat --whole -n 3
//! └──positional──┘ └──flag suffix─┘
//! ```
//!
//! The positional prefix is what patterns are matched against. The flag
//! suffix is handed to a [`FlagParser`] together with an [`AliasTable`] built
//! from the registered [`OptionSpec`](crate::OptionSpec)s. Positional values
//! that the parser finds inside the suffix are discarded.

use std::collections::{BTreeMap, BTreeSet};

use clap::{value_parser, Arg, ArgAction};
use serde_json::Value;

use crate::error::FlagError;
use crate::matcher::Options;
use crate::validate::SpecScope;

/// Maps every spelling of an option to its canonical name.
///
/// The first registration of a spelling wins; later conflicting names or
/// aliases are ignored so that scopes can shadow their parents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    options: BTreeMap<String, Vec<String>>,
    spellings: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with its aliases.
    pub fn insert<S: AsRef<str>>(&mut self, name: &str, aliases: &[S]) {
        if name.is_empty() || self.spellings.contains_key(name) {
            return;
        }
        self.spellings.insert(name.to_string(), name.to_string());

        let mut kept = Vec::new();
        for alias in aliases {
            let alias = alias.as_ref();
            if alias.is_empty() || self.spellings.contains_key(alias) {
                continue;
            }
            self.spellings.insert(alias.to_string(), name.to_string());
            kept.push(alias.to_string());
        }
        self.options.insert(name.to_string(), kept);
    }

    /// Returns the canonical name for a spelling.
    pub fn canonical(&self, spelling: &str) -> Option<&str> {
        self.spellings.get(spelling).map(String::as_str)
    }

    /// Canonical names with their aliases.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.options
            .iter()
            .map(|(name, aliases)| (name.as_str(), aliases.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Turns a flag suffix into named option values.
///
/// Implementations receive only the flag suffix (it always starts with a
/// dash-prefixed token) and must key the result by canonical option name
/// for any spelling found in `aliases`. Unknown flags are keyed by the name
/// they were spelled with.
pub trait FlagParser {
    fn parse(&self, tokens: &[String], aliases: &AliasTable) -> Result<Options, FlagError>;
}

/// Marks a flag given without a value. Command-line arguments cannot
/// contain NUL, so this never collides with real input.
const BARE_FLAG: &str = "\0";

const REMAINDER: &str = "\0remainder";

/// The default [`FlagParser`], backed by clap.
///
/// Each call builds a throwaway `clap::Command` describing the registered
/// options plus any unknown flag found in the tokens, so parsing never fails
/// on an unexpected flag.
///
/// Every option takes zero or one value:
///
/// | Input            | Value                 |
/// |------------------|-----------------------|
/// | `--test`         | `true`                |
/// | `--test hello`   | `"hello"`             |
/// | `--test=hello`   | `"hello"`             |
/// | `-t hello`       | `"hello"` (via alias) |
/// | `-t a -t b`      | `["a", "b"]`          |
#[derive(Debug, Clone, Copy, Default)]
pub struct ClapFlagParser;

impl FlagParser for ClapFlagParser {
    fn parse(&self, tokens: &[String], aliases: &AliasTable) -> Result<Options, FlagError> {
        let mut command = clap::Command::new("flags")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(REMAINDER)
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .allow_negative_numbers(true)
                    .value_parser(value_parser!(String)),
            );

        let mut ids = Vec::new();
        let mut longs = BTreeSet::new();
        let mut shorts = BTreeSet::new();

        for (name, name_aliases) in aliases.iter() {
            let mut arg = option_arg(name).long(name.to_string());
            longs.insert(name.to_string());
            if let Some(short) = single_char(name) {
                arg = arg.short(short);
                shorts.insert(short);
            }
            for alias in name_aliases {
                match single_char(alias) {
                    Some(short) if !shorts.contains(&short) => {
                        arg = arg.short_alias(short);
                        shorts.insert(short);
                    }
                    Some(_) => {}
                    None => {
                        if longs.insert(alias.clone()) {
                            arg = arg.alias(alias.clone());
                        }
                    }
                }
            }
            command = command.arg(arg);
            ids.push(name.to_string());
        }

        for (name, flag) in unknown_flags(tokens, &longs, &shorts) {
            let mut arg = option_arg(&name);
            if flag.long {
                arg = arg.long(name.clone());
            }
            if let Some(short) = flag.short {
                arg = arg.short(short);
            }
            command = command.arg(arg);
            ids.push(name);
        }

        let matches = command.try_get_matches_from(tokens)?;

        let mut options = Options::new();
        for id in ids {
            let Some(values) = matches.get_many::<String>(&id) else {
                continue;
            };
            let mut values: Vec<Value> = values.map(|raw| flag_value(raw.as_str())).collect();
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            options.insert(id, value);
        }
        Ok(options)
    }
}

fn option_arg(id: &str) -> Arg {
    Arg::new(id.to_string())
        .num_args(0..=1)
        .default_missing_value(BARE_FLAG)
        .action(ArgAction::Append)
        .allow_negative_numbers(true)
        .value_parser(value_parser!(String))
}

fn flag_value(raw: &str) -> Value {
    if raw == BARE_FLAG {
        Value::Bool(true)
    } else {
        Value::String(raw.to_string())
    }
}

fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct UnknownFlag {
    long: bool,
    short: Option<char>,
}

/// Flags in `tokens` that no registered option claims, keyed by the name
/// they will be reported under.
fn unknown_flags(
    tokens: &[String],
    longs: &BTreeSet<String>,
    shorts: &BTreeSet<char>,
) -> BTreeMap<String, UnknownFlag> {
    let mut unknown: BTreeMap<String, UnknownFlag> = BTreeMap::new();

    for token in tokens {
        if token == "--" {
            break;
        }
        if let Some(long) = token.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or_default();
            if name.is_empty() || name.starts_with('-') || longs.contains(name) {
                continue;
            }
            unknown.entry(name.to_string()).or_default().long = true;
        } else if let Some(cluster) = token.strip_prefix('-') {
            if cluster.parse::<f64>().is_ok() {
                continue;
            }
            // Only the first character is certainly a flag; the rest may be
            // an attached value.
            let Some(short) = cluster.chars().next() else {
                continue;
            };
            if !short.is_alphanumeric() || shorts.contains(&short) {
                continue;
            }
            unknown.entry(short.to_string()).or_default().short = Some(short);
        }
    }

    unknown
}

/// Splits arguments into the positional prefix and the flag suffix.
pub fn split_flags<S: AsRef<str>>(args: &[S]) -> (&[S], &[S]) {
    let at = args
        .iter()
        .position(|arg| arg.as_ref().starts_with('-'))
        .unwrap_or(args.len());
    args.split_at(at)
}

/// Resolves a flag suffix with the aliases visible from `scope`.
pub fn resolve_options(
    flags: &[String],
    scope: &SpecScope<'_>,
    parser: &dyn FlagParser,
) -> Result<Options, FlagError> {
    if flags.is_empty() {
        return Ok(Options::new());
    }
    parser.parse(flags, &scope.alias_table())
}

/// Returns true if every resolved option passes its validator, if any.
pub fn options_accepted(options: &Options, scope: &SpecScope<'_>) -> bool {
    options.iter().all(|(name, value)| {
        scope
            .option(name)
            .map_or(true, |spec| spec.accepts(value))
    })
}
