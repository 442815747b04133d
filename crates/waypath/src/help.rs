//! Help and introspection.
//!
//! Walks the registered tree and lists what can be invoked. Lazy routes are
//! listed by their pattern only; listing never resolves them.

use std::fmt;

use crate::cli::Cli;
use crate::pattern::{Pattern, TokenKind};
use crate::route::{Child, Route};
use crate::validate::SpecScope;

/// What a help entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Command,
    Route,
    LazyRoute,
    Default,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Command => "command",
            EntryKind::Route => "route",
            EntryKind::LazyRoute => "lazy route",
            EntryKind::Default => "default",
        };
        f.write_str(label)
    }
}

/// One line of help: a full path from the root and its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub kind: EntryKind,
    pub path: String,
    pub description: Option<String>,
}

impl<C> Route<C> {
    /// Lists every command and route reachable without resolving lazy routes.
    ///
    /// Entries come in dispatch order: commands, then routes (each followed
    /// by its own subtree), then the default command. Parameters with a
    /// friendly name are shown as `<name>`, or `[name]` when optional.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        let mut entries = Vec::new();
        self.collect_help("", None, &mut entries);
        entries
    }

    fn collect_help(&self, prefix: &str, parent: Option<&SpecScope<'_>>, entries: &mut Vec<HelpEntry>) {
        let scope = match parent {
            Some(parent) => parent.child(&self.specs),
            None => SpecScope::new(&self.specs),
        };

        for command in &self.commands {
            let command_scope = scope.child(&command.specs);
            entries.push(HelpEntry {
                kind: EntryKind::Command,
                path: join(prefix, &display_pattern(&command.pattern, &command_scope)),
                description: command.description.clone(),
            });
        }

        for binding in &self.routes {
            let path = join(prefix, &display_pattern(&binding.pattern, &scope));
            match &binding.child {
                Child::Eager(route) => {
                    entries.push(HelpEntry {
                        kind: EntryKind::Route,
                        path: path.clone(),
                        description: route.description.clone(),
                    });
                    route.collect_help(&path, Some(&scope), entries);
                }
                Child::Lazy(_) => entries.push(HelpEntry {
                    kind: EntryKind::LazyRoute,
                    path,
                    description: None,
                }),
            }
        }

        if let Some(default) = &self.default {
            entries.push(HelpEntry {
                kind: EntryKind::Default,
                path: join(prefix, "*"),
                description: default.description.clone(),
            });
        }
    }
}

fn display_pattern(pattern: &Pattern, scope: &SpecScope<'_>) -> String {
    let words: Vec<String> = pattern
        .tokens()
        .iter()
        .map(|token| {
            let friendly = scope
                .param(&token.name)
                .and_then(|spec| spec.get_friendly_name());
            match (token.kind, friendly) {
                (TokenKind::Parameter, Some(name)) => format!("<{name}>"),
                (TokenKind::OptionalParameter, Some(name)) => format!("[{name}]"),
                _ => token.to_string(),
            }
        })
        .collect();
    words.join(" ")
}

fn join(prefix: &str, pattern: &str) -> String {
    match (prefix.is_empty(), pattern.is_empty()) {
        (true, _) => pattern.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix} {pattern}"),
    }
}

/// Renders entries as aligned `path  description` lines.
///
/// ```rust
/// use waypath::{render_help, EntryKind, HelpEntry};
///
/// let entries = vec![
///     HelpEntry { kind: EntryKind::Command, path: "hello".into(), description: Some("Says hi".into()) },
///     HelpEntry { kind: EntryKind::Route, path: "fruit banana".into(), description: None },
/// ];
/// assert_eq!(render_help(&entries), "  hello         Says hi\n  fruit banana\n");
/// ```
pub fn render_help(entries: &[HelpEntry]) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.path.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in entries {
        match &entry.description {
            Some(description) => {
                out.push_str(&format!("  {:<width$}  {}\n", entry.path, description));
            }
            None => {
                out.push_str(&format!("  {}\n", entry.path));
            }
        }
    }
    out
}

impl<C> Cli<C> {
    /// The full help text: the CLI name, the root description and every entry.
    pub fn help(&self) -> String {
        let mut out = format!("Usage: {} <command>\n", self.name());
        if let Some(description) = self.description() {
            out.push('\n');
            out.push_str(description);
            out.push('\n');
        }
        let entries = self.help_entries();
        if !entries.is_empty() {
            out.push_str("\nCommands:\n");
            out.push_str(&render_help(&entries));
        }
        out
    }
}
