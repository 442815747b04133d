//! The top-level entry point.
//!
//! [`Cli`] owns the root [`Route`] and everything a dispatch needs besides
//! the tree: where output goes, how flags are parsed and how literals
//! compare. It dereferences to its root route, so registration reads the
//! same at every level:
//!
//! ```rust
//! use futures::executor::block_on;
//! use waypath::{from_fn, Cli, MemoryLogger, Outcome};
//! use std::rc::Rc;
//!
//! let logger = MemoryLogger::new();
//! let mut cli: Cli = Cli::new("food");
//! cli.logger(Rc::new(logger.clone()));
//! cli.command("hello", from_fn(|_, output| {
//!     output.emit("world");
//!     Ok(())
//! }))
//! .unwrap();
//!
//! let outcome = block_on(cli.dispatch(["hello"], ())).unwrap();
//! assert_eq!(outcome, Outcome::Handled);
//! assert_eq!(logger.lines(), vec!["world"]);
//! ```

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::handler::CommandInput;
use crate::matcher::MatchSettings;
use crate::options::{ClapFlagParser, FlagParser};
use crate::output::{CommandOutput, Logger, StdoutLogger};
use crate::route::{DispatchEnv, Route, Visit};

/// Behavior switches for a [`Cli`].
///
/// Deserializable so it can sit inside an application's own config file.
/// Unknown keys are rejected.
///
/// ```rust
/// use waypath::CliOptions;
///
/// let options: CliOptions = serde_json::from_str(r#"{ "case_sensitive": false }"#).unwrap();
/// assert!(!options.case_sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliOptions {
    /// Compare literal pattern words case-sensitively. Defaults to `true`.
    pub case_sensitive: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

/// How a dispatch ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A command or default handler chain ran to its end.
    Handled,
    /// A middleware or handler completed the dispatch explicitly.
    Completed,
    /// Nothing matched anywhere on the traversed path.
    Unhandled,
}

/// A command-line interface: a root route plus dispatch settings.
pub struct Cli<C = ()> {
    name: String,
    options: CliOptions,
    root: Route<C>,
    logger: Rc<dyn Logger>,
    flag_parser: Rc<dyn FlagParser>,
}

impl<C> Cli<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, CliOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: CliOptions) -> Self {
        Self {
            name: name.into(),
            options,
            root: Route::new(),
            logger: Rc::new(StdoutLogger),
            flag_parser: Rc::new(ClapFlagParser),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &CliOptions {
        &self.options
    }

    /// Replaces the sink that [`CommandOutput::emit`] writes to.
    pub fn logger(&mut self, logger: Rc<dyn Logger>) -> &mut Self {
        self.logger = logger;
        self
    }

    /// Replaces the flag tokenizer.
    pub fn flag_parser(&mut self, parser: Rc<dyn FlagParser>) -> &mut Self {
        self.flag_parser = parser;
        self
    }

    pub fn root(&self) -> &Route<C> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Route<C> {
        &mut self.root
    }
}

impl<C: Clone + 'static> Cli<C> {
    /// Dispatches one argument vector, without the binary name.
    ///
    /// Resolves once the matched handler chain has finished, the dispatch
    /// was completed, or nothing matched. A handler error, an error passed
    /// to [`CommandOutput::complete`] and a failed lazy route come back as
    /// `Err`.
    pub async fn dispatch<I, S>(&self, args: I, context: C) -> Result<Outcome, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        tracing::debug!(cli = %self.name, ?args, "dispatching");

        let output = CommandOutput::new(self.logger.clone());
        let env = DispatchEnv {
            flags: self.flag_parser.as_ref(),
            settings: MatchSettings {
                case_sensitive: self.options.case_sensitive,
            },
        };
        let input = CommandInput::new(Vec::new(), context);
        let visit = self.root.visit(&args, input, None, &output, &env).await;

        if let Some(error) = output.take_error() {
            tracing::debug!(%error, "dispatch failed");
            return Err(error);
        }
        let outcome = match visit {
            Visit::Unmatched => Outcome::Unhandled,
            Visit::Claimed if output.is_completed() => Outcome::Completed,
            Visit::Claimed => Outcome::Handled,
        };
        tracing::debug!(?outcome, "dispatch finished");
        Ok(outcome)
    }

    /// Dispatches a full argv, skipping the binary name.
    pub async fn run_from<I, S>(&self, argv: I, context: C) -> Result<Outcome, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch(argv.into_iter().skip(1), context).await
    }
}

impl<C: Clone + Default + 'static> Cli<C> {
    /// Dispatches the process arguments with a default context.
    pub async fn run(&self) -> Result<Outcome, DispatchError> {
        self.run_from(std::env::args(), C::default()).await
    }
}

impl<C> Deref for Cli<C> {
    type Target = Route<C>;

    fn deref(&self) -> &Route<C> {
        &self.root
    }
}

impl<C> DerefMut for Cli<C> {
    fn deref_mut(&mut self) -> &mut Route<C> {
        &mut self.root
    }
}

impl<C> std::fmt::Debug for Cli<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;
    use crate::lazy::RouteModule;
    use crate::output::MemoryLogger;
    use futures::executor::block_on;

    fn cli() -> (Cli, MemoryLogger) {
        let logger = MemoryLogger::new();
        let mut cli: Cli = Cli::new("test");
        cli.logger(Rc::new(logger.clone()));
        (cli, logger)
    }

    #[test]
    fn test_options_default_is_case_sensitive() {
        assert!(CliOptions::default().case_sensitive);
        let parsed: CliOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, CliOptions::default());
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let result = serde_json::from_str::<CliOptions>(r#"{ "case_sensitive": true, "color": true }"#);
        let error = result.unwrap_err().to_string();
        assert!(error.contains("unknown field `color`"), "{error}");
    }

    #[test]
    fn test_unmatched_input_is_unhandled() {
        let (cli, logger) = cli();
        assert_eq!(block_on(cli.dispatch(["nothing"], ())).unwrap(), Outcome::Unhandled);
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn test_explicit_completion_outcome() {
        let (mut cli, _) = cli();
        cli.command("stop", from_fn(|_: &mut CommandInput, output: &CommandOutput| {
            output.complete(None);
            Ok(())
        }))
        .unwrap();
        assert_eq!(block_on(cli.dispatch(["stop"], ())).unwrap(), Outcome::Completed);
    }

    #[test]
    fn test_handler_error_is_returned() {
        let (mut cli, _) = cli();
        cli.command("fail", from_fn(|_: &mut CommandInput, _: &CommandOutput| {
            Err(anyhow::anyhow!("no bananas"))
        }))
        .unwrap();
        let error = block_on(cli.dispatch(["fail"], ())).unwrap_err();
        assert_eq!(error.to_string(), "handler failed: no bananas");
    }

    #[test]
    fn test_run_from_skips_binary_name() {
        let (mut cli, logger) = cli();
        cli.command("hello", from_fn(|_: &mut CommandInput, output: &CommandOutput| {
            output.emit("world");
            Ok(())
        }))
        .unwrap();
        let outcome = block_on(cli.run_from(["food", "hello"], ())).unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(logger.lines(), vec!["world"]);
    }

    #[test]
    fn test_case_insensitive_option() {
        let logger = MemoryLogger::new();
        let mut cli: Cli = Cli::with_options("test", CliOptions { case_sensitive: false });
        cli.logger(Rc::new(logger.clone()));
        cli.command("Hello", from_fn(|_: &mut CommandInput, output: &CommandOutput| {
            output.emit("hi");
            Ok(())
        }))
        .unwrap();
        assert_eq!(block_on(cli.dispatch(["HELLO"], ())).unwrap(), Outcome::Handled);
        assert_eq!(logger.lines(), vec!["hi"]);
    }

    #[test]
    fn test_lazy_route_without_route_fails_dispatch() {
        let (mut cli, logger) = cli();
        cli.lazy_route("foo", || async { Ok::<_, anyhow::Error>(RouteModule::<()>::empty()) })
            .unwrap();
        cli.default_command(from_fn(|_: &mut CommandInput, output: &CommandOutput| {
            output.emit("default");
            Ok(())
        }));

        let error = block_on(cli.dispatch(["foo"], ())).unwrap_err();
        assert!(matches!(error, DispatchError::MissingRoute { .. }));
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn test_context_reaches_handlers() {
        let logger = MemoryLogger::new();
        let mut cli: Cli<String> = Cli::new("test");
        cli.logger(Rc::new(logger.clone()));
        cli.command("whoami", from_fn(|input: &mut CommandInput<String>, output: &CommandOutput| {
            output.emit(&input.context);
            Ok(())
        }))
        .unwrap();
        block_on(cli.dispatch(["whoami"], "alice".to_string())).unwrap();
        assert_eq!(logger.lines(), vec!["alice"]);
    }
}
