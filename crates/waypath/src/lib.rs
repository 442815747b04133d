//! Pattern-based command routing for hierarchical CLIs.
//!
//! `waypath` matches an argument vector against a tree of routes and
//! commands, binds parameter and flag values, and runs the registered
//! handlers in a fixed order with explicit completion.
//!
//! # Features
//!
//! - **Patterns**: literal words, `:name` parameters, `:[name]` optional
//!   parameters and a trailing `*` wildcard
//! - **Routes**: nested subtrees, eager or resolved on demand
//! - **Middleware**: per-route steps that run before anything is matched
//! - **Validation**: regex or predicate checks on parameters and options;
//!   a rejected value makes the candidate not match
//! - **Flags**: long, short and aliased options parsed with clap
//! - **Help**: a listing of every reachable command
//!
//! # Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use waypath::{from_fn, Cli, MemoryLogger, Outcome};
//! use std::rc::Rc;
//!
//! let logger = MemoryLogger::new();
//! let mut cli: Cli = Cli::new("food");
//! cli.logger(Rc::new(logger.clone()));
//!
//! let fruit = cli.route("fruit :kind").unwrap();
//! fruit
//!     .command("peel", from_fn(|input, output| {
//!         output.emit(format!("peeled {}!", input.param("kind").unwrap_or("?")));
//!         Ok(())
//!     }))
//!     .unwrap();
//! cli.default_command(from_fn(|_, output| {
//!     output.emit("default handler");
//!     Ok(())
//! }));
//!
//! assert_eq!(block_on(cli.dispatch(["fruit", "banana", "peel"], ())).unwrap(), Outcome::Handled);
//! assert_eq!(block_on(cli.dispatch(["fruit", "banana", "eat"], ())).unwrap(), Outcome::Handled);
//! assert_eq!(logger.lines(), vec!["peeled banana!", "default handler"]);
//! ```
//!
//! # Threading
//!
//! The tree holds handlers behind `Rc` and is meant to be built once and
//! then dispatched against from a single thread. Several dispatches may be
//! in flight at the same time on that thread; they share nothing but the
//! tree, which dispatch never mutates.

mod cli;
mod error;
mod handler;
mod help;
mod lazy;
mod matcher;
mod options;
mod output;
mod pattern;
mod route;
mod runner;
mod validate;

pub use cli::{Cli, CliOptions, Outcome};

pub use error::{BoxError, DispatchError, FlagError, PatternError};

pub use handler::{from_fn, CommandInput, Handler, StepFuture};

pub use help::{render_help, EntryKind, HelpEntry};

pub use lazy::{ResolveFuture, RouteModule, RouteResolver};

pub use matcher::{eval_path, MatchResult, MatchSettings, Options, Params};

pub use options::{
    options_accepted, resolve_options, split_flags, AliasTable, ClapFlagParser, FlagParser,
};

pub use output::{CommandOutput, Logger, MemoryLogger, StdoutLogger};

pub use pattern::{tokenize, Pattern, Token, TokenKind, WILDCARD};

pub use route::{Command, Route};

pub use runner::{run_chain, Progress, SharedHandler};

pub use validate::{OptionSpec, ParamSpec, SpecScope, SpecSet};
