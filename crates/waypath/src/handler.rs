//! Handler types.
//!
//! Middleware and command handlers share one shape: an async step that
//! receives the accumulated [`CommandInput`] and the dispatch's
//! [`CommandOutput`], and resolves to `anyhow::Result<()>`.
//!
//! # Writing handlers
//!
//! Any closure of the right shape is a [`Handler`]. The returned future may
//! borrow both arguments:
//!
//! ```rust
//! use waypath::Cli;
//!
//! let mut cli: Cli = Cli::new("food");
//! cli.command("hello :name", |input, output| {
//!     Box::pin(async move {
//!         output.emit(format!("hello {}", input.param("name").unwrap_or("stranger")));
//!         Ok(())
//!     })
//! })
//! .unwrap();
//! ```
//!
//! When no `.await` is needed, [`from_fn`] adapts a plain closure:
//!
//! ```rust
//! use waypath::{from_fn, Cli};
//!
//! let mut cli: Cli = Cli::new("food");
//! cli.command("hello", from_fn(|_input, output| {
//!     output.emit("world");
//!     Ok(())
//! }))
//! .unwrap();
//! ```
//!
//! # Flow
//!
//! A step that returns `Ok(())` lets the chain continue. A step that returns
//! `Err` ends the whole dispatch with that error. A step may also call
//! [`CommandOutput::complete`] to end the dispatch without running anything
//! else.

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::matcher::{Options, Params};
use crate::output::CommandOutput;

/// The future returned by a handler step.
pub type StepFuture<'a> = LocalBoxFuture<'a, anyhow::Result<()>>;

/// What a handler sees of the dispatch so far.
///
/// Inputs flow downward: each route adds the parameters it bound and each
/// command gets its own copy, so siblings never observe each other's
/// changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInput<C = ()> {
    /// Positional arguments remaining at this level.
    pub path: Vec<String>,
    /// Parameters bound along the matched path. Later bindings win.
    pub params: Params,
    /// Options resolved from the flag suffix. Recomputed at every level of
    /// the matched path.
    pub options: Options,
    /// Caller-provided context, passed through unchanged unless a
    /// middleware replaces it.
    pub context: C,
}

impl<C> CommandInput<C> {
    pub fn new(path: Vec<String>, context: C) -> Self {
        Self {
            path,
            params: Params::new(),
            options: Options::new(),
            context,
        }
    }

    /// Returns the value bound to parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns the resolved value of option `name`.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Returns true if option `name` is present and not explicitly `false`.
    pub fn flag(&self, name: &str) -> bool {
        !matches!(self.options.get(name), None | Some(Value::Bool(false)))
    }

    /// Shallow-merges `params` over the current ones.
    pub fn merge_params(&mut self, params: Params) {
        self.params.extend(params);
    }
}

/// A middleware or command step.
pub trait Handler<C> {
    fn handle<'a>(
        &'a self,
        input: &'a mut CommandInput<C>,
        output: &'a CommandOutput,
    ) -> StepFuture<'a>;
}

impl<C, F> Handler<C> for F
where
    F: for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a>,
{
    fn handle<'a>(
        &'a self,
        input: &'a mut CommandInput<C>,
        output: &'a CommandOutput,
    ) -> StepFuture<'a> {
        self(input, output)
    }
}

/// Adapts a synchronous closure into a handler.
pub fn from_fn<C, F>(
    f: F,
) -> impl for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a>
where
    F: Fn(&mut CommandInput<C>, &CommandOutput) -> anyhow::Result<()>,
{
    move |input, output| {
        let result = f(input, output);
        Box::pin(futures::future::ready(result))
    }
}
