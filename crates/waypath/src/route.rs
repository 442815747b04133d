//! Routes, commands and the dispatch traversal.
//!
//! A [`Route`] is a node of the command tree. It owns, in registration
//! order:
//!
//! - middleware, run on every dispatch that reaches the node
//! - commands, matched against all remaining positional arguments
//! - child routes, matched against a prefix of them, eager or lazy
//! - an optional default command, run when nothing else matched
//!
//! ```rust
//! use waypath::{from_fn, Cli, OptionSpec};
//!
//! let mut cli: Cli = Cli::new("food");
//! let fruit = cli.route("fruit").unwrap();
//! fruit
//!     .command("banana eat", from_fn(|input, output| {
//!         let how = if input.flag("whole") { "whole" } else { "in pieces" };
//!         output.emit(format!("eating {how}"));
//!         Ok(())
//!     }))
//!     .unwrap()
//!     .option("whole", OptionSpec::new().alias("w"));
//! ```
//!
//! # Traversal
//!
//! At each node the remaining arguments are split into positionals and
//! flags. The flags are resolved against every option spec in scope, then
//! middleware runs. Flags travel down the tree unchanged, so each level
//! re-resolves them with more aliases known and its result replaces the
//! options seen so far.
//! Commands are tried first, in declaration order; the first one that
//! matches runs its handler chain and ends the search. Child routes come
//! next: a route whose pattern matches the leading positionals receives the
//! rest, and if nothing in its subtree claims the input the next sibling is
//! tried. The default command runs last. A node where nothing matched
//! reports back to its parent, which carries on with its own candidates.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::PatternError;
use crate::handler::{CommandInput, Handler, StepFuture};
use crate::lazy::{resolve_route, RouteResolver};
use crate::matcher::{eval_path, MatchSettings};
use crate::options::{options_accepted, resolve_options, split_flags, FlagParser};
use crate::output::CommandOutput;
use crate::pattern::Pattern;
use crate::runner::{run_chain, Progress, SharedHandler};
use crate::validate::{OptionSpec, ParamSpec, SpecScope, SpecSet};

/// A node of the command tree.
pub struct Route<C = ()> {
    pub(crate) specs: SpecSet,
    pub(crate) middleware: Vec<SharedHandler<C>>,
    pub(crate) commands: Vec<Command<C>>,
    pub(crate) routes: Vec<RouteBinding<C>>,
    pub(crate) default: Option<Command<C>>,
    pub(crate) description: Option<String>,
}

/// A child route together with the pattern it is mounted under.
pub(crate) struct RouteBinding<C> {
    pub(crate) pattern: Pattern,
    pub(crate) child: Child<C>,
}

pub(crate) enum Child<C> {
    Eager(Route<C>),
    Lazy(Rc<dyn RouteResolver<C>>),
}

impl<C> Default for Route<C> {
    fn default() -> Self {
        Self {
            specs: SpecSet::new(),
            middleware: Vec::new(),
            commands: Vec::new(),
            routes: Vec::new(),
            default: None,
            description: None,
        }
    }
}

impl<C> Route<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware step.
    ///
    /// Middleware runs before any command or child route of this node is
    /// tried, in registration order. A middleware that fails or completes
    /// the dispatch ends the traversal.
    pub fn middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a> + 'static,
    {
        self.middleware.push(Rc::new(handler));
        self
    }

    /// Registers a command.
    ///
    /// The pattern `*` installs the default command instead. More handlers
    /// can be chained on the returned [`Command`] with [`Command::then`].
    pub fn command<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Command<C>, PatternError>
    where
        F: for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a> + 'static,
    {
        let pattern = Pattern::parse(pattern)?;
        if pattern.is_wildcard() {
            return Ok(self.default_command(handler));
        }
        tracing::trace!(%pattern, "registering command");
        self.commands.push(Command::new(pattern, Rc::new(handler)));
        let index = self.commands.len() - 1;
        Ok(&mut self.commands[index])
    }

    /// Installs the default command, replacing any previous one.
    pub fn default_command<F>(&mut self, handler: F) -> &mut Command<C>
    where
        F: for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a> + 'static,
    {
        self.default
            .insert(Command::new(Pattern::wildcard(), Rc::new(handler)))
    }

    /// Appends a new empty child route and returns it.
    pub fn route(&mut self, pattern: &str) -> Result<&mut Route<C>, PatternError> {
        self.mount(pattern, Route::new())
    }

    /// Appends an existing route as a child.
    pub fn mount(&mut self, pattern: &str, route: Route<C>) -> Result<&mut Route<C>, PatternError> {
        let pattern = Pattern::parse(pattern)?;
        tracing::trace!(%pattern, "mounting route");
        self.routes.push(RouteBinding {
            pattern,
            child: Child::Eager(route),
        });
        match self.routes.last_mut().map(|binding| &mut binding.child) {
            Some(Child::Eager(route)) => Ok(route),
            _ => unreachable!("an eager binding was just pushed"),
        }
    }

    /// Appends a child route whose subtree is produced on demand.
    pub fn lazy_route<R>(&mut self, pattern: &str, resolver: R) -> Result<&mut Self, PatternError>
    where
        R: RouteResolver<C> + 'static,
    {
        let pattern = Pattern::parse(pattern)?;
        tracing::trace!(%pattern, "registering lazy route");
        self.routes.push(RouteBinding {
            pattern,
            child: Child::Lazy(Rc::new(resolver)),
        });
        Ok(self)
    }

    /// Registers a parameter spec visible to this node and its subtree.
    pub fn param(&mut self, name: impl Into<String>, spec: ParamSpec) -> &mut Self {
        self.specs.insert_param(name, spec);
        self
    }

    /// Registers an option spec visible to this node and its subtree.
    pub fn option(&mut self, name: impl Into<String>, spec: OptionSpec) -> &mut Self {
        self.specs.insert_option(name, spec);
        self
    }

    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn specs(&self) -> &SpecSet {
        &self.specs
    }

    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    pub fn default_handler(&self) -> Option<&Command<C>> {
        self.default.as_ref()
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .map(|binding| match binding.child {
                Child::Eager(_) => binding.pattern.to_string(),
                Child::Lazy(_) => format!("{} (lazy)", binding.pattern),
            })
            .collect();
        f.debug_struct("Route")
            .field("middleware", &self.middleware.len())
            .field("commands", &self.commands)
            .field("routes", &routes)
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// A command: a pattern and the handler chain it runs.
pub struct Command<C = ()> {
    pub(crate) pattern: Pattern,
    pub(crate) handlers: Vec<SharedHandler<C>>,
    pub(crate) specs: SpecSet,
    pub(crate) description: Option<String>,
}

impl<C> Command<C> {
    fn new(pattern: Pattern, first: SharedHandler<C>) -> Self {
        Self {
            pattern,
            handlers: vec![first],
            specs: SpecSet::new(),
            description: None,
        }
    }

    /// Appends a handler to the chain.
    pub fn then<F>(&mut self, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut CommandInput<C>, &'a CommandOutput) -> StepFuture<'a> + 'static,
    {
        self.handlers.push(Rc::new(handler));
        self
    }

    /// Appends any [`Handler`] implementation to the chain.
    pub fn handler<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<C> + 'static,
    {
        self.handlers.push(Rc::new(handler));
        self
    }

    pub fn param(&mut self, name: impl Into<String>, spec: ParamSpec) -> &mut Self {
        self.specs.insert_param(name, spec);
        self
    }

    pub fn option(&mut self, name: impl Into<String>, spec: OptionSpec) -> &mut Self {
        self.specs.insert_option(name, spec);
        self
    }

    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn specs(&self) -> &SpecSet {
        &self.specs
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern.to_string())
            .field("handlers", &self.handlers.len())
            .field("description", &self.description)
            .finish()
    }
}

/// Settings shared by every node of one dispatch.
pub(crate) struct DispatchEnv<'e> {
    pub(crate) flags: &'e dyn FlagParser,
    pub(crate) settings: MatchSettings,
}

/// What a subtree did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Nothing in the subtree matched.
    Unmatched,
    /// A handler chain ran, or the dispatch was completed.
    Claimed,
}

impl<C: Clone + 'static> Route<C> {
    /// Dispatches `args` through this node and its subtree.
    ///
    /// `parent` is the spec scope of the enclosing node, if any.
    pub(crate) fn visit<'a>(
        &'a self,
        args: &'a [String],
        mut input: CommandInput<C>,
        parent: Option<&'a SpecScope<'a>>,
        output: &'a CommandOutput,
        env: &'a DispatchEnv<'a>,
    ) -> LocalBoxFuture<'a, Visit> {
        Box::pin(async move {
            let (positional, flags) = split_flags(args);
            let scope = match parent {
                Some(parent) => parent.child(&self.specs),
                None => SpecScope::new(&self.specs),
            };

            match resolve_options(flags, &scope, env.flags) {
                Ok(options) => input.options = options,
                Err(error) => tracing::warn!(%error, "ignoring unparsable flags at route level"),
            }
            input.path = positional.to_vec();

            if run_chain(&self.middleware, &mut input, output).await == Progress::Stopped {
                return Visit::Claimed;
            }

            for command in &self.commands {
                if let Some(command_input) = command.accept(positional, flags, &input, &scope, env) {
                    tracing::debug!(pattern = %command.pattern, "command matched");
                    return command.run(command_input, output).await;
                }
            }

            for binding in &self.routes {
                let prefix = &positional[..binding.pattern.len().min(positional.len())];
                let result = eval_path(prefix, &binding.pattern, &scope, env.settings);
                if !result.matched {
                    continue;
                }
                tracing::debug!(pattern = %binding.pattern, "route matched");

                let mut child_args: Vec<String> = positional[result.consumed..].to_vec();
                child_args.extend(flags.iter().cloned());
                let mut child_input = input.clone();
                child_input.merge_params(result.params);

                let visit = match &binding.child {
                    Child::Eager(route) => {
                        route
                            .visit(&child_args, child_input, Some(&scope), output, env)
                            .await
                    }
                    Child::Lazy(resolver) => {
                        match resolve_route(&binding.pattern, resolver.as_ref()).await {
                            Ok(route) => {
                                route
                                    .visit(&child_args, child_input, Some(&scope), output, env)
                                    .await
                            }
                            Err(error) => {
                                tracing::debug!(%error, "lazy route failed");
                                output.fail(error);
                                return Visit::Claimed;
                            }
                        }
                    }
                };
                if visit == Visit::Claimed {
                    return visit;
                }
                tracing::trace!(pattern = %binding.pattern, "route subtree unmatched");
            }

            if let Some(default) = &self.default {
                if let Some(default_input) = default.accept(positional, flags, &input, &scope, env) {
                    tracing::debug!("default command matched");
                    return default.run(default_input, output).await;
                }
            }

            Visit::Unmatched
        })
    }
}

impl<C: Clone + 'static> Command<C> {
    /// Matches the command and builds its input, or returns `None`.
    fn accept(
        &self,
        positional: &[String],
        flags: &[String],
        input: &CommandInput<C>,
        scope: &SpecScope<'_>,
        env: &DispatchEnv<'_>,
    ) -> Option<CommandInput<C>> {
        if self.handlers.is_empty() {
            return None;
        }
        let scope = scope.child(&self.specs);
        let result = eval_path(positional, &self.pattern, &scope, env.settings);
        if !result.matched {
            return None;
        }

        let mut input = input.clone();
        match resolve_options(flags, &scope, env.flags) {
            Ok(options) => input.options = options,
            Err(error) => tracing::debug!(pattern = %self.pattern, %error, "flags did not parse"),
        }
        if !options_accepted(&input.options, &scope) {
            tracing::debug!(pattern = %self.pattern, "option rejected by validator");
            return None;
        }

        input.merge_params(result.params);
        Some(input)
    }

    async fn run(&self, mut input: CommandInput<C>, output: &CommandOutput) -> Visit {
        run_chain(&self.handlers, &mut input, output).await;
        Visit::Claimed
    }
}
