//! Lazily resolved subtrees.
//!
//! A lazy route is registered with a pattern and a [`RouteResolver`]. The
//! resolver runs only when dispatch reaches the binding and the pattern
//! matches; its subtree is used for that dispatch and dropped afterwards.
//! Nothing is cached between dispatches.
//!
//! ```rust
//! use waypath::{from_fn, Cli, Route, RouteModule};
//!
//! let mut cli: Cli = Cli::new("droplit");
//! cli.lazy_route("ecosystem", || async {
//!     let mut route: Route = Route::new();
//!     route.command("info", from_fn(|_, output| {
//!         output.emit("ecosystem info");
//!         Ok(())
//!     }))?;
//!     Ok::<_, anyhow::Error>(RouteModule::new(route))
//! })
//! .unwrap();
//! ```

use std::fmt;
use std::future::Future;

use futures::future::LocalBoxFuture;

use crate::error::DispatchError;
use crate::pattern::Pattern;
use crate::route::Route;

/// What a resolver yields: an object that should expose a `route`.
///
/// A module without a route is reported as
/// [`DispatchError::MissingRoute`].
pub struct RouteModule<C = ()> {
    pub route: Option<Route<C>>,
}

impl<C> RouteModule<C> {
    pub fn new(route: Route<C>) -> Self {
        Self { route: Some(route) }
    }

    /// A module that exports nothing.
    pub fn empty() -> Self {
        Self { route: None }
    }
}

impl<C> fmt::Debug for RouteModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteModule")
            .field("has_route", &self.route.is_some())
            .finish()
    }
}

/// The future returned by [`RouteResolver::resolve`].
pub type ResolveFuture<C> = LocalBoxFuture<'static, anyhow::Result<RouteModule<C>>>;

/// Produces a subtree on demand.
pub trait RouteResolver<C> {
    fn resolve(&self) -> ResolveFuture<C>;
}

impl<C, F, Fut> RouteResolver<C> for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<RouteModule<C>>> + 'static,
{
    fn resolve(&self) -> ResolveFuture<C> {
        Box::pin(self())
    }
}

/// Runs `resolver` and unwraps the exported route.
pub(crate) async fn resolve_route<C>(
    pattern: &Pattern,
    resolver: &dyn RouteResolver<C>,
) -> Result<Route<C>, DispatchError> {
    tracing::debug!(%pattern, "resolving lazy route");
    let module = resolver
        .resolve()
        .await
        .map_err(|source| DispatchError::LazyResolution {
            pattern: pattern.to_string(),
            source: source.into(),
        })?;
    module.route.ok_or_else(|| DispatchError::MissingRoute {
        pattern: pattern.to_string(),
    })
}
