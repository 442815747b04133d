//! Error types for waypath.

use thiserror::Error;

/// A boxed error as stored on the completion channel.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A malformed command or route pattern.
///
/// Raised by the registration call; a bad pattern never reaches dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A token starts with `-`, which is reserved for flags.
    #[error("pattern token '{token}' in '{pattern}' cannot start with a dash (-)")]
    LeadingDash { pattern: String, token: String },

    /// `*` appears before the end of the pattern.
    #[error("wildcard '*' must be the last token of pattern '{pattern}'")]
    WildcardNotLast { pattern: String },

    /// `:` or `:[]` without a name.
    #[error("parameter token '{token}' in '{pattern}' has no name")]
    EmptyParameterName { pattern: String, token: String },

    /// `:[name` without the closing bracket.
    #[error("optional parameter '{token}' in '{pattern}' is missing its closing ']'")]
    UnclosedOptional { pattern: String, token: String },
}

/// A fatal dispatch failure, reported once through the completion channel.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The resolver of a lazy route failed.
    #[error("lazy route '{pattern}' could not be resolved")]
    LazyResolution {
        pattern: String,
        #[source]
        source: BoxError,
    },

    /// The resolver of a lazy route succeeded but yielded no route.
    #[error("lazy route '{pattern}' resolved to a module without a 'route'")]
    MissingRoute { pattern: String },

    /// A handler or middleware failed, or completed the dispatch with an error.
    #[error("handler failed: {source}")]
    Handler {
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// Wraps a handler error.
    pub fn handler(error: impl Into<BoxError>) -> Self {
        DispatchError::Handler {
            source: error.into(),
        }
    }

    /// Returns true if this error came from resolving a lazy route.
    pub fn is_lazy_resolution(&self) -> bool {
        matches!(
            self,
            DispatchError::LazyResolution { .. } | DispatchError::MissingRoute { .. }
        )
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(error: anyhow::Error) -> Self {
        DispatchError::handler(error)
    }
}

/// The flag parser could not make sense of the flag suffix.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("failed to parse flags: {0}")]
    Parse(#[from] clap::Error),

    #[error("{0}")]
    Other(String),
}
