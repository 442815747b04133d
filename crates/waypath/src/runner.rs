//! Sequential execution of handler chains.
//!
//! Steps run one at a time; the next step starts only after the previous
//! one has resolved. A failing step records its error on the completion
//! channel and stops the chain, and so does a step that completes the
//! dispatch explicitly.

use std::rc::Rc;

use crate::error::DispatchError;
use crate::handler::{CommandInput, Handler};
use crate::output::CommandOutput;

/// A shared, type-erased step.
pub type SharedHandler<C> = Rc<dyn Handler<C>>;

/// Whether traversal may go on after a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Every step ran and none completed the dispatch.
    Continue,
    /// The dispatch was completed, with or without an error.
    Stopped,
}

/// Runs `steps` in order against one input.
pub async fn run_chain<C>(
    steps: &[SharedHandler<C>],
    input: &mut CommandInput<C>,
    output: &CommandOutput,
) -> Progress {
    for (index, step) in steps.iter().enumerate() {
        if let Err(error) = step.handle(input, output).await {
            tracing::debug!(step = index, %error, "step failed");
            output.fail(DispatchError::from(error));
            return Progress::Stopped;
        }
        if output.is_completed() {
            tracing::trace!(step = index, "dispatch completed by step");
            return Progress::Stopped;
        }
    }
    Progress::Continue
}
