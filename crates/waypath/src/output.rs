//! Output sink and completion channel.
//!
//! Handlers produce visible output through [`CommandOutput::emit`], which
//! forwards to an injected [`Logger`]. They end the whole dispatch early with
//! [`CommandOutput::complete`], optionally carrying an error. Completion is
//! recorded once per dispatch: the first call wins and later calls are
//! ignored.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::error::DispatchError;

/// Where emitted messages go.
pub trait Logger {
    fn log(&self, message: &str);
}

/// Writes each message as a line on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, message: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(error) = writeln!(handle, "{}", message) {
            tracing::warn!(%error, "failed to write to stdout");
        }
    }
}

/// Keeps messages in memory. Clones share the same buffer.
///
/// ```rust
/// use waypath::{Logger, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.log("baz");
/// assert_eq!(logger.lines(), vec!["baz"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every message logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

#[derive(Debug, Default)]
enum Completion {
    #[default]
    Pending,
    Done(Option<DispatchError>),
}

/// The sink handed to every middleware and handler of one dispatch.
///
/// Cloning is cheap; clones share the logger and the completion state.
#[derive(Clone)]
pub struct CommandOutput {
    logger: Rc<dyn Logger>,
    completion: Rc<RefCell<Completion>>,
}

impl CommandOutput {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self {
            logger,
            completion: Rc::new(RefCell::new(Completion::Pending)),
        }
    }

    /// An output that writes to standard output.
    pub fn stdout() -> Self {
        Self::new(Rc::new(StdoutLogger))
    }

    /// Produces a visible message.
    pub fn emit(&self, message: impl fmt::Display) {
        self.logger.log(&message.to_string());
    }

    /// Signals that the dispatch is over, successfully or not.
    ///
    /// Remaining steps of the current chain are skipped and no further
    /// candidate is tried.
    pub fn complete(&self, error: Option<anyhow::Error>) {
        self.finish(error.map(DispatchError::from));
    }

    /// Returns true once [`complete`](Self::complete) has been called.
    pub fn is_completed(&self) -> bool {
        matches!(*self.completion.borrow(), Completion::Done(_))
    }

    pub(crate) fn fail(&self, error: DispatchError) {
        self.finish(Some(error));
    }

    fn finish(&self, error: Option<DispatchError>) {
        let mut completion = self.completion.borrow_mut();
        if matches!(*completion, Completion::Pending) {
            *completion = Completion::Done(error);
        } else {
            tracing::warn!(?error, "dispatch already completed; ignoring completion");
        }
    }

    /// Takes the recorded completion error, leaving `None` behind.
    pub(crate) fn take_error(&self) -> Option<DispatchError> {
        match &mut *self.completion.borrow_mut() {
            Completion::Done(error) => error.take(),
            Completion::Pending => None,
        }
    }
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOutput")
            .field("completion", &*self.completion.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for CommandOutput {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_output() -> (CommandOutput, MemoryLogger) {
        let logger = MemoryLogger::new();
        (CommandOutput::new(Rc::new(logger.clone())), logger)
    }

    #[test]
    fn test_emit_goes_to_logger() {
        let (output, logger) = memory_output();
        output.emit("peeled!");
        output.emit(42);
        assert_eq!(logger.lines(), vec!["peeled!", "42"]);
    }

    #[test]
    fn test_clones_share_logger() {
        let (output, logger) = memory_output();
        output.clone().emit("from clone");
        assert_eq!(logger.lines(), vec!["from clone"]);
    }

    #[test]
    fn test_complete_without_error() {
        let (output, _) = memory_output();
        assert!(!output.is_completed());
        output.complete(None);
        assert!(output.is_completed());
        assert!(output.take_error().is_none());
    }

    #[test]
    fn test_first_completion_wins() {
        let (output, _) = memory_output();
        output.complete(Some(anyhow::anyhow!("first")));
        output.complete(Some(anyhow::anyhow!("second")));
        output.complete(None);

        let error = output.take_error().unwrap();
        assert_eq!(error.to_string(), "handler failed: first");
        assert!(output.take_error().is_none());
    }

    #[test]
    fn test_completion_is_shared_between_clones() {
        let (output, _) = memory_output();
        let clone = output.clone();
        clone.complete(None);
        assert!(output.is_completed());
    }

    #[test]
    fn test_memory_logger_clear() {
        let logger = MemoryLogger::new();
        logger.log("a");
        logger.clear();
        assert!(logger.lines().is_empty());
    }
}
