//! Operator interaction
//!
//! The processor asks a human for substitute data through a blocking
//! prompt and reports bad input through an alert. Both are injected so
//! hosts can supply a modal dialog, a terminal, or a scripted double.

use std::fmt;

/// Blocking prompt and alert surface
pub trait OperatorConsole: Send + Sync {
    /// Ask the operator for input
    ///
    /// Blocks the calling task until the operator answers. `None` means
    /// the operator cancelled.
    fn prompt(&self, message: &str) -> Option<String>;

    /// Show an error to the operator
    fn alert(&self, message: &str);
}

impl<C: OperatorConsole + ?Sized> OperatorConsole for std::sync::Arc<C> {
    fn prompt(&self, message: &str) -> Option<String> {
        (**self).prompt(message)
    }

    fn alert(&self, message: &str) {
        (**self).alert(message);
    }
}

/// Console that answers every prompt with the same text
///
/// Alerts are written to the log.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticConsole {
    answer: Option<String>,
}

impl StaticConsole {
    /// Console answering with `answer`
    #[inline]
    #[must_use]
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
        }
    }

    /// Console that always cancels
    #[inline]
    #[must_use]
    pub fn cancelling() -> Self {
        Self { answer: None }
    }
}

impl fmt::Debug for StaticConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticConsole")
            .field("answers", &self.answer.is_some())
            .finish()
    }
}

impl OperatorConsole for StaticConsole {
    fn prompt(&self, _message: &str) -> Option<String> {
        self.answer.clone()
    }

    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "operator alert");
    }
}
