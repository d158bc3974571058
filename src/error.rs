//! Error types shared across the crate

use thiserror::Error;

/// Errors produced while building or executing steps.
///
/// Cloneable so a task's failure can both settle its own handle and be
/// retained as the queue-wide failure.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    /// A fatal setup problem, raised synchronously at DSL-call time and
    /// never routed through the task queue.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A failed expectation, carrying the subject under test and the
    /// human-readable predicate that was evaluated against it.
    #[error("expected {subject} to satisfy {predicate}")]
    Assertion { subject: String, predicate: String },

    /// Any other failure raised while operating on located elements.
    #[error("element operation failed: {0}")]
    Element(String),

    /// The recorder's worker is gone and the task can never settle.
    #[error("task queue is closed")]
    QueueClosed,
}

impl StepError {
    /// Build an assertion error for the given subject and predicate text.
    pub fn assertion(subject: impl Into<String>, predicate: impl Into<String>) -> Self {
        StepError::Assertion {
            subject: subject.into(),
            predicate: predicate.into(),
        }
    }
}
