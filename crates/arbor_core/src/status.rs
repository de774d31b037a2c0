//! Last-error channel polled by the host after every call.

use std::fmt;

/// The outcome of the most recent boundary call.
///
/// Reset at the start of every call, set by its failure handler. Reading
/// the error consumes it: [`StatusChannel::take`] returns a message at
/// most once per failure.
#[derive(Debug, Default)]
pub struct StatusChannel {
    failed: bool,
    message: String,
}

impl StatusChannel {
    /// Creates a channel with no pending error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any pending error.
    pub fn reset(&mut self) {
        self.failed = false;
        self.message.clear();
    }

    /// Records a failure, replacing any earlier message.
    pub fn record(&mut self, error: &dyn fmt::Display) {
        self.failed = true;
        self.message = error.to_string();
    }

    /// Returns the pending message and marks it consumed.
    ///
    /// The text stays borrowed from the channel until the next reset.
    pub fn take(&mut self) -> Option<&str> {
        if !self.failed {
            return None;
        }
        self.failed = false;
        Some(&self.message)
    }

    /// Returns true if an unread error is pending.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.failed
    }
}
