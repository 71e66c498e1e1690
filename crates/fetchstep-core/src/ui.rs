//! Reporting sink capability.
//!
//! User-facing text goes through a [`Ui`]; the core never prints directly. Calls are
//! fire-and-forget from the core's point of view and must not block for long.

use crate::progress::ProgressEvent;

pub trait Ui: Send + Sync {
    /// Headline for a step ("Downloading or copying ISO").
    fn say(&self, message: &str);

    /// Detail line under the current headline.
    fn message(&self, message: &str);

    fn error(&self, message: &str);

    /// Progress snapshot for the running transfer. Rendered as a detail line by default.
    fn progress(&self, event: &ProgressEvent) {
        self.message(&event.to_string());
    }
}
