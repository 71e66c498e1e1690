//! CLI command handlers.

mod checksum;
mod fetch;

pub use checksum::run_checksum;
pub use fetch::{build_request, run_fetch};
