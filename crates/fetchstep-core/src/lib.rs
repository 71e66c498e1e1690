pub mod config;
pub mod logging;

pub mod acquire;
pub mod cache;
pub mod checksum;
pub mod error;
pub mod progress;
pub mod request;
pub mod retry;
pub mod source;
pub mod state;
pub mod storage;
pub mod transfer;
pub mod transport;
pub mod ui;

pub use acquire::{AcquireSettings, Acquirer};
pub use error::AcquireError;
pub use request::{AcquisitionRequest, DownloadTask};
pub use state::{CancelToken, StateBag, StepAction};
pub use transfer::TransferOutcome;
