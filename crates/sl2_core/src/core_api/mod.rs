mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode, ErrorKind};
pub use types::{ChecksumReport, ChecksumStatus, SaveSummary, SlotSummary};
