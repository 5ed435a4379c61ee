//! Docchat engine: backend transport and background tasks.
mod backend;
mod progress;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use progress::{ProgressTicker, DEFAULT_TICK_INTERVAL, MAX_INCREMENT};
pub use types::{
    ChatAnswer, DocumentUpload, ExchangeError, FailureKind, Source, UploadReceipt,
};
