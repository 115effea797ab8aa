pub mod config;
pub mod error;
pub mod panic_handler;
pub mod parsing;
pub mod pipeline;
pub mod references;
pub mod runner;
pub mod types;

pub use config::NormalizerConfig;
pub use error::{NormalizeError, Result};
pub use pipeline::{BatchReport, NormalizedFragment, normalize_batch, normalize_task};
pub use references::{ReferenceEntry, ReferenceTable};
pub use types::{Attachment, NormalizedTask, TaskRecord};
