use thiserror::Error;

/// Errors surfaced by the normalizer's fallible edges (config, record I/O).
///
/// The normalization passes themselves never fail: malformed markup is parsed
/// best-effort and odd metadata is counted and skipped.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid task record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("fragment {id:?} could not be normalized: {reason}")]
    Fragment { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
