//! Error types for the report pipeline.
//!
//! Each stage has its own error enum; [`PipelineError`] wraps them and
//! decides which process exit code a failure maps to.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while copying the source aside and truncating it.
#[derive(Debug, Error)]
pub enum RotateError {
    /// The source file could not be read or copied.
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot does not match the source byte-for-byte.
    #[error("snapshot {path} does not match the source ({copied} of {expected} bytes)")]
    Mismatch {
        path: PathBuf,
        copied: u64,
        expected: u64,
    },

    /// Truncating the source failed after a verified copy.
    #[error("cannot truncate {path}: {source}")]
    Truncate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading perfdata lines into records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying TSV reader failed.
    #[error("malformed input at line {line}: {source}")]
    Tsv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// A line does not have the fixed column count.
    #[error("line {line}: expected {expected} tab-separated fields, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A field could not be converted to its schema type.
    #[error("line {line}: invalid {field} {value:?}")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
}

/// Errors raised while drawing the chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing backend failed (usually an I/O error on the target file).
    #[error("cannot draw chart {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Errors raised while writing the tabular export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot flush export {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while composing the outbound message.
///
/// Delivery failures are not errors at this level; they are reported as
/// [`crate::notify::DeliveryOutcome::Failed`].
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Sender or recipient is not a valid mailbox.
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// An attachment could not be read from disk.
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The MIME message could not be assembled.
    #[error("cannot build message: {0}")]
    Build(String),
}

/// Top-level failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rotate(#[from] RotateError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Delivery failed and the configuration requires it to succeed.
    #[error("report delivery failed: {reason}")]
    Delivery { reason: String },
}

/// Process exit codes of the `tempgraph` binary.
pub mod exit_code {
    /// Run completed.
    pub const OK: u8 = 0;
    /// Missing or invalid configuration.
    pub const CONFIG: u8 = 3;
    /// Source file missing, unreadable or malformed.
    pub const INPUT: u8 = 4;
    /// Chart, export or message could not be produced.
    pub const ARTIFACT: u8 = 5;
    /// Delivery failed under `require_delivery`.
    pub const DELIVERY: u8 = 6;
}

impl PipelineError {
    /// Exit code the binary reports for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Rotate(_) | PipelineError::Load(_) => exit_code::INPUT,
            PipelineError::Render(_) | PipelineError::Export(_) | PipelineError::Notify(_) => {
                exit_code::ARTIFACT
            }
            PipelineError::Delivery { .. } => exit_code::DELIVERY,
        }
    }
}
