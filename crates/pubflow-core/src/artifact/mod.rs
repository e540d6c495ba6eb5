//! JSON artifacts written between stages.
//!
//! The status artifact is the only data that crosses from `check` to
//! `publish`. Results artifacts are write-only reports.

pub mod results;
pub mod status;

use std::path::PathBuf;

pub use results::{
    BatchResults, FailedPackage, InteractiveResults, OutcomeResult, PublicationOutcome,
    ResultsArtifact, ResultsRecorder,
};
pub use status::{
    NEVER_PUBLISHED, PublicationState, PublicationStatus, StatusArtifact, StatusEntry,
    StatusRecorder,
};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("status artifact not found at {}; run `pubflow check` first", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
