//! Fatal launcher errors.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to install {package}: {source}")]
    InstallSpawn {
        package: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install {package}: installer exited with {status}")]
    InstallFailed { package: String, status: ExitStatus },

    #[error("Execution failed: {0}")]
    Spawn(#[source] io::Error),

    #[error("Lost track of the runner process: {0}")]
    Wait(#[source] io::Error),
}

impl PlayError {
    /// Whether the runner executable itself could not be found.
    #[must_use]
    pub fn is_runner_missing(&self) -> bool {
        matches!(self, PlayError::Spawn(e) if e.kind() == io::ErrorKind::NotFound)
    }
}
