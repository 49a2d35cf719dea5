// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use relative_path::RelativePathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("File not found: {0}")]
    #[diagnostic(code(gavel::storage::not_found))]
    NotFound(RelativePathBuf),
    #[error("Cannot write over a directory: {0}")]
    #[diagnostic(code(gavel::storage::is_directory))]
    IsDirectory(RelativePathBuf),
    #[error("Cannot write beneath a file: {0}")]
    #[diagnostic(code(gavel::storage::not_a_directory))]
    NotADirectory(RelativePathBuf),
    #[error("Path escapes the storage root: {0}")]
    #[diagnostic(code(gavel::storage::invalid_path))]
    InvalidPath(RelativePathBuf),
    #[error("Not enough storage space: {requested} bytes requested, {available} available")]
    #[diagnostic(code(gavel::storage::quota_exceeded))]
    QuotaExceeded { requested: u64, available: u64 },
    #[error("Failed to create directory {0:?}")]
    DirectoryCreateError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Failed to read {0:?}")]
    FileReadError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Failed to write {0:?}")]
    FileWriteError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Failed to remove {0:?}")]
    FileRemoveError(std::path::PathBuf, #[source] std::io::Error),
    #[error("{0}")]
    String(String),
}

impl Error {
    /// Return true if this is a `NotFound` error.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::String(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::String(err.to_owned())
    }
}
