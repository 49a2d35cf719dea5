// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Denotes that a raw coordinate could not be normalized.
#[derive(Debug, Error)]
#[error("Invalid GAV [{gav}]: {message}")]
pub struct InvalidGavError {
    pub gav: String,
    pub message: String,
}

impl InvalidGavError {
    pub fn new_error<S: Into<String>>(gav: &str, msg: S) -> Error {
        Error::InvalidGav(Self {
            gav: gav.to_owned(),
            message: msg.into(),
        })
    }
}

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Invalid repository name: {0}")]
    #[diagnostic(code(gavel::invalid_name))]
    InvalidName(String),
    #[error(transparent)]
    #[diagnostic(code(gavel::invalid_gav))]
    InvalidGav(InvalidGavError),
    #[error("Path traversal is not allowed: {0}")]
    #[diagnostic(code(gavel::path_traversal))]
    PathTraversal(String),
    #[error("Invalid version: {0}")]
    #[diagnostic(code(gavel::invalid_version))]
    InvalidVersion(String),
}

impl Error {
    /// Return true if this error came from normalizing a coordinate.
    pub fn is_invalid_gav(&self) -> bool {
        matches!(self, Self::InvalidGav(_) | Self::PathTraversal(_))
    }
}
