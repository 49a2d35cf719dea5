// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[cfg(test)]
#[path = "./error_test.rs"]
mod error_test;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while assembling repositories or talking to upstreams.
#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Repository '{0}' is registered more than once")]
    #[diagnostic(code(gavel::engine::duplicate_repository))]
    DuplicateRepository(String),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Storage(#[from] gavel_storage::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Config(#[from] gavel_config::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Foundation(#[from] gavel_foundation::Error),
    #[error("{0}")]
    String(String),
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

/// The category of a failed engine request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Unauthorized,
    Conflict,
    InsufficientStorage,
    Internal,
}

impl ErrorKind {
    /// The HTTP status that transports report for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Conflict => 409,
            ErrorKind::InsufficientStorage => 507,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The failed outcome of an engine request.
#[derive(Clone, Debug, Eq, PartialEq, Error, Serialize)]
#[error("{status}: {message}")]
pub struct ErrorResponse {
    pub status: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(status: ErrorKind, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn insufficient_storage<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::InsufficientStorage, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }
}

impl From<gavel_storage::Error> for ErrorResponse {
    fn from(err: gavel_storage::Error) -> Self {
        use gavel_storage::Error as StorageError;
        let status = match &err {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::QuotaExceeded { .. } => ErrorKind::InsufficientStorage,
            StorageError::IsDirectory(_) | StorageError::NotADirectory(_) => ErrorKind::Conflict,
            StorageError::InvalidPath(_) => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        };
        Self::new(status, err.to_string())
    }
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        match err {
            Error::Storage(err) => err.into(),
            err => Self::internal(err.to_string()),
        }
    }
}
