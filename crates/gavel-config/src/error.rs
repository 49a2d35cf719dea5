// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Cannot load config, lock has been poisoned: {0}")]
    LockPoisonedRead(String),
    #[error("Cannot update config, lock has been poisoned: {0}")]
    LockPoisonedWrite(String),

    #[error("Repository '{0}' is configured more than once")]
    #[diagnostic(code(gavel::config::duplicate_repository))]
    DuplicateRepository(String),
    #[error("Repository '{repository}' names an unknown upstream '{upstream}'")]
    #[diagnostic(code(gavel::config::unknown_upstream))]
    UnknownUpstream { repository: String, upstream: String },

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
