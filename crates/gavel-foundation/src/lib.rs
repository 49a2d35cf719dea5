// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Core value types shared by every gavel crate.

#![deny(unsafe_op_in_unsafe_fn)]

mod error;
pub mod gav;
pub mod metadata;
pub mod name;
pub mod snapshot;
pub mod version;

pub use error::{Error, InvalidGavError, Result};
pub use gav::GavPath;
pub use name::RepositoryName;
pub use version::Version;
