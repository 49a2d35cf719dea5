// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Resolution and mutation of artifacts across configured repositories.

#![deny(unsafe_op_in_unsafe_fn)]

mod engine;
mod error;
mod locks;
pub mod metadata;
pub mod proxy;
mod registry;
pub mod security;

pub use engine::{DeleteRequest, DeployRequest, Engine, FileDetails, LookupRequest};
pub use error::{Error, ErrorKind, ErrorResponse, Result};
pub use locks::{PathGuard, PathLocks, TreeGuard};
pub use metadata::VersionInfo;
pub use proxy::{NoProxy, ProxyClient, RepositoryUpstream, Upstream, UpstreamProxy};
pub use registry::{Repository, RepositoryRegistry};
pub use security::{AccessToken, AllowAll, PolicyGate, SecurityGate};
