// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Fetching of files that a repository does not hold locally.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gavel_foundation::{GavPath, RepositoryName};
use gavel_storage::{DocumentInfo, Entry, StorageHandle};

use crate::{ErrorResponse, FileDetails, PathLocks, Repository, Result};

#[cfg(test)]
#[path = "./proxy_test.rs"]
mod proxy_test;

/// A source of files for repositories that forward local misses.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync + std::fmt::Debug {
    /// A short description of this upstream for log output.
    fn name(&self) -> &str;

    /// Fetch the file at the given path.
    ///
    /// Returns `None` if the upstream does not have the file.
    async fn fetch(&self, path: &GavPath) -> Result<Option<Bytes>>;
}

/// Serves files out of another local repository's storage.
#[derive(Debug, Clone)]
pub struct RepositoryUpstream {
    name: RepositoryName,
    storage: StorageHandle,
}

impl RepositoryUpstream {
    pub fn new(name: RepositoryName, storage: StorageHandle) -> Self {
        Self { name, storage }
    }
}

#[async_trait::async_trait]
impl Upstream for RepositoryUpstream {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    async fn fetch(&self, path: &GavPath) -> Result<Option<Bytes>> {
        match self.storage.file_details(path).await {
            Ok(Entry::File(doc)) => Ok(Some(doc.content)),
            Ok(Entry::Directory(_)) => Ok(None),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Resolves a path that the repository does not hold locally.
#[async_trait::async_trait]
pub trait ProxyClient: Send + Sync + std::fmt::Debug {
    async fn find_file(
        &self,
        repository: &Repository,
        path: &GavPath,
    ) -> std::result::Result<FileDetails, ErrorResponse>;
}

/// A proxy client for deployments without any upstreams.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProxy;

#[async_trait::async_trait]
impl ProxyClient for NoProxy {
    async fn find_file(
        &self,
        _repository: &Repository,
        _path: &GavPath,
    ) -> std::result::Result<FileDetails, ErrorResponse> {
        Err(ErrorResponse::not_found("File not found"))
    }
}

/// Consults a repository's upstreams in order and caches the first hit.
///
/// A fetched file is written into the repository's own storage when
/// its quota allows, otherwise it is served without being kept. An
/// upstream that fails or times out is logged and skipped.
#[derive(Debug)]
pub struct UpstreamProxy {
    timeout: Option<Duration>,
    locks: Arc<PathLocks>,
}

impl UpstreamProxy {
    /// Create a proxy that caches under the given locks.
    ///
    /// These must be the locks the engine deploys under, so that caching
    /// never races a deploy.
    pub fn new(locks: Arc<PathLocks>) -> Self {
        Self {
            timeout: None,
            locks,
        }
    }

    /// Bound each upstream fetch to the given duration.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &gavel_config::Config, locks: Arc<PathLocks>) -> Self {
        let timeout = match config.server.proxy_timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };
        Self::new(locks).with_timeout(timeout)
    }

    async fn fetch(&self, upstream: &dyn Upstream, path: &GavPath) -> Result<Option<Bytes>> {
        match self.timeout {
            None => upstream.fetch(path).await,
            Some(timeout) => tokio::time::timeout(timeout, upstream.fetch(path))
                .await
                .map_err(|_| {
                    crate::Error::String(format!(
                        "Upstream {} timed out after {timeout:?}",
                        upstream.name()
                    ))
                })?,
        }
    }

    async fn cache(
        &self,
        repository: &Repository,
        path: &GavPath,
        content: Bytes,
    ) -> std::result::Result<DocumentInfo, ErrorResponse> {
        let _guard = self.locks.lock(repository.name(), path).await;
        let storage = repository.storage();
        if let Ok(Entry::File(doc)) = storage.file_details(path).await {
            // deployed while the fetch was in flight
            return Ok(doc);
        }
        if repository.is_full() {
            tracing::debug!(repository = %repository.name(), %path, "repository is full, not caching");
            return Ok(DocumentInfo::new(path.file_name(), content));
        }
        match storage.put_file(path, content.clone()).await {
            Ok(doc) => Ok(doc),
            Err(err) => {
                tracing::warn!(repository = %repository.name(), %path, "failed to cache upstream file: {err}");
                Ok(DocumentInfo::new(path.file_name(), content))
            }
        }
    }
}

#[async_trait::async_trait]
impl ProxyClient for UpstreamProxy {
    async fn find_file(
        &self,
        repository: &Repository,
        path: &GavPath,
    ) -> std::result::Result<FileDetails, ErrorResponse> {
        for upstream in repository.upstreams() {
            tracing::trace!(upstream = upstream.name(), %path, "probing upstream");
            match self.fetch(upstream.as_ref(), path).await {
                Ok(Some(content)) => {
                    tracing::debug!(upstream = upstream.name(), %path, "found file upstream");
                    let doc = self.cache(repository, path, content).await?;
                    return Ok(FileDetails::Document(doc));
                }
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(upstream = upstream.name(), %path, "upstream failed: {err}");
                }
            }
        }
        Err(ErrorResponse::not_found("File not found"))
    }
}
