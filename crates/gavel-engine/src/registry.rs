// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;
use std::sync::Arc;

use gavel_config::{StorageKind, Visibility};
use gavel_foundation::RepositoryName;
use gavel_storage::StorageHandle;
use indexmap::IndexMap;

use crate::proxy::{RepositoryUpstream, Upstream};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./registry_test.rs"]
mod registry_test;

/// A named, independently configured artifact tree.
#[derive(Debug)]
pub struct Repository {
    name: RepositoryName,
    storage: StorageHandle,
    redeployment: bool,
    visibility: Visibility,
    upstreams: Vec<Arc<dyn Upstream>>,
}

impl Repository {
    pub fn new(name: RepositoryName, storage: StorageHandle) -> Self {
        Self {
            name,
            storage,
            redeployment: false,
            visibility: Visibility::default(),
            upstreams: Vec::new(),
        }
    }

    /// Allow existing artifacts to be overwritten.
    pub fn with_redeployment(mut self, redeployment: bool) -> Self {
        self.redeployment = redeployment;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add a source to consult when a file is not stored locally.
    ///
    /// Upstreams are consulted in the order they are added.
    pub fn with_upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstreams.push(upstream);
        self
    }

    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    pub fn storage(&self) -> &StorageHandle {
        &self.storage
    }

    pub fn redeployment(&self) -> bool {
        self.redeployment
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn upstreams(&self) -> &[Arc<dyn Upstream>] {
        &self.upstreams
    }

    /// True if this repository forwards misses to upstreams.
    pub fn is_proxy(&self) -> bool {
        !self.upstreams.is_empty()
    }

    /// True once the storage has reached its quota.
    pub fn is_full(&self) -> bool {
        self.storage.is_full()
    }
}

/// The set of configured repositories, indexed by name.
///
/// Repositories are kept in the order they were registered.
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    repositories: IndexMap<RepositoryName, Arc<Repository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the storage of every configured repository.
    pub async fn from_config(config: &gavel_config::Config) -> Result<Self> {
        let mut opened = Vec::with_capacity(config.repositories.len());
        for repo in config.repositories.iter() {
            let storage = match repo.kind {
                StorageKind::Mem => StorageHandle::new_mem(),
                StorageKind::Fs => {
                    let root = config.repository_root(repo);
                    tracing::debug!(repository = %repo.name, root = %root.display(), "opening repository");
                    StorageHandle::open_fs(root).await?
                }
            };
            opened.push((repo, storage.with_quota(repo.quota)));
        }
        let storages: HashMap<_, _> = opened
            .iter()
            .map(|(repo, storage)| (&repo.name, storage))
            .collect();

        let mut registry = Self::new();
        for (repo, storage) in opened.iter() {
            let mut repository = Repository::new(repo.name.clone(), storage.clone())
                .with_redeployment(repo.redeployment)
                .with_visibility(repo.visibility);
            for upstream in repo.upstreams.iter() {
                let Some(&upstream_storage) = storages.get(upstream) else {
                    return Err(gavel_config::Error::UnknownUpstream {
                        repository: repo.name.to_string(),
                        upstream: upstream.to_string(),
                    }
                    .into());
                };
                repository = repository.with_upstream(Arc::new(RepositoryUpstream::new(
                    upstream.clone(),
                    upstream_storage.clone(),
                )));
            }
            registry.register(repository)?;
        }
        Ok(registry)
    }

    /// Add a repository, which must have a unique name.
    pub fn register(&mut self, repository: Repository) -> Result<Arc<Repository>> {
        if self.repositories.contains_key(repository.name()) {
            return Err(Error::DuplicateRepository(repository.name().to_string()));
        }
        let repository = Arc::new(repository);
        self.repositories
            .insert(repository.name().clone(), Arc::clone(&repository));
        Ok(repository)
    }

    pub fn get_repository(&self, name: &str) -> Option<Arc<Repository>> {
        self.repositories.get(name).cloned()
    }

    /// All repositories, in registration order.
    pub fn repositories(&self) -> Vec<Arc<Repository>> {
        self.repositories.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
