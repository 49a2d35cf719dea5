// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use dashmap::DashMap;
use gavel_foundation::{GavPath, RepositoryName};
use tokio::sync::{
    Mutex,
    OwnedMutexGuard,
    OwnedRwLockReadGuard,
    OwnedRwLockWriteGuard,
    RwLock,
};

#[cfg(test)]
#[path = "./locks_test.rs"]
mod locks_test;

type LockKey = (RepositoryName, GavPath);

/// Serializes mutations of the same path within a repository.
///
/// Locks for different paths never contend. Idle path entries are
/// removed as soon as their last holder lets go. Every path lock also
/// holds its repository's tree lock shared, so that [`PathLocks::lock_tree`]
/// excludes writes anywhere in that repository.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
    trees: DashMap<RepositoryName, Arc<RwLock<()>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a path in a repository.
    pub async fn lock(&self, repository: &RepositoryName, path: &GavPath) -> PathGuard<'_> {
        let tree = self.tree(repository).read_owned().await;
        let key = (repository.clone(), path.clone());
        let mutex = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        PathGuard {
            locks: self,
            key,
            guard: Some(guard),
            _tree: tree,
        }
    }

    /// Wait for exclusive access to a whole repository.
    ///
    /// Outstanding path locks in the repository are waited for, and no
    /// new ones are granted until the returned guard is dropped.
    pub async fn lock_tree(&self, repository: &RepositoryName) -> TreeGuard {
        TreeGuard {
            _guard: self.tree(repository).write_owned().await,
        }
    }

    fn tree(&self, repository: &RepositoryName) -> Arc<RwLock<()>> {
        Arc::clone(self.trees.entry(repository.clone()).or_default().value())
    }

    /// The number of paths currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one path, released on drop.
#[derive(Debug)]
pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
    // released after the path entry is cleaned up
    _tree: OwnedRwLockReadGuard<()>,
}

/// Exclusive access to every path of one repository, released on drop.
#[derive(Debug)]
pub struct TreeGuard {
    _guard: OwnedRwLockWriteGuard<()>,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // any waiter holds its own clone of the mutex
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
