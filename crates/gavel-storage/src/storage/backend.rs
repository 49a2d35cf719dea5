// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use bytes::Bytes;
use relative_path::RelativePath;

use crate::{Capacity, DirectoryEntry, DocumentInfo, Entry, Result};

#[cfg(test)]
#[path = "./backend_test.rs"]
mod backend_test;

/// Low level storage operations for one repository.
///
/// These methods are expected to have different implementations for
/// different storage types, but perform the same logical operation for
/// any storage type. Paths are relative to the root of the repository
/// and are expected to be normalized already.
#[async_trait::async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// A short description of where this storage keeps its data.
    fn address(&self) -> String;

    /// The usage and quota of this storage.
    fn capacity(&self) -> &Capacity;

    /// True if a file or directory exists at the given path.
    async fn exists(&self, path: &RelativePath) -> bool;

    /// True if the given path exists and is a directory.
    async fn is_directory(&self, path: &RelativePath) -> bool;

    /// Read the file or list the directory at the given path.
    ///
    /// # Errors:
    /// - NotFound: if nothing exists at the path
    async fn file_details(&self, path: &RelativePath) -> Result<Entry>;

    /// List the direct children of the directory at the given path.
    ///
    /// # Errors:
    /// - NotFound: if the path does not exist or is not a directory
    async fn list(&self, path: &RelativePath) -> Result<Vec<DirectoryEntry>>;

    /// Store the content at the given path, replacing any existing file.
    ///
    /// Readers observe either the previous content or the new content,
    /// never a partial write.
    ///
    /// # Errors:
    /// - IsDirectory: if a directory exists at the path
    /// - QuotaExceeded: if the write would exceed the quota
    async fn put_file(&self, path: &RelativePath, content: Bytes) -> Result<DocumentInfo>;

    /// Remove the file or directory tree at the given path.
    ///
    /// # Errors:
    /// - NotFound: if nothing exists at the path
    async fn remove_file(&self, path: &RelativePath) -> Result<()>;

    /// True once this storage has reached its quota.
    fn is_full(&self) -> bool {
        self.capacity().is_full()
    }
}
