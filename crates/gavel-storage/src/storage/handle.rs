// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use super::Storage;

/// A type alias for a storage trait object.
pub type Handle = dyn Storage;

#[derive(Debug, Clone)]
pub enum StorageHandle {
    Fs(super::FsStorage),
    Mem(super::MemStorage),
}

impl StorageHandle {
    /// Create a handle to an empty, in-memory storage
    pub fn new_mem() -> Self {
        Self::Mem(Default::default())
    }

    /// Open (or create) filesystem storage at the given root
    pub async fn open_fs<P: AsRef<std::path::Path>>(root: P) -> crate::Result<Self> {
        Ok(Self::Fs(super::FsStorage::create(root).await?))
    }

    /// Apply a byte quota to the underlying storage.
    pub fn with_quota(self, quota: Option<u64>) -> Self {
        match self {
            Self::Fs(storage) => Self::Fs(storage.with_quota(quota)),
            Self::Mem(storage) => Self::Mem(storage.with_quota(quota)),
        }
    }

    pub fn is_fs(&self) -> bool {
        matches!(self, Self::Fs(_))
    }

    pub fn is_mem(&self) -> bool {
        matches!(self, Self::Mem(_))
    }
}

impl std::ops::Deref for StorageHandle {
    type Target = Handle;

    fn deref(&self) -> &Self::Target {
        match self {
            StorageHandle::Fs(storage) => storage,
            StorageHandle::Mem(storage) => storage,
        }
    }
}

impl std::ops::DerefMut for StorageHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            StorageHandle::Fs(storage) => storage,
            StorageHandle::Mem(storage) => storage,
        }
    }
}

impl From<super::FsStorage> for StorageHandle {
    fn from(storage: super::FsStorage) -> Self {
        StorageHandle::Fs(storage)
    }
}

impl From<super::MemStorage> for StorageHandle {
    fn from(storage: super::MemStorage) -> Self {
        StorageHandle::Mem(storage)
    }
}
