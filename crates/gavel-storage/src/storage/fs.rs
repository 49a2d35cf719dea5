// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use relative_path::{Component, RelativePath, RelativePathBuf};

use super::Storage;
use crate::{Capacity, DirectoryEntry, DirectoryInfo, DocumentInfo, Entry, Error, Result};

/// Prefix of the temporary files used to make writes atomic.
const TEMP_PREFIX: &str = ".gavel-tmp-";

/// A pure filesystem-based repository storage.
#[derive(Clone)]
pub struct FsStorage {
    root: PathBuf,
    capacity: Arc<Capacity>,
}

impl FsStorage {
    /// Establish storage at the given root, creating it if needed.
    ///
    /// The size of any existing content is counted against the quota.
    pub async fn create<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|err| Error::DirectoryCreateError(root.to_owned(), err))?;
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|err| Error::FileReadError(root.to_owned(), err))?;
        let used = {
            let root = root.clone();
            tokio::task::spawn_blocking(move || disk_usage(&root))
                .await
                .map_err(|err| Error::String(format!("Failed to measure storage: {err}")))?
        };
        tracing::debug!(root = %root.display(), used, "opened filesystem storage");
        Ok(Self {
            root,
            capacity: Arc::new(Capacity::new(None, used)),
        })
    }

    /// Limit this storage to the given number of bytes.
    pub fn with_quota(self, quota: Option<u64>) -> Self {
        let used = self.capacity.used();
        Self {
            capacity: Arc::new(Capacity::new(quota, used)),
            ..self
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &RelativePath) -> Result<PathBuf> {
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        Ok(path.to_path(&self.root))
    }
}

impl std::fmt::Debug for FsStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("FsStorage @ {:?}", self.root))
    }
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX)
}

/// Total size in bytes of the files under the given directory.
fn disk_usage(root: &Path) -> u64 {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_temp_file(&entry.file_name().to_string_lossy()))
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// The nearest ancestor of `path` under `root` that is a file, if any.
fn file_ancestor(root: &Path, path: &RelativePath) -> Option<RelativePathBuf> {
    std::iter::successors(path.parent(), |dir| dir.parent())
        .take_while(|dir| !dir.as_str().is_empty())
        .find(|dir| {
            std::fs::symlink_metadata(dir.to_path(root))
                .map(|meta| !meta.is_dir())
                .unwrap_or(false)
        })
        .map(|dir| dir.to_relative_path_buf())
}

/// Remove a directory tree, releasing each file's size as it goes.
fn remove_tree(root: &Path, capacity: &Capacity) -> Result<()> {
    for entry in walkdir::WalkDir::new(root).contents_first(true) {
        let entry = entry.map_err(|err| Error::FileRemoveError(root.to_owned(), err.into()))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            std::fs::remove_dir(path).map_err(|err| Error::FileRemoveError(path.to_owned(), err))?;
            continue;
        }
        let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
        std::fs::remove_file(path).map_err(|err| Error::FileRemoveError(path.to_owned(), err))?;
        if !is_temp_file(&entry.file_name().to_string_lossy()) {
            capacity.release(size);
        }
    }
    Ok(())
}

fn entry_name(path: &RelativePath) -> String {
    path.file_name().unwrap_or_default().to_owned()
}

async fn read_children(dir: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|err| Error::FileReadError(dir.to_owned(), err))?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|err| Error::FileReadError(dir.to_owned(), err))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_temp_file(&name) {
            continue;
        }
        let meta = entry
            .metadata()
            .await
            .map_err(|err| Error::FileReadError(entry.path(), err))?;
        if meta.is_dir() {
            entries.push(DirectoryEntry::directory(name));
        } else {
            entries.push(DirectoryEntry::file(name, meta.len()));
        }
    }
    Ok(entries)
}

fn map_not_found(path: &RelativePath, target: &Path, err: std::io::Error) -> Error {
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.to_owned()),
        _ => Error::FileReadError(target.to_owned(), err),
    }
}

#[async_trait::async_trait]
impl Storage for FsStorage {
    fn address(&self) -> String {
        format!("file://{}", self.root.display())
    }

    fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    async fn exists(&self, path: &RelativePath) -> bool {
        let Ok(target) = self.resolve(path) else {
            return false;
        };
        tokio::fs::try_exists(target).await.unwrap_or(false)
    }

    async fn is_directory(&self, path: &RelativePath) -> bool {
        let Ok(target) = self.resolve(path) else {
            return false;
        };
        tokio::fs::metadata(target)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn file_details(&self, path: &RelativePath) -> Result<Entry> {
        let target = self.resolve(path)?;
        let meta = tokio::fs::metadata(&target)
            .await
            .map_err(|err| map_not_found(path, &target, err))?;
        if meta.is_dir() {
            let entries = read_children(&target).await?;
            return Ok(Entry::Directory(DirectoryInfo::new(
                entry_name(path),
                entries,
            )));
        }
        let content = tokio::fs::read(&target)
            .await
            .map_err(|err| map_not_found(path, &target, err))?;
        Ok(Entry::File(DocumentInfo::new(
            entry_name(path),
            Bytes::from(content),
        )))
    }

    async fn list(&self, path: &RelativePath) -> Result<Vec<DirectoryEntry>> {
        let target = self.resolve(path)?;
        let meta = tokio::fs::metadata(&target)
            .await
            .map_err(|err| map_not_found(path, &target, err))?;
        if !meta.is_dir() {
            return Err(Error::NotFound(path.to_owned()));
        }
        read_children(&target).await
    }

    async fn put_file(&self, path: &RelativePath, content: Bytes) -> Result<DocumentInfo> {
        let target = self.resolve(path)?;
        let parent = target
            .parent()
            .map(Path::to_owned)
            .unwrap_or_else(|| self.root.clone());
        let path = path.to_owned();
        let capacity = Arc::clone(&self.capacity);
        let root = self.root.clone();

        // The blocking write runs to completion even if the caller goes
        // away, so the file and the accounting always stay consistent.
        tokio::task::spawn_blocking(move || {
            if let Some(file) = file_ancestor(&root, &path) {
                return Err(Error::NotADirectory(file));
            }
            let old_size = match std::fs::metadata(&target) {
                Ok(meta) if meta.is_dir() => return Err(Error::IsDirectory(path)),
                Ok(meta) => meta.len(),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
                Err(err) => return Err(Error::FileReadError(target, err)),
            };
            capacity.resize(old_size, content.len() as u64)?;

            let written = std::fs::create_dir_all(&parent)
                .map_err(|err| Error::DirectoryCreateError(parent.clone(), err))
                .and_then(|_| {
                    let mut tmp = tempfile::Builder::new()
                        .prefix(TEMP_PREFIX)
                        .tempfile_in(&parent)
                        .map_err(|err| Error::FileWriteError(parent.clone(), err))?;
                    tmp.write_all(&content)
                        .and_then(|_| tmp.as_file().sync_all())
                        .map_err(|err| Error::FileWriteError(tmp.path().to_owned(), err))?;
                    tmp.persist(&target)
                        .map_err(|err| Error::FileWriteError(target.clone(), err.error))?;
                    Ok(())
                });
            if let Err(err) = written {
                // undo the accounting for a write that never landed
                let _ = capacity.resize(content.len() as u64, old_size);
                return Err(err);
            }
            Ok(DocumentInfo::new(entry_name(&path), content))
        })
        .await
        .map_err(|err| Error::String(format!("Storage write was interrupted: {err}")))?
    }

    async fn remove_file(&self, path: &RelativePath) -> Result<()> {
        let target = self.resolve(path)?;
        let path = path.to_owned();
        let capacity = Arc::clone(&self.capacity);
        tokio::task::spawn_blocking(move || {
            let meta = std::fs::metadata(&target).map_err(|err| map_not_found(&path, &target, err))?;
            if meta.is_dir() {
                remove_tree(&target, &capacity)?;
            } else {
                std::fs::remove_file(&target)
                    .map_err(|err| Error::FileRemoveError(target.clone(), err))?;
                capacity.release(meta.len());
            }
            Ok(())
        })
        .await
        .map_err(|err| Error::String(format!("Storage removal was interrupted: {err}")))?
    }
}
