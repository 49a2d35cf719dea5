// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bytes::Bytes;
use relative_path::{RelativePath, RelativePathBuf};
use tokio::sync::RwLock;

use super::Storage;
use crate::{Capacity, DirectoryEntry, DirectoryInfo, DocumentInfo, Entry, Error, Result};

type FileMap = BTreeMap<RelativePathBuf, Bytes>;

/// Storage that only lives in memory.
///
/// Directories are implicit: a directory exists for as long as some
/// file is stored beneath it.
#[derive(Clone, Debug)]
pub struct MemStorage {
    address: String,
    files: Arc<RwLock<FileMap>>,
    capacity: Arc<Capacity>,
}

impl MemStorage {
    pub fn new() -> Self {
        let files: Arc<RwLock<FileMap>> = Arc::default();
        // Using the address of `files` because `self` doesn't exist yet.
        let address = format!("mem://{:x}", Arc::as_ptr(&files) as *const () as usize);
        Self {
            address,
            files,
            capacity: Arc::default(),
        }
    }

    /// Limit this storage to the given number of bytes.
    pub fn with_quota(self, quota: Option<u64>) -> Self {
        let used = self.capacity.used();
        Self {
            capacity: Arc::new(Capacity::new(quota, used)),
            ..self
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn is_within(path: &RelativePath, dir: &RelativePath) -> bool {
    dir.as_str().is_empty() || (path.starts_with(dir) && path != dir)
}

fn has_children(files: &FileMap, dir: &RelativePath) -> bool {
    files.keys().any(|key| is_within(key, dir))
}

/// The nearest ancestor of `path` that is stored as a file, if any.
fn file_ancestor<'a>(files: &FileMap, path: &'a RelativePath) -> Option<&'a RelativePath> {
    std::iter::successors(path.parent(), |dir| dir.parent())
        .take_while(|dir| !dir.as_str().is_empty())
        .find(|dir| files.contains_key(*dir))
}

fn children(files: &FileMap, dir: &RelativePath) -> Vec<DirectoryEntry> {
    let mut dirs = BTreeSet::new();
    let mut entries = Vec::new();
    for (key, content) in files.iter().filter(|(key, _)| is_within(key, dir)) {
        let rest = key.as_str()[dir.as_str().len()..].trim_start_matches('/');
        match rest.split_once('/') {
            Some((child, _)) => {
                dirs.insert(child.to_owned());
            }
            None => entries.push(DirectoryEntry::file(rest, content.len() as u64)),
        }
    }
    entries.extend(dirs.into_iter().map(DirectoryEntry::directory));
    entries
}

fn entry_name(path: &RelativePath) -> String {
    path.file_name().unwrap_or_default().to_owned()
}

#[async_trait::async_trait]
impl Storage for MemStorage {
    fn address(&self) -> String {
        self.address.clone()
    }

    fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    async fn exists(&self, path: &RelativePath) -> bool {
        let files = self.files.read().await;
        files.contains_key(path) || has_children(&files, path)
    }

    async fn is_directory(&self, path: &RelativePath) -> bool {
        let files = self.files.read().await;
        !files.contains_key(path) && has_children(&files, path)
    }

    async fn file_details(&self, path: &RelativePath) -> Result<Entry> {
        let files = self.files.read().await;
        if let Some(content) = files.get(path) {
            return Ok(Entry::File(DocumentInfo::new(
                entry_name(path),
                content.clone(),
            )));
        }
        if has_children(&files, path) {
            return Ok(Entry::Directory(DirectoryInfo::new(
                entry_name(path),
                children(&files, path),
            )));
        }
        Err(Error::NotFound(path.to_owned()))
    }

    async fn list(&self, path: &RelativePath) -> Result<Vec<DirectoryEntry>> {
        let files = self.files.read().await;
        if files.contains_key(path) || !has_children(&files, path) {
            return Err(Error::NotFound(path.to_owned()));
        }
        Ok(children(&files, path))
    }

    async fn put_file(&self, path: &RelativePath, content: Bytes) -> Result<DocumentInfo> {
        let mut files = self.files.write().await;
        if let Some(file) = file_ancestor(&files, path) {
            return Err(Error::NotADirectory(file.to_owned()));
        }
        if has_children(&files, path) {
            return Err(Error::IsDirectory(path.to_owned()));
        }
        let old_size = files.get(path).map(|c| c.len() as u64).unwrap_or(0);
        self.capacity.resize(old_size, content.len() as u64)?;
        files.insert(path.to_owned(), content.clone());
        Ok(DocumentInfo::new(entry_name(path), content))
    }

    async fn remove_file(&self, path: &RelativePath) -> Result<()> {
        let mut files = self.files.write().await;
        if let Some(content) = files.remove(path) {
            self.capacity.release(content.len() as u64);
            return Ok(());
        }
        if !has_children(&files, path) {
            return Err(Error::NotFound(path.to_owned()));
        }
        let mut released = 0;
        files.retain(|key, content| {
            let keep = !is_within(key, path);
            if !keep {
                released += content.len() as u64;
            }
            keep
        });
        self.capacity.release(released);
        Ok(())
    }
}
