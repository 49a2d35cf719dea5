// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use bytes::Bytes;
use data_encoding::HEXLOWER;
use gavel_foundation::metadata::content_type_for;
use serde::Serialize;

/// Hex digests of a stored document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Checksums {
    pub sha1: String,
    pub sha256: String,
}

impl Checksums {
    pub fn compute(content: &[u8]) -> Self {
        let sha1 = ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, content);
        let sha256 = ring::digest::digest(&ring::digest::SHA256, content);
        Self {
            sha1: HEXLOWER.encode(sha1.as_ref()),
            sha256: HEXLOWER.encode(sha256.as_ref()),
        }
    }
}

/// A stored file and its descriptors.
#[derive(Clone, Debug, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub content_type: &'static str,
    pub size: u64,
    pub checksums: Checksums,
    #[serde(skip)]
    pub content: Bytes,
}

impl DocumentInfo {
    pub fn new<S: Into<String>>(name: S, content: Bytes) -> Self {
        let name = name.into();
        Self {
            content_type: content_type_for(&name),
            size: content.len() as u64,
            checksums: Checksums::compute(&content),
            name,
            content,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    // declared first so that directories sort ahead of files
    Directory,
    File,
}

/// One child of a listed directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

impl DirectoryEntry {
    pub fn file<S: Into<String>>(name: S, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn directory<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A listed directory.
#[derive(Clone, Debug, Serialize)]
pub struct DirectoryInfo {
    pub name: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryInfo {
    /// Build a listing, ordering directories first and then by name.
    pub fn new<S: Into<String>>(name: S, mut entries: Vec<DirectoryEntry>) -> Self {
        entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// Whatever is found at a path in storage.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    File(DocumentInfo),
    Directory(DirectoryInfo),
}
