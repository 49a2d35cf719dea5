// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Byte-level storage of repository contents.

#![deny(unsafe_op_in_unsafe_fn)]

mod capacity;
mod entry;
mod error;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
mod storage;

pub use capacity::Capacity;
pub use entry::{Checksums, DirectoryEntry, DirectoryInfo, DocumentInfo, Entry, EntryKind};
pub use error::{Error, Result};
pub use storage::{FsStorage, MemStorage, Storage, StorageHandle};
