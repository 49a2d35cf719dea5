// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use rstest::fixture;

use crate::StorageHandle;

/// The types of temporary storage that can be created.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum RepoKind {
    Mem,
    Fs,
}

/// A temporary storage of some type for use in testing
pub struct TempStorage {
    pub storage: Arc<StorageHandle>,
    pub tmpdir: tempfile::TempDir,
}

impl std::ops::Deref for TempStorage {
    type Target = StorageHandle;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

pub fn init_logging() {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .without_time()
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(sub);
}

#[fixture]
pub fn memstorage() -> StorageHandle {
    StorageHandle::new_mem()
}

/// Create a temporary storage of the desired flavor
pub async fn make_storage(kind: RepoKind) -> TempStorage {
    tracing::trace!(?kind, "creating storage for test...");

    let tmpdir = tempfile::Builder::new()
        .prefix("gavel-test-storage")
        .tempdir()
        .expect("failed to establish tmpdir for storage");
    let storage = match kind {
        RepoKind::Fs => StorageHandle::open_fs(tmpdir.path().join("repo"))
            .await
            .expect("failed to establish temporary fs storage for test"),
        RepoKind::Mem => StorageHandle::new_mem(),
    };

    TempStorage {
        storage: Arc::new(storage),
        tmpdir,
    }
}
