// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod backend;
mod fs;
mod handle;
mod mem;

pub use backend::Storage;
pub use fs::FsStorage;
pub use handle::StorageHandle;
pub use mem::MemStorage;
