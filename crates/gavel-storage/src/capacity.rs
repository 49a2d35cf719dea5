// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./capacity_test.rs"]
mod capacity_test;

/// Tracks the bytes held by a storage backend against an optional quota.
///
/// Usage is updated atomically so that concurrent writes against the
/// same backend cannot collectively overrun the quota.
#[derive(Debug, Default)]
pub struct Capacity {
    quota: Option<u64>,
    used: AtomicU64,
}

impl Capacity {
    pub fn new(quota: Option<u64>, used: u64) -> Self {
        Self {
            quota,
            used: AtomicU64::new(used),
        }
    }

    pub fn quota(&self) -> Option<u64> {
        self.quota
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    /// Bytes left before the quota is reached, if there is one.
    pub fn available(&self) -> Option<u64> {
        self.quota.map(|quota| quota.saturating_sub(self.used()))
    }

    /// True once usage has reached the quota.
    pub fn is_full(&self) -> bool {
        self.available() == Some(0)
    }

    /// Claim space for additional bytes, failing if the quota would be exceeded.
    pub fn reserve(&self, additional: u64) -> Result<()> {
        let Some(quota) = self.quota else {
            self.used.fetch_add(additional, Ordering::AcqRel);
            return Ok(());
        };
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(additional).filter(|total| *total <= quota)
            })
            .map(|_| ())
            .map_err(|used| Error::QuotaExceeded {
                requested: additional,
                available: quota.saturating_sub(used),
            })
    }

    /// Return previously claimed space.
    pub fn release(&self, amount: u64) {
        // never underflow, even if the accounting has drifted from disk
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(amount))
            });
    }

    /// Account for a file changing size from `old` to `new` bytes.
    pub fn resize(&self, old: u64, new: u64) -> Result<()> {
        if new > old {
            self.reserve(new - old)
        } else {
            self.release(old - new);
            Ok(())
        }
    }
}
