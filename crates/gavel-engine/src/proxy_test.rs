// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use gavel_foundation::{GavPath, repo_name};
use gavel_storage::{Entry, StorageHandle};
use rstest::rstest;

use super::{NoProxy, ProxyClient, RepositoryUpstream, Upstream, UpstreamProxy};
use crate::{ErrorKind, FileDetails, Repository, Result};

/// An upstream with a fixed answer that counts how often it is asked.
#[derive(Debug)]
struct StaticUpstream {
    name: &'static str,
    answer: std::result::Result<Option<&'static [u8]>, &'static str>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticUpstream {
    fn new(name: &'static str, answer: std::result::Result<Option<&'static [u8]>, &'static str>) -> Self {
        Self {
            name,
            answer,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Upstream for StaticUpstream {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _path: &GavPath) -> Result<Option<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.answer {
            Ok(content) => Ok(content.map(Bytes::from_static)),
            Err(err) => Err(err.into()),
        }
    }
}

fn gav(path: &str) -> GavPath {
    GavPath::parse(path).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_first_hit_is_cached() {
    let missing = Arc::new(StaticUpstream::new("missing", Ok(None)));
    let broken = Arc::new(StaticUpstream::new("broken", Err("connection refused")));
    let central = Arc::new(StaticUpstream::new("central", Ok(Some(b"jar"))));
    let never = Arc::new(StaticUpstream::new("never", Ok(Some(b"other"))));
    let repo = Repository::new(repo_name!("proxy"), StorageHandle::new_mem())
        .with_upstream(missing.clone())
        .with_upstream(broken.clone())
        .with_upstream(central.clone())
        .with_upstream(never.clone());
    let path = gav("com/acme/lib/1.0/lib-1.0.jar");

    let details = UpstreamProxy::new(Arc::default()).find_file(&repo, &path).await.unwrap();
    let FileDetails::Document(doc) = details else {
        panic!("expected a document, got {details:?}");
    };
    assert_eq!(doc.content.as_ref(), b"jar");
    assert_eq!((missing.calls(), broken.calls(), central.calls(), never.calls()), (1, 1, 1, 0));

    let Entry::File(cached) = repo.storage().file_details(&path).await.unwrap() else {
        panic!("expected the file to be cached");
    };
    assert_eq!(cached.checksums, doc.checksums);
}

#[rstest]
#[tokio::test]
async fn test_nothing_found_upstream() {
    let repo = Repository::new(repo_name!("proxy"), StorageHandle::new_mem())
        .with_upstream(Arc::new(StaticUpstream::new("missing", Ok(None))));
    let err = UpstreamProxy::new(Arc::default())
        .find_file(&repo, &gav("a/b/1.0/b-1.0.jar"))
        .await
        .expect_err("nothing upstream");
    assert_eq!(err.status, ErrorKind::NotFound);
    assert_eq!(err.message, "File not found");

    let err = NoProxy
        .find_file(&repo, &gav("a/b/1.0/b-1.0.jar"))
        .await
        .expect_err("no proxy");
    assert_eq!(err.status, ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn test_full_repository_serves_without_caching() {
    let storage = StorageHandle::new_mem().with_quota(Some(0));
    let repo = Repository::new(repo_name!("proxy"), storage)
        .with_upstream(Arc::new(StaticUpstream::new("central", Ok(Some(b"jar")))));
    let path = gav("com/acme/lib/1.0/lib-1.0.jar");

    let details = UpstreamProxy::new(Arc::default()).find_file(&repo, &path).await.unwrap();
    assert!(matches!(details, FileDetails::Document(doc) if doc.size == 3));
    assert!(!repo.storage().exists(&path).await);
}

#[rstest]
#[tokio::test]
async fn test_quota_exceeded_serves_without_caching() {
    let storage = StorageHandle::new_mem().with_quota(Some(2));
    let repo = Repository::new(repo_name!("proxy"), storage)
        .with_upstream(Arc::new(StaticUpstream::new("central", Ok(Some(b"jar")))));
    let path = gav("com/acme/lib/1.0/lib-1.0.jar");

    let details = UpstreamProxy::new(Arc::default()).find_file(&repo, &path).await.unwrap();
    assert!(matches!(details, FileDetails::Document(doc) if doc.content.as_ref() == b"jar"));
    assert!(!repo.storage().exists(&path).await);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_slow_upstream_times_out() {
    let slow = Arc::new(StaticUpstream::new("slow", Ok(Some(b"slow"))).delayed(Duration::from_secs(60)));
    let fast = Arc::new(StaticUpstream::new("fast", Ok(Some(b"fast"))));
    let repo = Repository::new(repo_name!("proxy"), StorageHandle::new_mem())
        .with_upstream(slow.clone())
        .with_upstream(fast.clone());

    let proxy = UpstreamProxy::new(Arc::default()).with_timeout(Some(Duration::from_secs(1)));
    let details = proxy
        .find_file(&repo, &gav("com/acme/lib/1.0/lib-1.0.jar"))
        .await
        .unwrap();
    assert!(matches!(details, FileDetails::Document(doc) if doc.content.as_ref() == b"fast"));
    assert_eq!(slow.calls(), 1);
}

#[rstest]
#[tokio::test]
async fn test_repository_upstream() {
    let storage = StorageHandle::new_mem();
    let path = gav("com/acme/lib/1.0/lib-1.0.jar");
    storage.put_file(&path, Bytes::from_static(b"jar")).await.unwrap();
    let upstream = RepositoryUpstream::new(repo_name!("releases"), storage);

    assert_eq!(upstream.name(), "releases");
    assert_eq!(
        upstream.fetch(&path).await.unwrap(),
        Some(Bytes::from_static(b"jar"))
    );
    // directories are never served as files
    assert_eq!(upstream.fetch(&gav("com/acme/lib")).await.unwrap(), None);
    assert_eq!(upstream.fetch(&gav("com/acme/missing")).await.unwrap(), None);
}
