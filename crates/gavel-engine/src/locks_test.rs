// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gavel_foundation::{GavPath, repo_name};
use rstest::rstest;

use super::PathLocks;

#[rstest]
#[tokio::test]
async fn test_lock_released_on_drop() {
    let locks = PathLocks::new();
    let repo = repo_name!("releases");
    let path = GavPath::parse("g/a/1.0/a-1.0.jar").unwrap();
    {
        let _guard = locks.lock(&repo, &path).await;
        assert_eq!(locks.len(), 1);
    }
    assert!(locks.is_empty());
    let _guard = locks.lock(&repo, &path).await;
}

#[rstest]
#[tokio::test]
async fn test_distinct_paths_do_not_contend() {
    let locks = PathLocks::new();
    let repo = repo_name!("releases");
    let first = GavPath::parse("g/a/1.0/a-1.0.jar").unwrap();
    let second = GavPath::parse("g/a/2.0/a-2.0.jar").unwrap();
    let _a = locks.lock(&repo, &first).await;
    let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock(&repo, &second))
        .await
        .expect("a different path should not wait");
    let other_repo = repo_name!("snapshots");
    let _c = tokio::time::timeout(Duration::from_secs(1), locks.lock(&other_repo, &first))
        .await
        .expect("the same path in another repository should not wait");
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_path_is_exclusive() {
    let locks = Arc::new(PathLocks::new());
    let holders = Arc::new(AtomicUsize::new(0));
    let repo = repo_name!("releases");
    let path = GavPath::parse("g/a/1.0/a-1.0.jar").unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let holders = Arc::clone(&holders);
            let repo = repo.clone();
            let path = path.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&repo, &path).await;
                assert_eq!(holders.fetch_add(1, Ordering::SeqCst), 0);
                tokio::time::sleep(Duration::from_millis(5)).await;
                holders.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert!(locks.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_tree_lock_excludes_path_locks() {
    let locks = PathLocks::new();
    let repo = repo_name!("releases");
    let path = GavPath::parse("g/a/1.0/a-1.0.jar").unwrap();

    let held = locks.lock(&repo, &path).await;
    tokio::time::timeout(Duration::from_millis(50), locks.lock_tree(&repo))
        .await
        .expect_err("tree lock waits for outstanding path locks");
    drop(held);

    let tree = locks.lock_tree(&repo).await;
    let other = GavPath::parse("g/b/2.0/b-2.0.jar").unwrap();
    tokio::time::timeout(Duration::from_millis(50), locks.lock(&repo, &other))
        .await
        .expect_err("path locks wait for the tree lock");
    let other_repo = repo_name!("snapshots");
    let _free = tokio::time::timeout(Duration::from_secs(1), locks.lock(&other_repo, &other))
        .await
        .expect("other repositories are not affected");
    drop(tree);
    let _guard = locks.lock(&repo, &other).await;
}
