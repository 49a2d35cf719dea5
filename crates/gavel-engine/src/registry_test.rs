// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use gavel_config::{Config, FileFormat, Visibility};
use gavel_foundation::repo_name;
use gavel_storage::StorageHandle;
use rstest::rstest;

use super::{Repository, RepositoryRegistry};
use crate::Error;

#[rstest]
fn test_register_keeps_order_and_rejects_duplicates() {
    let mut registry = RepositoryRegistry::new();
    for name in ["snapshots", "releases", "central"] {
        registry
            .register(Repository::new(
                gavel_foundation::RepositoryName::new(name).unwrap(),
                StorageHandle::new_mem(),
            ))
            .unwrap();
    }
    let names: Vec<_> = registry
        .repositories()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, ["snapshots", "releases", "central"]);

    let err = registry
        .register(Repository::new(repo_name!("releases"), StorageHandle::new_mem()))
        .expect_err("names must be unique");
    assert!(matches!(err, Error::DuplicateRepository(_)), "{err:?}");
    assert_eq!(registry.len(), 3);
}

#[rstest]
fn test_get_repository() {
    let mut registry = RepositoryRegistry::new();
    registry
        .register(Repository::new(repo_name!("releases"), StorageHandle::new_mem()))
        .unwrap();
    assert!(registry.get_repository("releases").is_some());
    assert!(registry.get_repository("Releases").is_none());
    assert!(registry.get_repository("").is_none());
}

#[rstest]
#[tokio::test]
async fn test_registry_from_config() {
    let tmpdir = tempfile::tempdir().unwrap();
    let source = format!(
        r#"
server:
  storage_root: {}
repositories:
  - name: releases
    quota: 10
  - name: snapshots
    kind: mem
    redeployment: true
  - name: public
    kind: mem
    visibility: hidden
    upstreams: [releases, snapshots]
"#,
        tmpdir.path().display()
    );
    let config = Config::from_str_with_format(source, FileFormat::Yaml).unwrap();
    let registry = RepositoryRegistry::from_config(&config).await.unwrap();
    assert_eq!(registry.len(), 3);

    let releases = registry.get_repository("releases").unwrap();
    assert!(releases.storage().is_fs());
    assert_eq!(releases.storage().capacity().quota(), Some(10));
    assert!(!releases.redeployment());
    assert!(!releases.is_proxy());
    assert!(tmpdir.path().join("releases").is_dir());

    let snapshots = registry.get_repository("snapshots").unwrap();
    assert!(snapshots.storage().is_mem());
    assert!(snapshots.redeployment());

    let public = registry.get_repository("public").unwrap();
    assert_eq!(public.visibility(), Visibility::Hidden);
    let upstreams: Vec<_> = public.upstreams().iter().map(|u| u.name()).collect();
    assert_eq!(upstreams, ["releases", "snapshots"]);
}
