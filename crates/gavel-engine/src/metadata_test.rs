// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use bytes::Bytes;
use gavel_foundation::GavPath;
use gavel_storage::fixtures::*;
use gavel_storage::StorageHandle;
use rstest::rstest;

use super::{Resolution, resolve};
use crate::ErrorKind;

async fn put(storage: &StorageHandle, path: &str, content: &'static [u8]) {
    storage
        .put_file(GavPath::parse(path).unwrap().as_relative_path(), Bytes::from_static(content))
        .await
        .unwrap();
}

fn gav(path: &str) -> GavPath {
    GavPath::parse(path).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_latest_uses_version_ordering(memstorage: StorageHandle) {
    for version in ["1.2", "1.9", "1.10", "2.0", "2.1-SNAPSHOT", "3.0-rc1"] {
        put(&memstorage, &format!("com/acme/lib/{version}/lib.pom"), b"pom").await;
    }
    put(&memstorage, "com/acme/lib/maven-metadata.xml", b"<metadata/>").await;

    let Resolution::Version(info) = resolve(&*memstorage, &gav("com/acme/lib/latest"))
        .await
        .unwrap()
    else {
        panic!("expected a version");
    };
    assert_eq!(info.version.as_str(), "2.0");
    assert_eq!(info.coordinate, "com/acme/lib");
    assert_eq!(info.path.as_str(), "com/acme/lib/2.0");
}

#[rstest]
#[tokio::test]
async fn test_latest_without_releases_is_not_found(memstorage: StorageHandle) {
    put(&memstorage, "com/acme/lib/1.0-SNAPSHOT/lib.pom", b"pom").await;
    put(&memstorage, "com/acme/lib/not-a-version/lib.pom", b"pom").await;

    let err = resolve(&*memstorage, &gav("com/acme/lib/latest"))
        .await
        .expect_err("no releases should be found");
    assert_eq!(err.status, ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn test_latest_of_unknown_artifact_is_unchanged(memstorage: StorageHandle) {
    let resolution = resolve(&*memstorage, &gav("com/acme/lib/latest")).await.unwrap();
    assert_eq!(resolution, Resolution::Unchanged);
    let resolution = resolve(&*memstorage, &gav("com/acme/lib/latest/lib-latest.jar"))
        .await
        .unwrap();
    assert_eq!(resolution, Resolution::Unchanged);
}

#[rstest]
#[tokio::test]
async fn test_latest_version_segment_is_substituted(memstorage: StorageHandle) {
    put(&memstorage, "com/acme/lib/1.9/lib-1.9.jar", b"old").await;
    put(&memstorage, "com/acme/lib/1.10/lib-1.10.jar", b"new").await;

    let resolution = resolve(&*memstorage, &gav("com/acme/lib/latest/lib-latest.jar"))
        .await
        .unwrap();
    assert_eq!(
        resolution,
        Resolution::Path(gav("com/acme/lib/1.10/lib-1.10.jar"))
    );
    let resolution = resolve(&*memstorage, &gav("com/acme/lib/latest/lib.pom"))
        .await
        .unwrap();
    assert_eq!(resolution, Resolution::Path(gav("com/acme/lib/1.10/lib.pom")));
}

#[rstest]
#[tokio::test]
async fn test_snapshot_resolves_to_newest_build(memstorage: StorageHandle) {
    for file in [
        "lib-1.0-20240101.101010-1.jar",
        "lib-1.0-20240301.090000-3.jar",
        "lib-1.0-20240301.090000-3-sources.jar",
        "lib-1.0-20240201.000000-2.jar",
    ] {
        put(&memstorage, &format!("com/acme/lib/1.0-SNAPSHOT/{file}"), b"jar").await;
    }

    let resolution = resolve(&*memstorage, &gav("com/acme/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar"))
        .await
        .unwrap();
    assert_eq!(
        resolution,
        Resolution::Path(gav("com/acme/lib/1.0-SNAPSHOT/lib-1.0-20240301.090000-3.jar"))
    );

    let resolution = resolve(
        &*memstorage,
        &gav("com/acme/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT-sources.jar"),
    )
    .await
    .unwrap();
    assert_eq!(
        resolution,
        Resolution::Path(gav(
            "com/acme/lib/1.0-SNAPSHOT/lib-1.0-20240301.090000-3-sources.jar"
        ))
    );
}

#[rstest]
#[tokio::test]
async fn test_literal_snapshot_file_wins(memstorage: StorageHandle) {
    put(&memstorage, "com/acme/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar", b"jar").await;
    put(&memstorage, "com/acme/lib/1.0-SNAPSHOT/lib-1.0-20240101.101010-1.jar", b"jar").await;

    let resolution = resolve(&*memstorage, &gav("com/acme/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar"))
        .await
        .unwrap();
    assert_eq!(resolution, Resolution::Unchanged);
}

#[rstest]
#[case::metadata("com/acme/lib/maven-metadata.xml")]
#[case::metadata_checksum("com/acme/lib/1.0-SNAPSHOT/maven-metadata.xml.sha1")]
#[case::plain_file("com/acme/lib/1.0/lib-1.0.jar")]
#[case::snapshot_without_builds("com/acme/other/1.0-SNAPSHOT/other-1.0-SNAPSHOT.jar")]
#[tokio::test]
async fn test_paths_left_unchanged(memstorage: StorageHandle, #[case] path: &str) {
    put(&memstorage, "com/acme/lib/1.0-SNAPSHOT/lib-1.0-20240101.101010-1.jar", b"jar").await;
    let resolution = resolve(&*memstorage, &gav(path)).await.unwrap();
    assert_eq!(resolution, Resolution::Unchanged);
}

#[rstest]
#[case::group("org/latest/lib")]
#[case::group_file("org/latest/lib/1.0/lib-1.0.jar")]
#[case::artifact_version("com/acme/latest/1.0")]
#[case::artifact("com/acme/latest")]
#[tokio::test]
async fn test_stored_latest_segments_are_literal(memstorage: StorageHandle, #[case] path: &str) {
    put(&memstorage, "org/latest/lib/1.0/lib-1.0.jar", b"jar").await;
    put(&memstorage, "com/acme/latest/1.0/latest-1.0.jar", b"jar").await;
    let resolution = resolve(&*memstorage, &gav(path)).await.unwrap();
    assert_eq!(resolution, Resolution::Unchanged);
}
