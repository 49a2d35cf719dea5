// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::{content_type_for, is_metadata_file};

#[rstest]
#[case("maven-metadata.xml", true)]
#[case("maven-metadata.xml.sha1", true)]
#[case("maven-metadata.xml.md5", true)]
#[case("maven-metadata-local.xml", true)]
#[case("maven-metadata.xml.bak", false)]
#[case("maven-metadata.json", false)]
#[case("maven-metadata-.xml", false)]
#[case("lib-1.0.pom", false)]
#[case("my-maven-metadata.xml", false)]
fn test_is_metadata_file(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_metadata_file(name), expected, "{name}");
}

#[rstest]
#[case("lib-1.0.jar", "application/java-archive")]
#[case("lib-1.0.pom", "application/xml")]
#[case("lib-1.0.jar.sha1", "text/plain")]
#[case("lib-1.0.module", "application/json")]
#[case("README", "application/octet-stream")]
fn test_content_type_for(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(content_type_for(name), expected);
}
