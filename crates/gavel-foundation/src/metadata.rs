// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

#[cfg(test)]
#[path = "./metadata_test.rs"]
mod metadata_test;

pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Extensions of the checksum files that accompany any deployed file.
pub const CHECKSUM_EXTENSIONS: &[&str] = &["md5", "sha1", "sha256", "sha512", "asc"];

/// True if the file name is an index descriptor rather than a versioned artifact.
///
/// This covers the descriptor itself, its checksums and signature, and
/// the per-repository variants some tools write (`maven-metadata-local.xml`).
pub fn is_metadata_file(file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix("maven-metadata") else {
        return false;
    };
    let Some(xml_at) = rest.find(".xml") else {
        return false;
    };
    let qualifier = &rest[..xml_at];
    if !qualifier.is_empty()
        && !(qualifier.starts_with('-') && qualifier.len() > 1 && !qualifier.contains('.'))
    {
        return false;
    }
    match &rest[xml_at + ".xml".len()..] {
        "" => true,
        ext => ext
            .strip_prefix('.')
            .is_some_and(|ext| CHECKSUM_EXTENSIONS.contains(&ext)),
    }
}

/// The content type to report for a stored file, from its name.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "jar" | "war" | "ear" | "aar" => "application/java-archive",
        "pom" | "xml" => "application/xml",
        "json" | "module" => "application/json",
        "md5" | "sha1" | "sha256" | "sha512" => "text/plain",
        "asc" => "application/pgp-signature",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        _ => "application/octet-stream",
    }
}
