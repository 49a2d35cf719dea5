// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Resolution of version aliases within a repository.

use gavel_foundation::metadata::is_metadata_file;
use gavel_foundation::snapshot::SnapshotRequest;
use gavel_foundation::version::{LATEST_ALIAS, latest_release};
use gavel_foundation::{GavPath, Version};
use gavel_storage::Storage;
use relative_path::RelativePath;
use serde::Serialize;

use crate::ErrorResponse;

#[cfg(test)]
#[path = "./metadata_test.rs"]
mod metadata_test;

/// The newest release of an artifact.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VersionInfo {
    /// The artifact coordinate, eg: `com/acme/lib`
    pub coordinate: String,
    pub version: Version,
    /// The version directory, eg: `com/acme/lib/2.0`
    pub path: GavPath,
}

/// The outcome of resolving a requested path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The path does not use an alias, or the alias could not be
    /// resolved locally and is left for upstreams.
    Unchanged,
    /// The alias names this concrete file.
    Path(GavPath),
    /// The path asked for the newest version of an artifact.
    Version(VersionInfo),
}

/// Resolve `latest` and `-SNAPSHOT` aliases against local storage.
///
/// A path that is stored as given is never treated as an alias.
///
/// # Errors:
/// - NotFound: if the artifact exists but has no release versions
pub async fn resolve(storage: &dyn Storage, path: &GavPath) -> Result<Resolution, ErrorResponse> {
    let file_name = path.file_name();
    if is_metadata_file(file_name) {
        return Ok(Resolution::Unchanged);
    }

    let names_latest = file_name == LATEST_ALIAS || path.parent_name() == Some(LATEST_ALIAS);
    if names_latest && storage.exists(path).await {
        // a group or artifact literally called `latest`
        return Ok(Resolution::Unchanged);
    }

    if file_name == LATEST_ALIAS {
        let coordinate = path.parent();
        return Ok(match latest_version(storage, coordinate).await? {
            Some(version) => Resolution::Version(VersionInfo {
                coordinate: coordinate.to_string(),
                path: GavPath::parse(coordinate.join(version.as_str()).as_str())
                    .map_err(|err| ErrorResponse::bad_request(err.to_string()))?,
                version,
            }),
            None => Resolution::Unchanged,
        });
    }

    if path.parent_name() == Some(LATEST_ALIAS) {
        let Some(coordinate) = path.parent().parent().filter(|c| !c.as_str().is_empty()) else {
            return Ok(Resolution::Unchanged);
        };
        let Some(version) = latest_version(storage, coordinate).await? else {
            return Ok(Resolution::Unchanged);
        };
        let artifact = coordinate.file_name().unwrap_or_default();
        let file_name = match file_name.strip_prefix(&format!("{artifact}-{LATEST_ALIAS}")) {
            Some(rest) if !artifact.is_empty() => format!("{artifact}-{version}{rest}"),
            _ => file_name.to_owned(),
        };
        let resolved = coordinate.join(version.as_str()).join(file_name);
        tracing::debug!(%path, %resolved, "resolved latest version");
        return GavPath::parse(resolved.as_str())
            .map(Resolution::Path)
            .map_err(|err| ErrorResponse::bad_request(err.to_string()));
    }

    if let Some(request) = SnapshotRequest::parse(file_name) {
        if storage.exists(path).await {
            return Ok(Resolution::Unchanged);
        }
        let Ok(entries) = storage.list(path.parent()).await else {
            return Ok(Resolution::Unchanged);
        };
        let newest = request.newest(
            entries
                .iter()
                .filter(|entry| !entry.is_directory())
                .map(|entry| entry.name.as_str()),
        );
        if let Some(newest) = newest {
            tracing::debug!(%path, snapshot = newest, "resolved snapshot build");
            return path
                .with_file_name(newest)
                .map(Resolution::Path)
                .map_err(|err| ErrorResponse::bad_request(err.to_string()));
        }
    }

    Ok(Resolution::Unchanged)
}

/// Find the newest release under an artifact coordinate.
///
/// Returns `None` when the coordinate is not stored locally.
async fn latest_version(
    storage: &dyn Storage,
    coordinate: &RelativePath,
) -> Result<Option<Version>, ErrorResponse> {
    let entries = match storage.list(coordinate).await {
        Ok(entries) => entries,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let versions = entries
        .iter()
        .filter(|entry| entry.is_directory())
        .map(|entry| entry.name.as_str());
    match latest_release(versions) {
        Some(version) => Ok(Some(version)),
        None => Err(ErrorResponse::not_found(format!(
            "No release versions found for {coordinate}"
        ))),
    }
}
