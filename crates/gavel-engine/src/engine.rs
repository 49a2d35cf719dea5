// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use bytes::Bytes;
use gavel_foundation::GavPath;
use gavel_foundation::metadata::is_metadata_file;
use gavel_storage::{DirectoryInfo, DocumentInfo, Entry};
use serde::Serialize;

use crate::metadata::{self, Resolution, VersionInfo};
use crate::{
    AccessToken,
    ErrorResponse,
    PathLocks,
    ProxyClient,
    Repository,
    RepositoryRegistry,
    SecurityGate,
};

#[cfg(test)]
#[path = "./engine_test.rs"]
mod engine_test;

type Response<T> = std::result::Result<T, ErrorResponse>;

/// A request to read a file or list a directory.
#[derive(Clone, Debug)]
pub struct LookupRequest {
    pub repository: String,
    pub gav: String,
    pub token: AccessToken,
}

impl LookupRequest {
    pub fn new<R: Into<String>, G: Into<String>>(repository: R, gav: G) -> Self {
        Self {
            repository: repository.into(),
            gav: gav.into(),
            token: AccessToken::anonymous(),
        }
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = token;
        self
    }
}

/// A request to store a file.
#[derive(Clone, Debug)]
pub struct DeployRequest {
    pub repository: String,
    pub gav: String,
    pub token: AccessToken,
    pub content: Bytes,
    /// Who is responsible for this deployment, for the record
    pub deployed_by: String,
}

impl DeployRequest {
    pub fn new<R, G, C>(repository: R, gav: G, content: C) -> Self
    where
        R: Into<String>,
        G: Into<String>,
        C: Into<Bytes>,
    {
        Self {
            repository: repository.into(),
            gav: gav.into(),
            token: AccessToken::anonymous(),
            content: content.into(),
            deployed_by: String::new(),
        }
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = token;
        self
    }

    pub fn deployed_by<S: Into<String>>(mut self, deployed_by: S) -> Self {
        self.deployed_by = deployed_by.into();
        self
    }
}

/// A request to remove a file or directory.
#[derive(Clone, Debug)]
pub struct DeleteRequest {
    pub repository: String,
    pub gav: String,
    pub token: AccessToken,
}

impl DeleteRequest {
    pub fn new<R: Into<String>, G: Into<String>>(repository: R, gav: G) -> Self {
        Self {
            repository: repository.into(),
            gav: gav.into(),
            token: AccessToken::anonymous(),
        }
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = token;
        self
    }
}

/// Whatever a lookup resolved to.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileDetails {
    Document(DocumentInfo),
    Directory(DirectoryInfo),
    Version(VersionInfo),
}

impl From<Entry> for FileDetails {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::File(doc) => FileDetails::Document(doc),
            Entry::Directory(dir) => FileDetails::Directory(dir),
        }
    }
}

/// Looks up, stores and removes artifacts across the registered repositories.
///
/// Each operation checks, in order: that the repository exists, that the
/// path is a valid coordinate, and that the caller is authorized, before
/// anything about the requested resource is revealed or changed.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<RepositoryRegistry>,
    gate: Arc<dyn SecurityGate>,
    proxy: Arc<dyn ProxyClient>,
    locks: Arc<PathLocks>,
}

impl Engine {
    pub fn new(
        registry: Arc<RepositoryRegistry>,
        gate: Arc<dyn SecurityGate>,
        proxy: Arc<dyn ProxyClient>,
        locks: Arc<PathLocks>,
    ) -> Self {
        Self {
            registry,
            gate,
            proxy,
            locks,
        }
    }

    /// All configured repositories, in configuration order.
    pub fn repositories(&self) -> Vec<Arc<Repository>> {
        self.registry.repositories()
    }

    /// Find a file or directory, falling back to upstreams when it is
    /// not stored locally.
    pub async fn find_file(&self, request: LookupRequest) -> Response<FileDetails> {
        let Some(repository) = self.registry.get_repository(&request.repository) else {
            return Err(ErrorResponse::not_found("Repository not found"));
        };
        let path = GavPath::parse(&request.gav)
            .map_err(|err| ErrorResponse::bad_request(err.to_string()))?;
        if !self
            .gate
            .can_access_resource(&request.token, &repository, &path)
            .await
        {
            return Err(ErrorResponse::unauthorized("Unauthorized access request"));
        }

        let resolved = match metadata::resolve(&**repository.storage(), &path).await? {
            Resolution::Unchanged => path.clone(),
            Resolution::Path(resolved) => {
                self.authorize_resolved(&request.token, &repository, &resolved)
                    .await?;
                resolved
            }
            Resolution::Version(info) => {
                self.authorize_resolved(&request.token, &repository, &info.path)
                    .await?;
                return Ok(FileDetails::Version(info));
            }
        };

        let storage = repository.storage();
        if !storage.exists(&resolved).await {
            tracing::debug!(repository = %repository.name(), %path, "not stored locally, asking upstreams");
            return self.proxy.find_file(&repository, &path).await;
        }

        if storage.is_directory(&resolved).await
            && !self
                .gate
                .can_browse_resource(&request.token, &repository, &resolved)
                .await
        {
            return Err(ErrorResponse::unauthorized("Unauthorized indexing request"));
        }

        Ok(storage.file_details(&resolved).await?.into())
    }

    /// Store a file, refusing to overwrite released artifacts.
    pub async fn deploy_file(&self, request: DeployRequest) -> Response<DocumentInfo> {
        let Some(repository) = self.registry.get_repository(&request.repository) else {
            return Err(ErrorResponse::not_found("Repository not found"));
        };
        let Ok(path) = GavPath::parse(&request.gav) else {
            return Err(ErrorResponse::bad_request("Invalid GAV"));
        };
        if !self
            .gate
            .can_modify_resource(&request.token, &repository, &path)
            .await
        {
            return Err(ErrorResponse::unauthorized("Unauthorized deploy request"));
        }

        let _guard = self.locks.lock(repository.name(), &path).await;
        let storage = repository.storage();
        if !repository.redeployment()
            && !is_metadata_file(path.file_name())
            && storage.exists(&path).await
        {
            return Err(ErrorResponse::conflict("Redeployment is not allowed"));
        }
        if repository.is_full() {
            return Err(ErrorResponse::insufficient_storage("Not enough storage space available"));
        }

        let size = request.content.len();
        let doc = storage.put_file(&path, request.content).await?;
        tracing::info!(
            repository = %repository.name(),
            %path,
            deployed_by = %request.deployed_by,
            size,
            "deployed file"
        );
        Ok(doc)
    }

    /// Remove a file or directory tree.
    pub async fn delete_file(&self, request: DeleteRequest) -> Response<()> {
        let Some(repository) = self.registry.get_repository(&request.repository) else {
            return Err(ErrorResponse::not_found(format!(
                "Repository {} not found",
                request.repository
            )));
        };
        let Ok(path) = GavPath::parse(&request.gav) else {
            return Err(ErrorResponse::not_found("Invalid GAV"));
        };
        if !self
            .gate
            .can_modify_resource(&request.token, &repository, &path)
            .await
        {
            return Err(ErrorResponse::unauthorized("Unauthorized delete request"));
        }

        // a removed tree may hold paths other writers are locking
        let _guard = self.locks.lock_tree(repository.name()).await;
        repository.storage().remove_file(&path).await?;
        tracing::info!(repository = %repository.name(), %path, "deleted file");
        Ok(())
    }

    async fn authorize_resolved(
        &self,
        token: &AccessToken,
        repository: &Repository,
        resolved: &GavPath,
    ) -> Response<()> {
        if self
            .gate
            .can_access_resource(token, repository, resolved)
            .await
        {
            Ok(())
        } else {
            Err(ErrorResponse::unauthorized("Unauthorized access request"))
        }
    }
}
