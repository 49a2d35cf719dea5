// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::Result;
use clap::Args;
use gavel_engine::{AccessToken, DeleteRequest};

use super::env::{Run, open_engine, report};

/// Remove a file or directory from a repository
#[derive(Args)]
pub struct Delete {
    /// The repository to remove from
    pub repository: String,

    /// The path of the file or directory to remove
    pub gav: String,

    /// The name of the token to authorize with
    #[clap(long, env = "GAVEL_TOKEN")]
    pub token: Option<String>,
}

#[async_trait::async_trait]
impl Run for Delete {
    async fn run(&mut self) -> Result<i32> {
        let engine = open_engine().await?;
        let token = self
            .token
            .clone()
            .map(AccessToken::new)
            .unwrap_or_default();
        let request = DeleteRequest::new(&self.repository, &self.gav).with_token(token);
        match engine.delete_file(request).await {
            Ok(()) => {
                tracing::info!("removed {}/{}", self.repository, self.gav);
                Ok(0)
            }
            Err(err) => Ok(report(&err)),
        }
    }
}
