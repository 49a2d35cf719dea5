// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gavel_engine::{AccessToken, DeployRequest};

use super::env::{Run, open_engine, report};

/// Store a file in a repository
#[derive(Args)]
pub struct Deploy {
    /// The repository to deploy into
    pub repository: String,

    /// The path to store the file at, eg: com/acme/lib/1.0/lib-1.0.jar
    pub gav: String,

    /// The local file to upload
    pub file: PathBuf,

    /// The name of the token to authorize with
    #[clap(long, env = "GAVEL_TOKEN")]
    pub token: Option<String>,

    /// Who is responsible for this deployment
    #[clap(long = "by", env = "USER", default_value = "unknown")]
    pub deployed_by: String,
}

#[async_trait::async_trait]
impl Run for Deploy {
    async fn run(&mut self) -> Result<i32> {
        let content = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let engine = open_engine().await?;
        let token = self
            .token
            .clone()
            .map(AccessToken::new)
            .unwrap_or_default();
        let request = DeployRequest::new(&self.repository, &self.gav, content)
            .with_token(token)
            .deployed_by(&self.deployed_by);
        match engine.deploy_file(request).await {
            Ok(doc) => {
                println!("{}", serde_json::to_string_pretty(&doc)?);
                Ok(0)
            }
            Err(err) => Ok(report(&err)),
        }
    }
}
