// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gavel_engine::{AccessToken, FileDetails, LookupRequest};

use super::env::{Run, open_engine, report};

/// Look up a file or directory in a repository
#[derive(Args)]
pub struct Find {
    /// The repository to look in
    pub repository: String,

    /// The path of the file or directory, eg: com/acme/lib/1.0/lib-1.0.jar
    pub gav: String,

    /// The name of the token to authorize with
    #[clap(long, env = "GAVEL_TOKEN")]
    pub token: Option<String>,

    /// Write the file content here instead of printing its details
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

#[async_trait::async_trait]
impl Run for Find {
    async fn run(&mut self) -> Result<i32> {
        let engine = open_engine().await?;
        let token = self
            .token
            .clone()
            .map(AccessToken::new)
            .unwrap_or_default();
        let request = LookupRequest::new(&self.repository, &self.gav).with_token(token);
        let details = match engine.find_file(request).await {
            Ok(details) => details,
            Err(err) => return Ok(report(&err)),
        };

        if let (Some(output), FileDetails::Document(doc)) = (&self.output, &details) {
            tokio::fs::write(output, &doc.content)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(size = doc.size, "saved {}", output.display());
            return Ok(0);
        }
        println!("{}", serde_json::to_string_pretty(&details)?);
        Ok(0)
    }
}
