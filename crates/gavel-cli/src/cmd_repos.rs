// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::env::{Run, open_engine};

/// List the configured repositories
#[derive(Args)]
pub struct Repos {}

#[async_trait::async_trait]
impl Run for Repos {
    async fn run(&mut self) -> Result<i32> {
        let engine = open_engine().await?;
        for repo in engine.repositories() {
            let storage = repo.storage();
            let capacity = storage.capacity();
            let quota = match capacity.quota() {
                Some(quota) => format!("{}/{quota} bytes", capacity.used()),
                None => format!("{} bytes", capacity.used()),
            };
            let upstreams: Vec<_> = repo.upstreams().iter().map(|u| u.name()).collect();
            println!(
                "{} {} visibility={:?} redeployment={} used={} upstreams=[{}]",
                repo.name().as_str().bold(),
                storage.address(),
                repo.visibility(),
                repo.redeployment(),
                quota,
                upstreams.join(", "),
            );
        }
        Ok(0)
    }
}
