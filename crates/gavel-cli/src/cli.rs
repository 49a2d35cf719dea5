// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk
//! Main entry points and utilities for command line interface and interaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod cmd_delete;
mod cmd_deploy;
mod cmd_find;
mod cmd_repos;
mod env;

#[cfg(test)]
#[path = "./cli_test.rs"]
mod cli_test;

pub use env::{Run, configure_logging};

/// An artifact repository manager
#[derive(Parser)]
#[clap(about)]
pub struct Opt {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Load configuration from this file instead of the system and user files
    #[clap(long, global = true, env = "GAVEL_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub cmd: Command,
}

impl Opt {
    pub async fn run(&mut self) -> Result<i32> {
        let res = configure_logging(self.verbose).context("Failed to initialize output log");
        if let Err(err) = res {
            eprintln!("{}", err.to_string().red());
            return Ok(1);
        }

        if let Some(path) = &self.config {
            gavel_config::Config::from_file(path)
                .and_then(|config| config.make_current())
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
        }

        self.cmd.run().await
    }
}

#[derive(Subcommand)]
pub enum Command {
    Delete(cmd_delete::Delete),
    Deploy(cmd_deploy::Deploy),
    Find(cmd_find::Find),
    Repos(cmd_repos::Repos),
}

#[async_trait::async_trait]
impl Run for Command {
    async fn run(&mut self) -> Result<i32> {
        match self {
            Command::Delete(cmd) => cmd.run().await,
            Command::Deploy(cmd) => cmd.run().await,
            Command::Find(cmd) => cmd.run().await,
            Command::Repos(cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() {
    let mut opts = Opt::parse();
    let code = match opts.run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", format!("{err:?}").red());
            1
        }
    };
    std::process::exit(code);
}
