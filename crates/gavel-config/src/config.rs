// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use gavel_foundation::name::RepositoryName;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

static CONFIG: OnceCell<RwLock<Arc<Config>>> = OnceCell::new();

static DEFAULT_STORAGE_ROOT: &str = "gavel/repositories";
static FALLBACK_STORAGE_ROOT: &str = "/tmp/gavel/repositories";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Server {
    /// Identifies this server instance in log output
    pub id: String,

    /// Directory under which filesystem repositories without an
    /// explicit root keep their files
    pub storage_root: PathBuf,

    /// Maximum number of seconds to wait on a single upstream fetch
    ///
    /// If this is zero, upstream fetches are not bounded.
    pub proxy_timeout_seconds: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            id: "gavel".to_string(),
            storage_root: dirs::data_local_dir()
                .map(|dir| dir.join(DEFAULT_STORAGE_ROOT))
                .unwrap_or_else(|| PathBuf::from(FALLBACK_STORAGE_ROOT)),
            proxy_timeout_seconds: 30,
        }
    }
}

/// Where a repository keeps its files.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Fs,
    Mem,
}

/// Who may see the contents of a repository without a token route.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Anyone can read and browse
    #[default]
    Public,
    /// Anyone can read known files, browsing needs a token route
    Hidden,
    /// Reading needs a token route
    Private,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Repository {
    pub name: RepositoryName,
    #[serde(default)]
    pub kind: StorageKind,
    /// Storage root for filesystem repositories, defaults to
    /// `<server.storage_root>/<name>`
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Allow existing artifacts to be overwritten
    #[serde(default)]
    pub redeployment: bool,
    #[serde(default)]
    pub visibility: Visibility,
    /// Maximum number of bytes this repository may hold
    #[serde(default)]
    pub quota: Option<u64>,
    /// Names of other repositories consulted, in order, when a
    /// requested file is not stored locally
    #[serde(default)]
    pub upstreams: Vec<RepositoryName>,
}

impl Repository {
    pub fn new(name: RepositoryName) -> Self {
        Self {
            name,
            kind: StorageKind::default(),
            root: None,
            redeployment: false,
            visibility: Visibility::default(),
            quota: None,
            upstreams: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

/// Grants permissions over a part of one or all repositories.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Route {
    /// A repository name followed by an optional path prefix, as in
    /// `releases/com/acme`. The repository can be `*` to match any.
    pub path: String,
    pub permissions: Vec<Permission>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Token {
    pub name: String,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Configuration values for gavel.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // Only the scalar sections can be addressed with environment
    // variables.
    pub server: Server,
    pub repositories: Vec<Repository>,
    pub tokens: Vec<Token>,
}

impl Config {
    /// Get the current loaded config, loading it if needed
    pub fn current() -> Result<Arc<Self>> {
        get_config()
    }

    /// Load the config from disk, even if it's already been loaded before
    pub fn load() -> Result<Self> {
        load_config()
    }

    /// Parse a config from a string in the given format.
    pub fn from_str_with_format<S: AsRef<str>>(
        conf: S,
        format: config::FileFormat,
    ) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(conf.as_ref(), format))
            .build()?;
        Self::deserialize(config)?.validated()
    }

    /// Load a config from a single file, in any supported format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        Self::deserialize(config)?.validated()
    }

    /// Make this config the current global one
    pub fn make_current(self) -> Result<Arc<Self>> {
        // Note we don't know if we won the race to set the value here,
        // so we still need to try to update it.
        let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
            Ok(RwLock::new(Arc::new(self.clone())))
        })?;

        let mut lock = config
            .write()
            .map_err(|err| Error::LockPoisonedWrite(err.to_string()))?;
        *Arc::make_mut(&mut lock) = self;
        Ok(Arc::clone(&lock))
    }

    /// Find a configured repository by name.
    pub fn repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    /// Find a configured token by name.
    pub fn token(&self, name: &str) -> Option<&Token> {
        self.tokens.iter().find(|token| token.name == name)
    }

    /// The storage root of a filesystem repository.
    pub fn repository_root(&self, repo: &Repository) -> PathBuf {
        repo.root
            .clone()
            .unwrap_or_else(|| self.server.storage_root.join(repo.name.as_str()))
    }

    /// Check that repository names are unique and that every upstream
    /// names another configured repository.
    pub fn validated(self) -> Result<Self> {
        let mut seen = HashSet::new();
        for repo in self.repositories.iter() {
            if !seen.insert(repo.name.as_str()) {
                return Err(Error::DuplicateRepository(repo.name.to_string()));
            }
        }
        for repo in self.repositories.iter() {
            if let Some(upstream) = repo
                .upstreams
                .iter()
                .find(|upstream| **upstream == repo.name || !seen.contains(upstream.as_str()))
            {
                return Err(Error::UnknownUpstream {
                    repository: repo.name.to_string(),
                    upstream: upstream.to_string(),
                });
            }
        }
        Ok(self)
    }
}

/// Get the current gavel config, fetching it from disk if needed.
pub fn get_config() -> Result<Arc<Config>> {
    let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
        Ok(RwLock::new(Arc::new(load_config()?)))
    })?;
    let lock = config
        .read()
        .map_err(|err| Error::LockPoisonedRead(err.to_string()))?;
    Ok(Arc::clone(&*lock))
}

/// Load the gavel configuration from disk, even if it has already been loaded.
///
/// This includes the default, user, and system configurations (if they exist).
pub fn load_config() -> Result<Config> {
    use config::{Config as RawConfig, File};

    let mut config_builder = RawConfig::builder()
        // the system config can also be in any support format: toml, yaml, json, ini, etc
        .add_source(File::with_name("/etc/gavel").required(false));
    if let Some(home) = dirs::home_dir() {
        let user_config = home.join(".config").join("gavel").join("gavel");
        // the user config can also be in any support format: toml, yaml, json, ini, etc
        config_builder =
            config_builder.add_source(File::with_name(&user_config.display().to_string()).required(false));
    }

    for (key, value) in env_overrides(std::env::vars()) {
        config_builder = config_builder.set_override(key, value)?;
    }

    let config = config_builder.build()?;
    Config::deserialize(config)?.validated()
}

/// Translate `GAVEL_<SECTION>_<NAME>` variables into config keys.
fn env_overrides<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut overrides = Vec::new();
    for (var, value) in vars {
        let Some(tail) = var.strip_prefix("GAVEL_") else {
            continue;
        };
        let Some((section, name)) = tail.split_once('_') else {
            // typically, a value with no section is not a configuration
            // value, and can be skipped (eg: GAVEL_LOG)
            continue;
        };
        let key = format!("{}.{}", section.to_lowercase(), name.to_lowercase());
        overrides.push((key, value));
    }
    overrides
}
