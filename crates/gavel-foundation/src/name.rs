// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::borrow::Borrow;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./name_test.rs"]
mod name_test;

/// Parse a repository name from a string.
///
/// This will panic if the name is invalid,
/// and should only be used for testing.
#[macro_export]
macro_rules! repo_name {
    ($name:literal) => {
        $crate::name::RepositoryName::new($name).unwrap()
    };
}

/// A validated repository name, as in "releases" or "snapshots".
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub const MIN_LEN: usize = 1;
    pub const MAX_LEN: usize = 64;

    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Ensure that the provided string is a valid repository name
    pub fn validate(name: &str) -> Result<()> {
        if name.len() < Self::MIN_LEN || name.len() > Self::MAX_LEN {
            return Err(Error::InvalidName(format!(
                "must be between {} and {} characters, got {} [{name}]",
                Self::MIN_LEN,
                Self::MAX_LEN,
                name.len(),
            )));
        }
        if name.starts_with(['.', '-']) {
            return Err(Error::InvalidName(format!(
                "must not begin with a dot or hyphen, got {name}"
            )));
        }
        if let Some((index, c)) = name.char_indices().find(|(_, c)| !is_valid_repo_name_char(*c)) {
            return Err(Error::InvalidName(format!(
                "{} > {c} < {}",
                &name[..index],
                &name[(index + c.len_utf8())..]
            )));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_repo_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RepositoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RepositoryName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl Borrow<str> for RepositoryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RepositoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RepositoryName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RepositoryName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for RepositoryName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepositoryName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
