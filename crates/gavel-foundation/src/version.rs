// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./version_test.rs"]
mod version_test;

/// The alias that resolves to the newest release version of an artifact.
pub const LATEST_ALIAS: &str = "latest";

// Qualifiers that rank the same as a plain release.
const RELEASE_QUALIFIERS: &[&str] = &["final", "ga", "release"];

/// One component of a version string.
///
/// Versions are broken into tokens at separators (`.`, `-`, `_`, `+`)
/// and wherever digits meet letters, so `1.0-rc2` becomes `1`, `0`, `rc`, `2`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum VersionToken {
    Number(u64),
    Qualifier(String),
}

impl VersionToken {
    fn qualifier_rank(q: &str) -> u8 {
        match q {
            "alpha" | "a" => 0,
            "beta" | "b" => 1,
            "milestone" | "m" => 2,
            "rc" | "cr" => 3,
            "snapshot" => 4,
            q if RELEASE_QUALIFIERS.contains(&q) => 6,
            "sp" => 7,
            _ => 8,
        }
    }

    /// Compare this token against the implicit padding of a shorter version.
    fn cmp_padding(&self) -> Ordering {
        match self {
            Self::Number(n) => n.cmp(&0),
            Self::Qualifier(q) => Self::qualifier_rank(q).cmp(&6),
        }
    }

    fn is_pre_release(&self) -> bool {
        matches!(self.cmp_padding(), Ordering::Less) && matches!(self, Self::Qualifier(_))
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Number(_), Self::Qualifier(_)) => Ordering::Greater,
            (Self::Qualifier(_), Self::Number(_)) => Ordering::Less,
            (Self::Qualifier(a), Self::Qualifier(b)) => Self::qualifier_rank(a)
                .cmp(&Self::qualifier_rank(b))
                .then_with(|| a.cmp(b)),
        }
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An artifact version, as found in the version segment of a coordinate.
///
/// Ordering is numeric-segment aware, so `1.9 < 1.10`, and trailing
/// zeros are insignificant, so `1.2 == 1.2.0`. Pre-release qualifiers
/// sort before the release they lead up to: `1.0-rc1 < 1.0`.
#[derive(Clone, Debug)]
pub struct Version {
    source: String,
    tokens: Vec<VersionToken>,
}

impl Version {
    /// The version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[VersionToken] {
        &self.tokens
    }

    /// True if this version carries a qualifier that ranks below a release,
    /// such as `-SNAPSHOT`, `-rc1` or `-beta`.
    pub fn is_pre_release(&self) -> bool {
        self.tokens.iter().any(VersionToken::is_pre_release)
    }

    pub fn is_snapshot(&self) -> bool {
        self.source.ends_with(crate::snapshot::SNAPSHOT_MARKER)
    }
}

/// Parse a string as a version.
///
/// A version must begin with a digit; directory names like `docs` or
/// `maven-metadata.xml` are not versions.
pub fn parse_version<S: AsRef<str>>(version: S) -> Result<Version> {
    let version = version.as_ref();
    match version.chars().next() {
        Some(c) if c.is_ascii_digit() => {}
        _ => {
            return Err(Error::InvalidVersion(format!(
                "must begin with a digit [{version}]"
            )));
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut flush = |current: &mut String| -> Result<()> {
        if current.is_empty() {
            return Ok(());
        }
        let token = if current.chars().all(|c| c.is_ascii_digit()) {
            let n = current.parse().map_err(|_| {
                Error::InvalidVersion(format!("numeric part out of range [{version}]"))
            })?;
            VersionToken::Number(n)
        } else {
            VersionToken::Qualifier(current.to_lowercase())
        };
        tokens.push(token);
        current.clear();
        Ok(())
    };

    for c in version.chars() {
        match c {
            '.' | '-' | '_' | '+' => flush(&mut current)?,
            c if c.is_ascii_alphanumeric() => {
                let boundary = current
                    .chars()
                    .last()
                    .is_some_and(|last| last.is_ascii_digit() != c.is_ascii_digit());
                if boundary {
                    flush(&mut current)?;
                }
                current.push(c);
            }
            c => {
                return Err(Error::InvalidVersion(format!(
                    "unexpected character {c:?} [{version}]"
                )));
            }
        }
    }
    flush(&mut current)?;

    Ok(Version {
        source: version.to_owned(),
        tokens,
    })
}

/// Return the greatest of the given version strings that is a release.
///
/// Entries that do not parse as versions and pre-release versions are
/// skipped.
pub fn latest_release<'a, I>(candidates: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter_map(|c| parse_version(c).ok())
        .filter(|v| !v.is_pre_release())
        .max()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut ours = self.tokens.iter();
        let mut theirs = other.tokens.iter();
        loop {
            let res = match (ours.next(), theirs.next()) {
                (None, None) => return Ordering::Equal,
                (Some(a), Some(b)) => a.cmp(b),
                (Some(a), None) => a.cmp_padding(),
                (None, Some(b)) => b.cmp_padding().reverse(),
            };
            if res != Ordering::Equal {
                return res;
            }
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_version(s)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_version(s).map_err(serde::de::Error::custom)
    }
}
