// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::ops::Deref;
use std::str::FromStr;

use itertools::Itertools;
use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, InvalidGavError, Result};

#[cfg(test)]
#[path = "./gav_test.rs"]
mod gav_test;

pub const SEGMENT_SEP: char = '/';

/// The minimum number of segments in a valid coordinate (group + artifact-or-file).
pub const MIN_SEGMENTS: usize = 2;

/// A normalized, slash-separated coordinate inside of a repository.
///
/// This is the `group/.../artifact/version/filename` form that build
/// tools request. Once constructed, a path is guaranteed to stay inside
/// of the repository root it is joined onto.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GavPath(RelativePathBuf);

impl GavPath {
    /// Normalize a raw request string into a coordinate.
    ///
    /// Leading and trailing separators, empty segments and `.` segments
    /// are dropped. Any `..` segment is rejected outright rather than
    /// resolved, as are backslashes, drive prefixes and control characters.
    pub fn parse<S: AsRef<str>>(raw: S) -> Result<Self> {
        let raw = raw.as_ref();
        if let Some(c) = raw.chars().find(|c| c.is_control()) {
            return Err(InvalidGavError::new_error(
                raw,
                format!("control character {:?} is not allowed", c),
            ));
        }
        if raw.contains('\\') {
            return Err(InvalidGavError::new_error(raw, "backslashes are not allowed"));
        }
        if raw.contains(':') {
            return Err(InvalidGavError::new_error(raw, "colons are not allowed"));
        }

        let mut segments = Vec::new();
        for segment in raw.split(SEGMENT_SEP) {
            let trimmed = segment.trim();
            match segment {
                "" | "." => continue,
                _ if trimmed == ".." => return Err(Error::PathTraversal(raw.to_owned())),
                _ if trimmed.is_empty() => {
                    return Err(InvalidGavError::new_error(
                        raw,
                        "segments may not be blank",
                    ));
                }
                _ if trimmed.len() != segment.len() => {
                    return Err(InvalidGavError::new_error(
                        raw,
                        "segments may not begin or end with whitespace",
                    ));
                }
                _ => segments.push(segment),
            }
        }

        if segments.len() < MIN_SEGMENTS {
            return Err(InvalidGavError::new_error(
                raw,
                format!(
                    "expected at least {MIN_SEGMENTS} segments, got {}",
                    segments.len()
                ),
            ));
        }

        Ok(Self(RelativePathBuf::from(
            segments.into_iter().join(&SEGMENT_SEP.to_string()),
        )))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_relative_path(&self) -> &RelativePath {
        &self.0
    }

    /// Iterate the segments of this path, from the group down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.as_str().split(SEGMENT_SEP)
    }

    /// The last segment of the path.
    pub fn file_name(&self) -> &str {
        // at least two segments are guaranteed on construction
        self.segments().last().unwrap_or_default()
    }

    /// The path of the directory holding this entry.
    pub fn parent(&self) -> &RelativePath {
        self.0.parent().unwrap_or(RelativePath::new(""))
    }

    /// The name of the directory holding this entry.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent().file_name()
    }

    /// Replace the last segment of this path.
    pub fn with_file_name<S: AsRef<str>>(&self, name: S) -> Result<Self> {
        Self::parse(self.parent().join(name.as_ref()).as_str())
    }
}

impl Deref for GavPath {
    type Target = RelativePath;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<RelativePath> for GavPath {
    fn as_ref(&self) -> &RelativePath {
        &self.0
    }
}

impl std::fmt::Display for GavPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for GavPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for GavPath {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GavPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}
