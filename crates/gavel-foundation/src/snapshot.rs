// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Resolution of `-SNAPSHOT` file names to timestamped snapshot builds.
//!
//! A snapshot deployment stores files such as
//! `lib-1.0-20240115.093012-7-sources.jar` under the `1.0-SNAPSHOT`
//! version directory, where `20240115.093012` is the UTC deploy time and
//! `7` the build number. A request for `lib-1.0-SNAPSHOT-sources.jar`
//! resolves to the newest such file.

#[cfg(test)]
#[path = "./snapshot_test.rs"]
mod snapshot_test;

pub const SNAPSHOT_MARKER: &str = "-SNAPSHOT";

const DATE_LEN: usize = 8;
const TIME_LEN: usize = 6;

/// The build stamp of a timestamped snapshot file.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct SnapshotStamp {
    /// `yyyyMMdd.HHmmss`, which sorts chronologically as a string
    pub timestamp: String,
    pub build_number: u32,
}

impl std::fmt::Display for SnapshotStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.build_number)
    }
}

/// A requested snapshot file name, split around its marker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotRequest<'a> {
    /// Everything before the marker, eg: `lib-1.0`
    pub stem: &'a str,
    /// Everything after the marker, eg: `-sources.jar`
    pub suffix: &'a str,
}

impl<'a> SnapshotRequest<'a> {
    /// Split a file name that refers to a snapshot, if it does.
    pub fn parse(file_name: &'a str) -> Option<Self> {
        let index = file_name.rfind(SNAPSHOT_MARKER)?;
        let stem = &file_name[..index];
        if stem.is_empty() {
            return None;
        }
        Some(Self {
            stem,
            suffix: &file_name[index + SNAPSHOT_MARKER.len()..],
        })
    }

    /// Extract the build stamp from a candidate file name, if the
    /// candidate is a timestamped build of this request.
    pub fn match_candidate(&self, candidate: &str) -> Option<SnapshotStamp> {
        let rest = candidate.strip_prefix(self.stem)?.strip_prefix('-')?;
        let rest = rest.strip_suffix(self.suffix)?;
        let (timestamp, build_number) = rest.rsplit_once('-')?;
        let (date, time) = timestamp.split_once('.')?;
        let is_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(date, DATE_LEN) || !is_digits(time, TIME_LEN) {
            return None;
        }
        if build_number.is_empty() || !build_number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(SnapshotStamp {
            timestamp: timestamp.to_owned(),
            build_number: build_number.parse().ok()?,
        })
    }

    /// Choose the newest timestamped build among the candidates.
    pub fn newest<'c, I>(&self, candidates: I) -> Option<&'c str>
    where
        I: IntoIterator<Item = &'c str>,
    {
        candidates
            .into_iter()
            .filter_map(|c| self.match_candidate(c).map(|stamp| (stamp, c)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, c)| c)
    }
}

/// True if the file name refers to a snapshot artifact.
pub fn is_snapshot_file(file_name: &str) -> bool {
    SnapshotRequest::parse(file_name).is_some()
}
