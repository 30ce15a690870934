//! WBS codes and nodes
//!
//! A [`WbsCode`] is a dot-separated path of positive integers (`1.3.2.1`).
//! Every code encodes its full ancestor chain, so the parent of a code is
//! simply the code with its last segment dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hierarchical WBS code such as `1.3.2.1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WbsCode(Vec<u32>);

impl WbsCode {
    /// The single root code, `1`
    pub fn root() -> Self {
        Self(vec![1])
    }

    /// Build a code from raw segments; every segment must be positive
    pub fn from_segments(segments: Vec<u32>) -> Result<Self, CodeParseError> {
        if segments.is_empty() {
            return Err(CodeParseError::Empty);
        }
        if segments.contains(&0) {
            return Err(CodeParseError::ZeroSegment(
                segments
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("."),
            ));
        }
        Ok(Self(segments))
    }

    /// Code of the `n`-th child (1-based) of this code
    pub fn child(&self, n: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(n.max(1));
        Self(segments)
    }

    /// Parent code, `None` for a single-segment code
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Final segment (the position among siblings)
    pub fn last_segment(&self) -> u32 {
        self.0.last().copied().unwrap_or(0)
    }

    /// Number of segments; the root has depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Whether `self` sits anywhere below `ancestor`
    pub fn is_descendant_of(&self, ancestor: &WbsCode) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    pub fn parse(s: &str) -> Result<Self, CodeParseError> {
        s.parse()
    }
}

impl fmt::Display for WbsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for WbsCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CodeParseError::Empty);
        }
        let segments = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| CodeParseError::InvalidSegment(s.to_string(), part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_segments(segments)
    }
}

impl Serialize for WbsCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WbsCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing WBS codes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeParseError {
    #[error("empty WBS code")]
    Empty,

    #[error("invalid segment '{1}' in WBS code '{0}'")]
    InvalidSegment(String, String),

    #[error("WBS code '{0}' contains a zero segment (segments start at 1)")]
    ZeroSegment(String),
}

/// Fixed structural names
pub mod names {
    pub const MILESTONES: &str = "M | Milestones";
    pub const PREREQUISITES: &str = "P | Pre-requisites";
    pub const TBC: &str = "TBC - Equipment To Be Confirmed";
}

/// One element of the work breakdown structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WbsNode {
    pub wbs_code: WbsCode,

    /// `None` only for the root
    pub parent_wbs_code: Option<WbsCode>,

    pub wbs_name: String,

    /// Created by the current continuation run
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    /// Carried forward from a previous run
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_existing: bool,
}

impl WbsNode {
    /// Create a node whose parent is derived from its code
    pub fn new(wbs_code: WbsCode, wbs_name: impl Into<String>) -> Self {
        let parent_wbs_code = wbs_code.parent();
        Self {
            wbs_code,
            parent_wbs_code,
            wbs_name: wbs_name.into(),
            is_new: false,
            is_existing: false,
        }
    }

    pub fn marked_new(mut self) -> Self {
        self.is_new = true;
        self.is_existing = false;
        self
    }

    pub fn marked_existing(mut self) -> Self {
        self.is_existing = true;
        self.is_new = false;
        self
    }

    /// Node with no flags set, as emitted in "new project" mode
    pub fn unflagged(mut self) -> Self {
        self.is_new = false;
        self.is_existing = false;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_wbs_code.is_none()
    }

    /// Parent code rendered for CSV output (empty for the root)
    pub fn parent_code_str(&self) -> String {
        self.parent_wbs_code
            .as_ref()
            .map(WbsCode::to_string)
            .unwrap_or_default()
    }
}
