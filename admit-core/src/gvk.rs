//! Identifiers for registered wire types.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to parse group version: {0}")]
/// Failed to parse group version.
pub struct ParseGroupVersionError(pub String);

/// A family of wire types that are versioned together
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    /// API group, empty for the legacy group
    pub group: String,
    /// Version
    pub version: String,
}

impl GroupVersion {
    /// Construct from explicit group and version
    pub fn gv(group: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
        }
    }

    /// The kind `kind` within this group version
    pub fn with_kind(&self, kind: &str) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, kind)
    }

    /// Generate the `apiVersion` string used on the wire
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl FromStr for GroupVersion {
    type Err = ParseGroupVersionError;

    fn from_str(gv: &str) -> Result<Self, Self::Err> {
        let (group, version) = match gv.split_once('/') {
            Some((g, v)) if !g.is_empty() && !v.is_empty() && !v.contains('/') => (g, v),
            None if !gv.is_empty() => ("", gv),
            _ => return Err(ParseGroupVersionError(gv.into())),
        };
        Ok(Self::gv(group, version))
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_version())
    }
}

/// A single wire type
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    /// API group
    pub group: String,
    /// Version
    pub version: String,
    /// Kind
    pub kind: String,
}

impl GroupVersionKind {
    /// Construct from explicit group, version, and kind
    pub fn gvk(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Parse from the `apiVersion` and `kind` fields of a wire object
    pub fn from_api_version(api_version: &str, kind: &str) -> Result<Self, ParseGroupVersionError> {
        Ok(api_version.parse::<GroupVersion>()?.with_kind(kind))
    }

    /// The group version this kind belongs to
    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::gv(&self.group, &self.version)
    }

    /// Generate the `apiVersion` string used on the wire
    pub fn api_version(&self) -> String {
        self.group_version().api_version()
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_group_versions() {
        assert_eq!("v1".parse::<GroupVersion>().unwrap(), GroupVersion::gv("", "v1"));
        assert_eq!(
            "apps.example.io/v1beta1".parse::<GroupVersion>().unwrap(),
            GroupVersion::gv("apps.example.io", "v1beta1")
        );
        for bad in ["", "/v1", "apps/", "a/b/c"] {
            assert!(bad.parse::<GroupVersion>().is_err(), "{bad}");
        }
    }

    #[test]
    fn api_versions() {
        let gvk = GroupVersionKind::from_api_version("v1", "PolicyBinding").unwrap();
        assert_eq!(gvk.api_version(), "v1");
        assert_eq!(gvk.to_string(), "v1, Kind=PolicyBinding");
        assert_eq!(GroupVersion::gv("g", "v2").with_kind("K").api_version(), "g/v2");
    }
}
