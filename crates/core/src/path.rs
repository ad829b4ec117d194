//! Bucket path parsing and object references
//!
//! Command-line targets use the format `bucket[/prefix]`. Object references
//! pair a bucket with a single slash-separated key.

use serde::Serialize;

use crate::error::{Error, Result};

/// A bucket, optionally narrowed to a key prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    /// Bucket name
    pub bucket: String,
    /// Key prefix without leading or trailing slashes (empty for the whole bucket)
    pub prefix: String,
}

impl BucketPath {
    /// Create a new BucketPath, normalizing slashes around the prefix
    pub fn new(bucket: impl Into<String>, prefix: impl AsRef<str>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Parse `bucket[/prefix]`
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidPath("Path cannot be empty".into()));
        }

        let (bucket, prefix) = s.split_once('/').unwrap_or((s, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Bucket name cannot be empty in '{s}'. Use format: bucket[/prefix]"
            )));
        }

        Ok(Self::new(bucket, prefix))
    }

    /// Prefix to send with list requests: `prefix/`, or None for the whole bucket
    pub fn list_prefix(&self) -> Option<String> {
        if self.prefix.is_empty() {
            None
        } else {
            Some(format!("{}/", self.prefix))
        }
    }

    /// Build the object reference for a key relative to this prefix
    pub fn object(&self, relative_key: &str) -> ObjectRef {
        let relative_key = relative_key.trim_start_matches('/');
        let key = if self.prefix.is_empty() {
            relative_key.to_string()
        } else {
            format!("{}/{relative_key}", self.prefix)
        };
        ObjectRef::new(&self.bucket, key)
    }
}

impl std::fmt::Display for BucketPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.prefix)
        }
    }
}

impl std::str::FromStr for BucketPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A single object in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
