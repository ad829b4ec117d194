//! s3sign-core: Core library for the s3sign object storage CLI
//!
//! This crate provides the core functionality for s3sign, including:
//! - Configuration management
//! - Bucket path parsing and object references
//! - Local file enumeration and key mapping
//! - Sequential upload/download, bucket listing and bulk delete
//! - Presigned URL generation
//! - ObjectStore trait for S3 operations
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod bucket;
pub mod config;
pub mod error;
pub mod keymap;
pub mod path;
pub mod sign;
pub mod traits;
pub mod transfer;
pub mod walk;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigManager, SessionConfig, SessionSettings};
pub use error::{Error, Result};
pub use path::{BucketPath, ObjectRef};
pub use sign::{PRESIGN_EXPIRY, PresignedUrl};
pub use traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};
pub use transfer::{TransferEvent, TransferSummary};
pub use walk::LocalFiles;
