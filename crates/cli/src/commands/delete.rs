//! Delete mode - empty a bucket, or everything under a prefix
//!
//! Only objects are removed. The bucket itself always survives.

use s3sign_core::bucket;
use s3sign_core::{BucketPath, ObjectStore};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Output structure for delete mode (JSON format)
#[derive(Debug, Serialize)]
struct DeleteOutput {
    status: &'static str,
    bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    prefix: String,
    deleted: usize,
}

/// Execute delete mode
pub async fn execute(
    store: &dyn ObjectStore,
    path: &BucketPath,
    formatter: &Formatter,
) -> ExitCode {
    let progress = ProgressBar::spinner(formatter.config(), &format!("Listing {path}..."));
    let mut so_far = 0;

    let result = bucket::delete_all(store, path, |batch| {
        so_far += batch.len();
        progress.set_message(&format!("Deleted {so_far} object(s) from {path}"));
    })
    .await;

    progress.finish_and_clear();

    match result {
        Ok(deleted) => {
            if formatter.is_json() {
                formatter.json(&DeleteOutput {
                    status: "success",
                    bucket: path.bucket.clone(),
                    prefix: path.prefix.clone(),
                    deleted,
                });
            } else if deleted == 0 {
                formatter.success(&format!("Nothing to delete in {path}"));
            } else {
                formatter.success(&format!("Deleted {deleted} object(s) from {path}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to delete objects in {path}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
