//! Upload mode - store local files and directory trees under a bucket path

use std::path::PathBuf;

use s3sign_core::transfer::{self, TransferEvent, TransferSummary};
use s3sign_core::{BucketPath, ObjectStore};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct UploadRecord {
    source: String,
    target: String,
    size_bytes: u64,
}

/// Output structure for upload mode (JSON format)
#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    target: String,
    summary: TransferSummary,
    objects: Vec<UploadRecord>,
}

/// Execute upload mode
pub async fn execute(
    store: &dyn ObjectStore,
    target: &BucketPath,
    paths: &[PathBuf],
    formatter: &Formatter,
) -> ExitCode {
    let mut records = Vec::new();

    let result = transfer::upload(store, paths, target, |event| {
        if let TransferEvent::Uploaded {
            local,
            object,
            size,
        } = event
        {
            if formatter.is_json() {
                records.push(UploadRecord {
                    source: local.display().to_string(),
                    target: object.to_string(),
                    size_bytes: *size,
                });
            } else {
                formatter.println(&format!(
                    "{} -> {object} ({})",
                    local.display(),
                    humansize::format_size(*size, humansize::BINARY)
                ));
            }
        }
    })
    .await;

    match result {
        Ok(summary) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    status: "success",
                    target: target.to_string(),
                    summary,
                    objects: records,
                });
            } else {
                formatter.success(&format!(
                    "Uploaded {} file(s), {} to {target}",
                    summary.transferred,
                    humansize::format_size(summary.bytes, humansize::BINARY)
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Upload to {target} failed: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
