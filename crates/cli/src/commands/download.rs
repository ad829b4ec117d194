//! Download mode - mirror a bucket path into a local directory
//!
//! Files that already exist locally are reported and left untouched.

use std::path::Path;

use s3sign_core::transfer::{self, TransferEvent, TransferSummary};
use s3sign_core::{BucketPath, ObjectStore};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct DownloadRecord {
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    skipped: bool,
}

/// Output structure for download mode (JSON format)
#[derive(Debug, Serialize)]
struct DownloadOutput {
    status: &'static str,
    source: String,
    destination: String,
    summary: TransferSummary,
    objects: Vec<DownloadRecord>,
}

/// Execute download mode
pub async fn execute(
    store: &dyn ObjectStore,
    source: &BucketPath,
    dest: &Path,
    formatter: &Formatter,
) -> ExitCode {
    let mut records = Vec::new();

    let result = transfer::download(store, source, dest, |event| match event {
        TransferEvent::Downloaded {
            object,
            local,
            size,
        } => {
            if formatter.is_json() {
                records.push(DownloadRecord {
                    source: object.to_string(),
                    target: local.display().to_string(),
                    size_bytes: Some(*size),
                    skipped: false,
                });
            } else {
                formatter.println(&format!(
                    "{object} -> {} ({})",
                    local.display(),
                    humansize::format_size(*size, humansize::BINARY)
                ));
            }
        }
        TransferEvent::Skipped { object, local } => {
            if formatter.is_json() {
                records.push(DownloadRecord {
                    source: object.to_string(),
                    target: local.display().to_string(),
                    size_bytes: None,
                    skipped: true,
                });
            } else {
                formatter.warning(&format!(
                    "Skipping {object}: {} already exists",
                    local.display()
                ));
            }
        }
        TransferEvent::Uploaded { .. } => {}
    })
    .await;

    match result {
        Ok(summary) => {
            if formatter.is_json() {
                formatter.json(&DownloadOutput {
                    status: "success",
                    source: source.to_string(),
                    destination: dest.display().to_string(),
                    summary,
                    objects: records,
                });
            } else {
                formatter.success(&format!(
                    "Downloaded {} file(s), {} from {source} ({} skipped)",
                    summary.transferred,
                    humansize::format_size(summary.bytes, humansize::BINARY),
                    summary.skipped
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Download from {source} failed: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
