//! List mode - print every key under a bucket path

use s3sign_core::bucket::ObjectLister;
use s3sign_core::{BucketPath, ObjectInfo, ObjectStore};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Output structure for list mode (JSON format)
#[derive(Debug, Serialize)]
struct ListOutput {
    bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    prefix: String,
    items: Vec<ObjectInfo>,
    summary: Summary,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

/// Execute list mode
pub async fn execute(
    store: &dyn ObjectStore,
    path: &BucketPath,
    formatter: &Formatter,
) -> ExitCode {
    let progress = ProgressBar::spinner(formatter.config(), &format!("Listing {path}..."));
    let mut lister = ObjectLister::new(store, path);
    let mut items = Vec::new();
    let mut total_objects = 0;
    let mut total_size: i64 = 0;

    loop {
        let page = match lister.next_page().await {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(e) => {
                progress.finish_and_clear();
                formatter.error(&format!("Failed to list {path}: {e}"));
                return ExitCode::from_error(&e);
            }
        };

        total_objects += page.iter().filter(|i| !i.is_dir).count();
        total_size += page.iter().filter_map(|i| i.size_bytes).sum::<i64>();
        progress.set_message(&format!("Listing {path}... {total_objects} object(s)"));

        if formatter.is_json() {
            items.extend(page);
        } else {
            progress.suspend(|| {
                for item in &page {
                    formatter.println(&item.key);
                }
            });
        }
    }

    progress.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&ListOutput {
            bucket: path.bucket.clone(),
            prefix: path.prefix.clone(),
            items,
            summary: Summary {
                total_objects,
                total_size_bytes: total_size,
                total_size_human: humansize::format_size(total_size as u64, humansize::BINARY),
            },
        });
    }

    ExitCode::Success
}
