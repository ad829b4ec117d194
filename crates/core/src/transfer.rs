//! Sequential upload and download of object trees
//!
//! Every file is transferred one at a time and the first failure aborts the
//! whole run. Retries are left to the store implementation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::bucket::ObjectLister;
use crate::error::{Error, Result};
use crate::keymap;
use crate::path::{BucketPath, ObjectRef};
use crate::traits::ObjectStore;
use crate::walk::LocalFiles;

/// Progress notification for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// A local file was stored as an object
    Uploaded {
        local: PathBuf,
        object: ObjectRef,
        size: u64,
    },
    /// An object was written to a local file
    Downloaded {
        object: ObjectRef,
        local: PathBuf,
        size: u64,
    },
    /// The local file already existed and was left alone
    Skipped { object: ObjectRef, local: PathBuf },
}

/// Totals for a transfer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub transferred: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Upload every file under each root to `target`
///
/// Keys are derived with [`keymap::upload_base`]: a root given with a
/// trailing slash contributes only its contents, otherwise its own name
/// becomes the first key segment.
pub async fn upload<S, F>(
    store: &S,
    roots: &[PathBuf],
    target: &BucketPath,
    mut on_event: F,
) -> Result<TransferSummary>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&TransferEvent),
{
    if roots.is_empty() {
        return Err(Error::InvalidArgument(
            "No local files or directories given to upload".into(),
        ));
    }

    let mut summary = TransferSummary::default();
    for root in roots {
        let base = keymap::upload_base(root);
        for file in LocalFiles::new(root) {
            let file = file?;
            let object = keymap::upload_object(&file, &base, target)?;

            let data = tokio::fs::read(&file)
                .await
                .map_err(|e| Error::local(&file, e))?;
            let size = data.len() as u64;
            let content_type = mime_guess::from_path(&file)
                .first()
                .map(|m| m.essence_str().to_string());

            tracing::debug!("Uploading {} -> {object}", file.display());
            store.put_object(&object, data, content_type).await?;

            summary.transferred += 1;
            summary.bytes += size;
            on_event(&TransferEvent::Uploaded {
                local: file,
                object,
                size,
            });
        }
    }

    tracing::info!(
        "Uploaded {} file(s), {} bytes to {target}",
        summary.transferred,
        summary.bytes
    );
    Ok(summary)
}

/// Download every object under `source` into `dest`, mirroring the keys
///
/// Keys whose local path already exists as a file are skipped without
/// comparing content.
pub async fn download<S, F>(
    store: &S,
    source: &BucketPath,
    dest: &Path,
    mut on_event: F,
) -> Result<TransferSummary>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&TransferEvent),
{
    let mut summary = TransferSummary::default();
    let mut lister = ObjectLister::new(store, source);

    while let Some(page) = lister.next_page().await? {
        for item in page {
            if item.is_dir {
                continue;
            }

            let object = ObjectRef::new(&source.bucket, item.key);
            let local = keymap::local_path_for_key(dest, &object.key)?;

            if is_existing_file(&local).await {
                tracing::warn!("Skipping {object}: {} already exists", local.display());
                summary.skipped += 1;
                on_event(&TransferEvent::Skipped { object, local });
                continue;
            }

            if let Some(parent) = local.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::local(parent, e))?;
            }

            tracing::debug!("Downloading {object} -> {}", local.display());
            let data = store.get_object(&object).await?;
            let size = data.len() as u64;
            tokio::fs::write(&local, &data)
                .await
                .map_err(|e| Error::local(&local, e))?;

            summary.transferred += 1;
            summary.bytes += size;
            on_event(&TransferEvent::Downloaded {
                object,
                local,
                size,
            });
        }
    }

    tracing::info!(
        "Downloaded {} object(s), skipped {} from {source}",
        summary.transferred,
        summary.skipped
    );
    Ok(summary)
}

async fn is_existing_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}
