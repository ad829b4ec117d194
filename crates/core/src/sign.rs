//! Presigned GET URL generation for `BUCKET KEY` pairs

use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::ObjectRef;
use crate::traits::ObjectStore;

/// Validity window of generated URLs (5 days)
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(5 * 24 * 60 * 60);

/// A signed URL and the instant it stops working
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUrl {
    pub bucket: String,
    pub key: String,
    pub url: String,
    pub expires_at: Timestamp,
}

/// Turn positional `BUCKET KEY BUCKET KEY ...` arguments into object references
pub fn pair_objects(args: &[String]) -> Result<Vec<ObjectRef>> {
    if args.len() % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "Expected BUCKET KEY pairs, got {} argument(s)",
            args.len()
        )));
    }

    args.chunks_exact(2)
        .map(|pair| {
            let (bucket, key) = (&pair[0], &pair[1]);
            if bucket.is_empty() || key.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "Bucket and key cannot be empty (got '{bucket}' '{key}')"
                )));
            }
            Ok(ObjectRef::new(bucket.as_str(), key.as_str()))
        })
        .collect()
}

/// Sign one object for [`PRESIGN_EXPIRY`]
pub async fn sign<S: ObjectStore + ?Sized>(store: &S, object: &ObjectRef) -> Result<PresignedUrl> {
    let signed_at = Timestamp::now();
    let url = store.presign_get(object, PRESIGN_EXPIRY).await?;
    let lifetime = SignedDuration::from_secs(PRESIGN_EXPIRY.as_secs() as i64);
    let expires_at = signed_at
        .checked_add(lifetime)
        .map_err(|e| Error::General(format!("Cannot compute expiry: {e}")))?;

    Ok(PresignedUrl {
        bucket: object.bucket.clone(),
        key: object.key.clone(),
        url,
        expires_at,
    })
}

/// Sign every object in order
///
/// A failure for one object is reported through `on_result` and logged;
/// the loop moves on to the next object. Returns the number of failures.
pub async fn sign_all<S, F>(store: &S, objects: &[ObjectRef], mut on_result: F) -> usize
where
    S: ObjectStore + ?Sized,
    F: FnMut(&ObjectRef, Result<PresignedUrl>),
{
    let mut failures = 0;
    for object in objects {
        let result = sign(store, object).await;
        if let Err(e) = &result {
            tracing::warn!("Failed to sign request for {object}: {e}");
            failures += 1;
        }
        on_result(object, result);
    }
    failures
}
