//! Bucket listing and bulk deletion

use crate::error::Result;
use crate::path::BucketPath;
use crate::traits::{ListOptions, ObjectInfo, ObjectStore};

/// Keys requested per list page
pub const LIST_PAGE_SIZE: i32 = 1000;

/// Maximum keys per DeleteObjects request
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Page-by-page listing of every object under a bucket path
pub struct ObjectLister<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    path: &'a BucketPath,
    continuation_token: Option<String>,
    exhausted: bool,
}

impl<'a, S: ObjectStore + ?Sized> ObjectLister<'a, S> {
    pub fn new(store: &'a S, path: &'a BucketPath) -> Self {
        Self {
            store,
            path,
            continuation_token: None,
            exhausted: false,
        }
    }

    /// Fetch the next page, or None once the listing is complete
    pub async fn next_page(&mut self) -> Result<Option<Vec<ObjectInfo>>> {
        if self.exhausted {
            return Ok(None);
        }

        let options = ListOptions {
            prefix: self.path.list_prefix(),
            max_keys: Some(LIST_PAGE_SIZE),
            continuation_token: self.continuation_token.take(),
        };
        tracing::debug!(
            "Listing {} (token: {:?})",
            self.path,
            options.continuation_token
        );

        let result = self.store.list_objects(&self.path.bucket, options).await?;

        match result.continuation_token {
            Some(token) if result.truncated => self.continuation_token = Some(token),
            _ => self.exhausted = true,
        }

        Ok(Some(result.items))
    }
}

/// List every object under a bucket path
pub async fn list_all<S: ObjectStore + ?Sized>(
    store: &S,
    path: &BucketPath,
) -> Result<Vec<ObjectInfo>> {
    let mut lister = ObjectLister::new(store, path);
    let mut items = Vec::new();
    while let Some(page) = lister.next_page().await? {
        items.extend(page);
    }
    Ok(items)
}

/// Delete every object under a bucket path
///
/// All keys are listed first, then removed in batches. `on_batch` is called
/// with the keys of each batch the store confirmed. The first failing batch
/// aborts the run. Returns the number of deleted keys.
pub async fn delete_all<S, F>(store: &S, path: &BucketPath, mut on_batch: F) -> Result<usize>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&[String]),
{
    let keys: Vec<String> = list_all(store, path)
        .await?
        .into_iter()
        .map(|item| item.key)
        .collect();

    if keys.is_empty() {
        tracing::info!("Nothing to delete under {path}");
        return Ok(0);
    }

    let mut deleted = 0;
    for chunk in keys.chunks(DELETE_BATCH_SIZE) {
        let confirmed = store.delete_objects(&path.bucket, chunk.to_vec()).await?;
        tracing::debug!(
            "Deleted batch of {} from {} ({} confirmed)",
            chunk.len(),
            path.bucket,
            confirmed.len()
        );
        deleted += confirmed.len();
        on_batch(&confirmed);
    }

    tracing::info!("Deleted {deleted} object(s) under {path}");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::MemoryStore;
    use crate::traits::{ListResult, MockObjectStore};

    fn store_with(keys: &[&str]) -> MemoryStore {
        let store = MemoryStore::new(3);
        for key in keys {
            store.insert("bkt", key, key.as_bytes());
        }
        store.insert("other", "a.txt", b"untouched");
        store
    }

    #[tokio::test]
    async fn test_list_all_paginates() {
        let store = store_with(&["a", "b", "c", "d", "e", "f", "g"]);
        let items = list_all(&store, &BucketPath::parse("bkt").unwrap())
            .await
            .unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[tokio::test]
    async fn test_list_all_with_prefix() {
        let store = store_with(&["logs/1", "logs/2", "logsx", "data/1"]);
        let items = list_all(&store, &BucketPath::parse("bkt/logs").unwrap())
            .await
            .unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["logs/1", "logs/2"]);
    }

    #[tokio::test]
    async fn test_lister_stops_after_last_page() {
        let store = store_with(&["a", "b"]);
        let path = BucketPath::parse("bkt").unwrap();
        let mut lister = ObjectLister::new(&store, &path);

        assert_eq!(lister.next_page().await.unwrap().unwrap().len(), 2);
        assert!(lister.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_removes_listed_keys() {
        let keys: Vec<String> = (0..10).map(|i| format!("k{i:02}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let store = store_with(&refs);
        let path = BucketPath::parse("bkt").unwrap();

        let before: Vec<String> = list_all(&store, &path)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();

        let mut reported = Vec::new();
        let deleted = delete_all(&store, &path, |batch| reported.extend_from_slice(batch))
            .await
            .unwrap();

        assert_eq!(deleted, before.len());
        assert_eq!(reported, before);
        assert!(store.keys("bkt").is_empty());
        assert_eq!(store.keys("other"), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_delete_all_empty_bucket() {
        let store = store_with(&[]);
        let deleted = delete_all(&store, &BucketPath::parse("bkt").unwrap(), |_| {})
            .await
            .unwrap();
        assert_eq!(deleted, 0);
        assert!(store.delete_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_batches_large_listings() {
        let store = MemoryStore::new(1000);
        for i in 0..2500 {
            store.insert("bkt", &format!("obj/{i:05}"), b"x");
        }

        let deleted = delete_all(&store, &BucketPath::parse("bkt").unwrap(), |_| {})
            .await
            .unwrap();
        assert_eq!(deleted, 2500);
        assert_eq!(*store.delete_batches.lock().unwrap(), vec![1000, 1000, 500]);
    }

    #[tokio::test]
    async fn test_delete_all_aborts_on_failed_batch() {
        let mut store = MockObjectStore::new();
        store.expect_list_objects().times(1).returning(|_, _| {
            Ok(ListResult {
                items: vec![ObjectInfo::file("a", 1), ObjectInfo::file("b", 1)],
                truncated: false,
                continuation_token: None,
            })
        });
        store
            .expect_delete_objects()
            .times(1)
            .returning(|_, _| Err(Error::Auth("AccessDenied".into())));

        let mut batches = 0;
        let err = delete_all(&store, &BucketPath::parse("bkt").unwrap(), |_| batches += 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(batches, 0);
    }

    #[tokio::test]
    async fn test_list_error_propagates() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .returning(|bucket, _| Err(Error::NotFound(bucket.to_string())));

        let err = list_all(&store, &BucketPath::parse("missing").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref b) if b == "missing"));
    }
}
