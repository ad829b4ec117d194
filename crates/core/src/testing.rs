//! In-memory ObjectStore used by the unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::path::ObjectRef;
use crate::traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};

/// Bucket contents keyed by (bucket, key), with a small page size so
/// pagination is exercised
pub struct MemoryStore {
    objects: Mutex<BTreeMap<ObjectRef, Vec<u8>>>,
    page_size: usize,
    pub gets: Mutex<Vec<ObjectRef>>,
    pub delete_batches: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            gets: Mutex::new(Vec::new()),
            delete_batches: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(ObjectRef::new(bucket, key), data.to_vec());
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|o| o.bucket == bucket)
            .map(|o| o.key.clone())
            .collect()
    }

    pub fn data(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&ObjectRef::new(bucket, key))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult> {
        let limit = options
            .max_keys
            .map(|m| m as usize)
            .unwrap_or(self.page_size)
            .min(self.page_size);
        let prefix = options.prefix.unwrap_or_default();
        let after = options.continuation_token.unwrap_or_default();

        let objects = self.objects.lock().unwrap();
        let mut matching = objects.iter().filter(|(o, _)| {
            o.bucket == bucket && o.key.starts_with(&prefix) && o.key.as_str() > after.as_str()
        });

        let items: Vec<ObjectInfo> = matching
            .by_ref()
            .take(limit)
            .map(|(o, data)| ObjectInfo::file(&o.key, data.len() as i64))
            .collect();
        let truncated = matching.next().is_some();

        Ok(ListResult {
            continuation_token: if truncated {
                items.last().map(|i| i.key.clone())
            } else {
                None
            },
            items,
            truncated,
        })
    }

    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>> {
        self.gets.lock().unwrap().push(object.clone());
        self.objects
            .lock()
            .unwrap()
            .get(object)
            .cloned()
            .ok_or_else(|| Error::NotFound(object.to_string()))
    }

    async fn put_object(
        &self,
        object: &ObjectRef,
        data: Vec<u8>,
        _content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let info = ObjectInfo::file(&object.key, data.len() as i64);
        self.objects.lock().unwrap().insert(object.clone(), data);
        Ok(info)
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        self.delete_batches.lock().unwrap().push(keys.len());
        let mut objects = self.objects.lock().unwrap();
        Ok(keys
            .into_iter()
            .filter(|k| objects.remove(&ObjectRef::new(bucket, k.as_str())).is_some())
            .collect())
    }

    async fn presign_get(&self, object: &ObjectRef, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "https://{}.example.test/{}?X-Amz-Expires={}",
            object.bucket,
            object.key,
            expires_in.as_secs()
        ))
    }
}
