//! In-memory store for exercising the mode handlers

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use s3sign_core::{
    Error, ListOptions, ListResult, ObjectInfo, ObjectRef, ObjectStore, Result,
};

use crate::output::{Formatter, OutputConfig};

/// Single-bucket store; keys listed in `unsignable` fail to presign
#[derive(Default)]
pub struct StubStore {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub unsignable: Vec<String>,
    pub list_error: Option<fn() -> Error>,
}

impl StubStore {
    pub fn with_objects(entries: &[(&str, &[u8])]) -> Self {
        let objects = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect();
        Self {
            objects: Mutex::new(objects),
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for StubStore {
    async fn list_objects(&self, _bucket: &str, options: ListOptions) -> Result<ListResult> {
        if let Some(make_error) = self.list_error {
            return Err(make_error());
        }
        let prefix = options.prefix.unwrap_or_default();
        let items = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| ObjectInfo::file(k, v.len() as i64))
            .collect();
        Ok(ListResult {
            items,
            ..Default::default()
        })
    }

    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&object.key)
            .cloned()
            .ok_or_else(|| Error::NotFound(object.to_string()))
    }

    async fn put_object(
        &self,
        object: &ObjectRef,
        data: Vec<u8>,
        _content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;
        self.objects
            .lock()
            .unwrap()
            .insert(object.key.clone(), data);
        Ok(ObjectInfo::file(&object.key, size))
    }

    async fn delete_objects(&self, _bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        let mut objects = self.objects.lock().unwrap();
        for key in &keys {
            objects.remove(key);
        }
        Ok(keys)
    }

    async fn presign_get(&self, object: &ObjectRef, expires_in: Duration) -> Result<String> {
        if self.unsignable.contains(&object.key) {
            return Err(Error::Auth(format!("presign {object}: AccessDenied")));
        }
        Ok(format!(
            "https://{}.example.test/{}?X-Amz-Expires={}",
            object.bucket,
            object.key,
            expires_in.as_secs()
        ))
    }
}

pub fn quiet_formatter() -> Formatter {
    Formatter::new(OutputConfig {
        quiet: true,
        ..Default::default()
    })
}
