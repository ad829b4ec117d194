//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3sign-core.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use s3sign_core::{
    Error, ListOptions, ListResult, ObjectInfo, ObjectRef, ObjectStore, Result, SessionConfig,
};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a client from the ambient credential chain and the session settings
    pub async fn connect(session: &SessionConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(session.region.clone()));

        if let Some(profile) = &session.profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&config).force_path_style(session.force_path_style);
        if let Some(endpoint) = &session.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(
            region = %session.region,
            profile = ?session.profile,
            endpoint = ?session.endpoint,
            path_style = session.force_path_style,
            "Created S3 session"
        );

        Ok(Self::from_conf(builder.build()))
    }

    /// Create a client from a prepared SDK configuration
    pub fn from_conf(conf: aws_sdk_s3::Config) -> Self {
        Self {
            inner: aws_sdk_s3::Client::from_conf(conf),
        }
    }
}

/// Translate an SDK error into the core error type, keeping the operation
/// name and target in the message
///
/// The full error chain only goes to the debug log.
fn map_sdk_error<E>(operation: &str, target: &str, err: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    tracing::debug!("{operation} {target} failed: {}", DisplayErrorContext(&err));

    let summary = match err.message() {
        Some(message) => format!("{err}: {message}"),
        None => err.to_string(),
    };
    classify_error(operation, target, err.code(), &summary)
}

fn classify_error(operation: &str, target: &str, code: Option<&str>, summary: &str) -> Error {
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => {
            Error::NotFound(format!("{operation} {target}"))
        }
        Some(
            "AccessDenied"
            | "AllAccessDisabled"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken",
        ) => Error::Auth(format!("{operation} {target}: {summary}")),
        _ => Error::Network(format!("{operation} {target}: {summary}")),
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(options.prefix)
            .set_max_keys(options.max_keys)
            .set_continuation_token(options.continuation_token)
            .send()
            .await
            .map_err(|e| map_sdk_error("list", bucket, e))?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut info =
                    ObjectInfo::file(object.key().unwrap_or_default(), object.size().unwrap_or(0));

                if let Some(modified) = object.last_modified() {
                    info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
                }

                if let Some(etag) = object.e_tag() {
                    info.etag = Some(etag.trim_matches('"').to_string());
                }

                if let Some(sc) = object.storage_class() {
                    info.storage_class = Some(sc.as_str().to_string());
                }

                info
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>> {
        let target = object.to_string();
        let response = self
            .inner
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get", &target, e))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(format!("get {target}: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn put_object(
        &self,
        object: &ObjectRef,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;
        let body = aws_sdk_s3::primitives::ByteStream::from(data);

        let response = self
            .inner
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .body(body)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| map_sdk_error("put", &object.to_string(), e))?;

        let mut info = ObjectInfo::file(&object.key, size);
        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::General(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete", bucket, e))?;

        let errors = response.errors();
        if !errors.is_empty() {
            for failure in errors {
                tracing::warn!(
                    "Failed to delete {bucket}/{}: {} {}",
                    failure.key().unwrap_or_default(),
                    failure.code().unwrap_or_default(),
                    failure.message().unwrap_or_default()
                );
            }
            let message = format!(
                "delete {bucket}: {} of {} key(s) rejected",
                errors.len(),
                keys.len()
            );
            return Err(match errors[0].code() {
                Some("AccessDenied") => Error::Auth(message),
                _ => Error::General(message),
            });
        }

        Ok(response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(|k| k.to_string()))
            .collect())
    }

    async fn presign_get(&self, object: &ObjectRef, expires_in: Duration) -> Result<String> {
        let target = object.to_string();
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| Error::InvalidArgument(format!("presign {target}: {e}")))?;

        let request = self
            .inner
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .presigned(config)
            .await
            .map_err(|e| map_sdk_error("presign", &target, e))?;

        Ok(request.uri().to_string())
    }
}
