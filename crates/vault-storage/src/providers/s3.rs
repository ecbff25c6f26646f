//! S3-compatible object store (AWS S3, Cloudflare R2, MinIO).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use vault_core::config::storage::{S3StorageConfig, StorageConfig};
use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::storage::{ObjectBody, ObjectHead, ObjectStore, attachment_disposition};
use vault_core::types::range::ByteRange;

/// S3 requires every part but the last to be at least this large.
const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Object store backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    presign_expiry: Duration,
    multipart_threshold: u64,
    part_size: u64,
}

/// Map an SDK failure that is not a "not found" into the error taxonomy.
///
/// Dispatch and timeout failures mean the store could not be reached.
fn sdk_error<E, R>(action: &str, key: &str, e: SdkError<E, R>) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let kind = match &e {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ErrorKind::StoreUnavailable,
        _ => ErrorKind::Storage,
    };
    error!(key, error = %e, "S3 {action} failed");
    AppError::with_source(kind, format!("S3 {action} failed for '{key}'"), e)
}

impl S3ObjectStore {
    /// Build a client from configuration.
    ///
    /// Explicit keys take precedence over the default credential chain.
    /// A custom endpoint switches to the addressing style the config asks for.
    pub async fn new(storage: &StorageConfig) -> AppResult<Self> {
        let config: &S3StorageConfig = &storage.s3;
        if config.multipart_part_size_bytes < MIN_PART_SIZE {
            return Err(AppError::configuration(format!(
                "storage.s3.multipart_part_size_bytes must be at least {MIN_PART_SIZE}"
            )));
        }

        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(config.region.clone()));
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "vault-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 object store configured"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            presign_expiry: Duration::from_secs(storage.presign_expiry_seconds),
            multipart_threshold: config.multipart_threshold_bytes,
            part_size: config.multipart_part_size_bytes,
        })
    }

    fn presigning_config(&self) -> AppResult<PresigningConfig> {
        PresigningConfig::builder()
            .expires_in(self.presign_expiry)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid presign expiry", e)
            })
    }

    async fn put_multipart(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| sdk_error("create multipart upload", key, e))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| AppError::storage(format!("No upload id returned for '{key}'")))?
            .to_string();

        match self.upload_parts(key, &upload_id, &data).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| sdk_error("complete multipart upload", key, e))?;
                Ok(())
            }
            Err(e) => {
                let abort = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                if let Err(abort_err) = abort {
                    warn!(key, error = %abort_err, "Failed to abort multipart upload");
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(&self, key: &str, upload_id: &str, data: &Bytes) -> AppResult<Vec<CompletedPart>> {
        let part_size = self.part_size as usize;
        let mut parts = Vec::new();
        for (index, start) in (0..data.len()).step_by(part_size).enumerate() {
            let end = (start + part_size).min(data.len());
            let part_number = i32::try_from(index + 1)
                .map_err(|_| AppError::storage(format!("Too many parts for '{key}'")))?;
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(S3ByteStream::from(data.slice(start..end)))
                .send()
                .await
                .map_err(|e| sdk_error("upload part", key, e))?;
            let etag = uploaded
                .e_tag()
                .ok_or_else(|| AppError::storage(format!("No ETag for part {part_number} of '{key}'")))?;
            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );
        }
        Ok(parts)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let start = Instant::now();
        let size = data.len() as u64;
        if size >= self.multipart_threshold {
            self.put_multipart(key, data, content_type).await?;
        } else {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .content_length(size as i64)
                .body(S3ByteStream::from(data))
                .send()
                .await
                .map_err(|e| sdk_error("put", key, e))?;
        }
        info!(
            bucket = %self.bucket,
            key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );
        Ok(())
    }

    async fn get(&self, key: &str, range: Option<ByteRange>) -> AppResult<ObjectBody> {
        // The object size is needed to resolve open-ended and suffix ranges
        // and to answer with an accurate Content-Range.
        let head = self
            .head(key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))?;
        let resolved = range.map(|r| r.resolve(head.size)).transpose()?;

        let mut request = self.client.get_object().bucket(&self.bucket).key(key);
        if let Some(r) = resolved {
            request = request.range(r.to_header_value());
        }
        let response = request.send().await.map_err(|e| match &e {
            SdkError::ServiceError(service_err)
                if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
            {
                AppError::not_found(format!("Object not found: {key}"))
            }
            _ => sdk_error("get", key, e),
        })?;

        let content_type = response.content_type().map(str::to_string).or(head.content_type);
        let body = ReaderStream::new(response.body.into_async_read()).boxed();
        debug!(key, range = ?resolved, "S3 get started");

        Ok(ObjectBody {
            body,
            content_type,
            content_length: resolved.map_or(head.size, |r| r.len()),
            total_size: head.size,
            range: resolved,
        })
    }

    async fn head(&self, key: &str) -> AppResult<Option<ObjectHead>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(out) => Ok(Some(ObjectHead {
                size: out.content_length().unwrap_or(0).max(0) as u64,
                content_type: out.content_type().map(str::to_string),
            })),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(None)
            }
            Err(e) => Err(sdk_error("head", key, e)),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        // DeleteObject succeeds for keys that do not exist.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("delete", key, e))?;
        debug!(bucket = %self.bucket, key, "S3 delete successful");
        Ok(())
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> AppResult<String> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| sdk_error("presign upload", key, e))?;
        Ok(request.uri().to_string())
    }

    async fn presign_download(&self, key: &str, filename: Option<&str>) -> AppResult<String> {
        let mut request = self.client.get_object().bucket(&self.bucket).key(key);
        if let Some(name) = filename {
            request = request.response_content_disposition(attachment_disposition(name));
        }
        let presigned = request
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| sdk_error("presign download", key, e))?;
        Ok(presigned.uri().to_string())
    }
}
