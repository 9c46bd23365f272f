use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client as S3Client, config::Region, error::DisplayErrorContext, primitives::ByteStream,
};
use common::{
    env_config::StorageConfig,
    error::{AppError, Res},
};
use futures::future::BoxFuture;

use crate::{ObjectStorage, keys::build_public_url};

/// S3 or any S3-compatible provider (Backblaze B2, R2, MinIO).
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        S3Storage {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Builds the client from the ambient AWS credential chain and `config`.
    pub async fn connect(config: &StorageConfig) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        log::info!(
            "Object storage: bucket {} in {} ({})",
            config.bucket,
            config.region,
            config.endpoint.as_deref().unwrap_or("aws")
        );

        S3Storage::new(
            S3Client::from_conf(s3_config_builder.build()),
            config.bucket.clone(),
            config.public_base_url.clone(),
        )
    }
}

impl ObjectStorage for S3Storage {
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>, content_type: &'a str) -> BoxFuture<'a, Res<String>> {
        Box::pin(async move {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(bytes))
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!("upload of {} failed: {}", key, DisplayErrorContext(&e)))
                })?;
            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Res<()>> {
        Box::pin(async move {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!("delete of {} failed: {}", key, DisplayErrorContext(&e)))
                })?;
            Ok(())
        })
    }

    fn public_url(&self, key: &str) -> String {
        build_public_url(&self.public_base_url, &self.bucket, key)
    }
}
