//! S3 (and S3-compatible) object store over `aws-sdk-s3`.
//!
//! The client is built from an explicit [`S3Config`]: static credentials,
//! region, optional custom endpoint. Nothing is read from the environment.

use super::backend::{ObjectStore, StoreError, WaitPolicy};
use crate::config::S3Config;
use async_trait::async_trait;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use url::Url;

const CREDENTIALS_SOURCE: &str = "image-uploader-config";

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_base: Option<Url>,
}

impl S3Store {
    pub fn new(config: &S3Config) -> Result<Self, StoreError> {
        if config.bucket.is_empty() {
            return Err(StoreError::Config("store.s3.bucket is empty".into()));
        }

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_SOURCE,
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        let public_base = config
            .public_base_url
            .as_deref()
            .map(super::parse_base_url)
            .transpose()?;

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
            public_base,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn remote(operation: &'static str, e: impl std::error::Error) -> StoreError {
    StoreError::Remote {
        operation,
        message: DisplayErrorContext(e).to_string(),
    }
}

/// `{endpoint}/{bucket}/{key}` for S3-compatible providers, the virtual-hosted
/// AWS form otherwise.
fn default_object_url(endpoint: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| remote("delete_object", e))?;
        debug!(bucket = %self.bucket, key, "deleted object");
        Ok(())
    }

    async fn put_public(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| remote("read_body", e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| remote("put_object", e))?;
        debug!(bucket = %self.bucket, key, content_type, "put object");
        Ok(())
    }

    async fn wait_until_exists(&self, key: &str, policy: &WaitPolicy) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self
            .client
            .wait_until_object_exists()
            .bucket(&self.bucket)
            .key(key)
            .wait(policy.max_wait)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(_) if start.elapsed() >= policy.max_wait => Err(StoreError::Timeout {
                key: key.to_string(),
                waited: start.elapsed(),
            }),
            Err(e) => Err(remote("head_object", e)),
        }
    }

    fn public_url(&self, key: &str) -> Result<String, StoreError> {
        match &self.public_base {
            Some(base) => base
                .join(key)
                .map(String::from)
                .map_err(|_| StoreError::InvalidKey(key.to_string())),
            None => Ok(default_object_url(
                self.endpoint.as_deref(),
                &self.bucket,
                &self.region,
                key,
            )),
        }
    }
}
