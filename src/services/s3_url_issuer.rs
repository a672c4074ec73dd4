use std::{ops::RangeInclusive, time::Duration};

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::{presigning::PresigningConfig, Client};
use tracing::debug;

use crate::{
    application::{
        error::ApplicationError,
        services::url_issuer::{PresignedPost, UrlIssuer},
    },
    services::{
        error::StorageError,
        post_policy::{self, PostPolicyBuilder, SigningCredentials},
    },
};

/// Issues presigned upload forms and download URLs for one S3 bucket.
pub struct S3UrlIssuer {
    client: Client,
    credentials: SharedCredentialsProvider,
    bucket_name: String,
    region: String,
    post_url: String,
}

impl S3UrlIssuer {
    pub fn new(
        sdk_config: &SdkConfig,
        bucket_name: String,
        endpoint_url: Option<String>,
    ) -> Result<Self, StorageError> {
        let region = sdk_config
            .region()
            .map(|region| region.to_string())
            .ok_or_else(|| StorageError::Configuration("AWS region is not set".to_string()))?;

        let credentials = sdk_config.credentials_provider().ok_or_else(|| {
            StorageError::InvalidCredentials("no AWS credentials provider configured".to_string())
        })?;

        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let post_url = post_policy::post_target_url(&bucket_name, &region, endpoint_url.as_deref());

        debug!(
            bucket = %bucket_name,
            region = %region,
            "Created S3 URL issuer"
        );

        Ok(Self {
            client,
            credentials,
            bucket_name,
            region,
            post_url,
        })
    }

    async fn signing_credentials(&self) -> Result<SigningCredentials, StorageError> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| StorageError::InvalidCredentials(e.to_string()))?;

        Ok(SigningCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl UrlIssuer for S3UrlIssuer {
    async fn issue_upload_url(
        &self,
        key: &str,
        content_type: &str,
        size_range: RangeInclusive<u64>,
        ttl: Duration,
    ) -> Result<PresignedPost, ApplicationError> {
        let credentials = self.signing_credentials().await?;

        let fields = PostPolicyBuilder::new(&self.bucket_name, key, &self.region)
            .content_type(content_type)
            .content_length_range(size_range)
            .expires_in(ttl)
            .sign(&credentials)?;

        Ok(PresignedPost {
            url: self.post_url.clone(),
            fields,
        })
    }

    async fn issue_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, ApplicationError> {
        post_policy::validate_expiry(ttl)?;

        let presigning_config = PresigningConfig::expires_in(ttl).map_err(|e| {
            StorageError::PresignError(format!("Failed to create presigning config: {}", e))
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                StorageError::PresignError(format!("Failed to generate presigned GET URL: {}", e))
            })?;

        Ok(presigned.uri().to_string())
    }
}
