use std::{collections::BTreeMap, ops::RangeInclusive, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use crate::application::error::ApplicationError;

/// Everything a client needs to POST a file straight to the bucket: the form
/// target and the signed form fields to send alongside the file part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresignedPost {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

#[async_trait]
pub trait UrlIssuer: Send + Sync {
    async fn issue_upload_url(
        &self,
        key: &str,
        content_type: &str,
        size_range: RangeInclusive<u64>,
        ttl: Duration,
    ) -> Result<PresignedPost, ApplicationError>;

    async fn issue_download_url(&self, key: &str, ttl: Duration)
        -> Result<String, ApplicationError>;
}
