mod error;
mod post_policy;
mod s3_url_issuer;

pub use error::StorageError;
pub use s3_url_issuer::S3UrlIssuer;

use std::sync::Arc;

use aws_config::SdkConfig;

use crate::{application::services::url_issuer::UrlIssuer, domain::config::app_config::AppConfig};

pub fn create_url_issuer(
    sdk_config: &SdkConfig,
    config: &AppConfig,
) -> Result<Arc<dyn UrlIssuer>, StorageError> {
    let issuer = S3UrlIssuer::new(
        sdk_config,
        config.bucket_name.clone(),
        config.s3_endpoint_url.clone(),
    )?;
    Ok(Arc::new(issuer))
}
