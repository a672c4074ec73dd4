use std::{ops::RangeInclusive, sync::Arc, time::Duration};

use serde_json::Value;
use tracing::info;

use crate::{
    application::{
        dto::upload_dto::{FileDownload, UploadRequest, UploadTicket},
        error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
        services::url_issuer::UrlIssuer,
    },
    domain::models::{file_record::FileRecord, stored_value::item_to_json},
};

pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(300);
/// Accepted upload size, 1 byte to 20 MiB.
pub const UPLOAD_SIZE_RANGE: RangeInclusive<u64> = 1..=20 * 1024 * 1024;

/// The upload, list and get operations over the metadata table and the
/// bucket. Holds no state of its own beyond the two injected clients.
#[derive(Clone)]
pub struct FileService {
    metadata_repository: Arc<dyn MetadataRepository>,
    url_issuer: Arc<dyn UrlIssuer>,
}

impl FileService {
    pub fn new(
        metadata_repository: Arc<dyn MetadataRepository>,
        url_issuer: Arc<dyn UrlIssuer>,
    ) -> Self {
        Self {
            metadata_repository,
            url_issuer,
        }
    }

    /// Issues a presigned POST for a new object and records its metadata.
    /// The record is written before the client has sent any bytes.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadTicket, ApplicationError> {
        info!(
            "Preparing upload: filename='{}', contentType='{}'",
            request.filename, request.content_type
        );

        let record = FileRecord::new_upload(&request.filename);

        let upload = self
            .url_issuer
            .issue_upload_url(
                &record.storage_key,
                &request.content_type,
                UPLOAD_SIZE_RANGE,
                UPLOAD_URL_TTL,
            )
            .await?;

        self.metadata_repository.put_metadata(&record).await?;

        info!("Upload prepared for file_id: {}", record.id);
        Ok(UploadTicket { record, upload })
    }

    /// Every stored record with its numbers normalized to plain JSON numbers.
    pub async fn list(&self) -> Result<Vec<Value>, ApplicationError> {
        info!("Listing file metadata");

        let items = self.metadata_repository.scan_metadata().await?;
        Ok(items.into_iter().map(item_to_json).collect())
    }

    pub async fn get(&self, file_id: &str) -> Result<FileDownload, ApplicationError> {
        info!("Fetching file metadata and download URL for file_id: {}", file_id);

        let location = self
            .metadata_repository
            .get_metadata(file_id)
            .await?
            .ok_or_else(ApplicationError::file_not_found)?;

        let download_url = self
            .url_issuer
            .issue_download_url(&location.storage_key, DOWNLOAD_URL_TTL)
            .await?;

        Ok(FileDownload {
            id: location.id,
            filename: location.filename,
            download_url,
        })
    }
}
