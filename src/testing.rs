//! In-memory stand-ins for the metadata table and the URL issuer.

use std::{
    collections::BTreeMap,
    ops::RangeInclusive,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    application::{
        error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
        services::url_issuer::{PresignedPost, UrlIssuer},
    },
    domain::models::{
        file_record::{FileLocation, FileRecord},
        stored_value::{StoredItem, StoredValue},
    },
};

/// Keeps items the way the table does: numbers as exact decimal text,
/// returned in key order.
#[derive(Default)]
pub struct InMemoryMetadataRepository {
    items: Mutex<BTreeMap<String, StoredItem>>,
}

impl InMemoryMetadataRepository {
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn insert_raw(&self, id: &str, item: StoredItem) {
        self.items.lock().unwrap().insert(id.to_string(), item);
    }
}

fn as_stored(value: StoredValue) -> StoredValue {
    match value {
        StoredValue::Integer(number) => StoredValue::Decimal(number.to_string()),
        StoredValue::Float(number) => StoredValue::Decimal(number.to_string()),
        StoredValue::List(values) => StoredValue::List(values.into_iter().map(as_stored).collect()),
        StoredValue::Map(entries) => StoredValue::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name, as_stored(value)))
                .collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl MetadataRepository for InMemoryMetadataRepository {
    async fn put_metadata(&self, record: &FileRecord) -> Result<(), ApplicationError> {
        let item = record
            .to_item()
            .into_iter()
            .map(|(name, value)| (name, as_stored(value)))
            .collect();
        self.insert_raw(&record.id, item);
        Ok(())
    }

    async fn get_metadata(
        &self,
        file_id: &str,
    ) -> Result<Option<FileLocation>, ApplicationError> {
        let items = self.items.lock().unwrap();
        match items.get(file_id) {
            Some(item) => Ok(Some(FileLocation::try_from(item)?)),
            None => Ok(None),
        }
    }

    async fn scan_metadata(&self) -> Result<Vec<StoredItem>, ApplicationError> {
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuedUpload {
    pub key: String,
    pub content_type: String,
    pub size_range: RangeInclusive<u64>,
    pub ttl: Duration,
}

/// Hands out fake URLs and remembers every request it was given.
#[derive(Default)]
pub struct RecordingUrlIssuer {
    uploads: Mutex<Vec<IssuedUpload>>,
    downloads: Mutex<Vec<(String, Duration)>>,
    failure: Mutex<Option<String>>,
}

impl RecordingUrlIssuer {
    pub fn uploads(&self) -> Vec<IssuedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<(String, Duration)> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), ApplicationError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(ApplicationError::InternalError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UrlIssuer for RecordingUrlIssuer {
    async fn issue_upload_url(
        &self,
        key: &str,
        content_type: &str,
        size_range: RangeInclusive<u64>,
        ttl: Duration,
    ) -> Result<PresignedPost, ApplicationError> {
        self.check_failure()?;
        self.uploads.lock().unwrap().push(IssuedUpload {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size_range,
            ttl,
        });

        Ok(PresignedPost {
            url: "https://test-bucket.s3.us-east-1.amazonaws.com/".to_string(),
            fields: BTreeMap::from([
                ("key".to_string(), key.to_string()),
                ("Content-Type".to_string(), content_type.to_string()),
            ]),
        })
    }

    async fn issue_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, ApplicationError> {
        self.check_failure()?;
        self.downloads.lock().unwrap().push((key.to_string(), ttl));
        Ok(format!(
            "https://test-bucket.s3.us-east-1.amazonaws.com/{}?X-Amz-Expires={}",
            key,
            ttl.as_secs()
        ))
    }
}

pub fn fakes() -> (Arc<InMemoryMetadataRepository>, Arc<RecordingUrlIssuer>) {
    (
        Arc::new(InMemoryMetadataRepository::default()),
        Arc::new(RecordingUrlIssuer::default()),
    )
}
