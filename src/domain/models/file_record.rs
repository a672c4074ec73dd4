use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::stored_value::{StoredItem, StoredValue};

pub const ATTR_ID: &str = "id";
pub const ATTR_FILENAME: &str = "filename";
pub const ATTR_STORAGE_KEY: &str = "storageKey";
pub const ATTR_SIZE: &str = "size";
pub const ATTR_UPLOAD_TIMESTAMP: &str = "uploadTimestamp";

const STORAGE_KEY_PREFIX: &str = "uploads";

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record is missing attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("record attribute '{0}' has an unexpected value")]
    InvalidAttribute(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub storage_key: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Creates the record for a file about to be uploaded: fresh id, derived
    /// storage key, zero size.
    pub fn new_upload(filename: &str) -> Self {
        let id = Uuid::new_v4().to_string();
        let storage_key = Self::storage_key_for(&id, filename);

        Self {
            id,
            filename: filename.to_string(),
            storage_key,
            size: 0,
            uploaded_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn storage_key_for(id: &str, filename: &str) -> String {
        format!("{}/{}-{}", STORAGE_KEY_PREFIX, id, filename)
    }

    pub fn upload_timestamp(&self) -> String {
        self.uploaded_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn to_item(&self) -> StoredItem {
        let mut item = StoredItem::new();
        item.insert(ATTR_ID.to_string(), StoredValue::Text(self.id.clone()));
        item.insert(
            ATTR_FILENAME.to_string(),
            StoredValue::Text(self.filename.clone()),
        );
        item.insert(
            ATTR_STORAGE_KEY.to_string(),
            StoredValue::Text(self.storage_key.clone()),
        );
        item.insert(
            ATTR_SIZE.to_string(),
            StoredValue::Integer(i64::try_from(self.size).unwrap_or(i64::MAX)),
        );
        item.insert(
            ATTR_UPLOAD_TIMESTAMP.to_string(),
            StoredValue::Text(self.upload_timestamp()),
        );
        item
    }
}

impl TryFrom<&StoredItem> for FileRecord {
    type Error = RecordError;

    fn try_from(item: &StoredItem) -> Result<Self, Self::Error> {
        let size = match item.get(ATTR_SIZE).cloned().map(StoredValue::normalize) {
            None | Some(StoredValue::Null) => 0,
            Some(StoredValue::Integer(size)) => {
                u64::try_from(size).map_err(|_| RecordError::InvalidAttribute(ATTR_SIZE))?
            }
            Some(_) => return Err(RecordError::InvalidAttribute(ATTR_SIZE)),
        };

        let timestamp = text_attribute(item, ATTR_UPLOAD_TIMESTAMP)?;

        Ok(Self {
            id: text_attribute(item, ATTR_ID)?.to_string(),
            filename: text_attribute(item, ATTR_FILENAME)?.to_string(),
            storage_key: text_attribute(item, ATTR_STORAGE_KEY)?.to_string(),
            size,
            uploaded_at: parse_timestamp(timestamp)
                .ok_or(RecordError::InvalidAttribute(ATTR_UPLOAD_TIMESTAMP))?,
        })
    }
}

/// The attributes needed to locate a stored object. Reading a row as a
/// location ignores `size` and `uploadTimestamp` entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLocation {
    pub id: String,
    pub filename: String,
    pub storage_key: String,
}

pub const LOCATION_ATTRIBUTES: [&str; 3] = [ATTR_ID, ATTR_FILENAME, ATTR_STORAGE_KEY];

impl TryFrom<&StoredItem> for FileLocation {
    type Error = RecordError;

    fn try_from(item: &StoredItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: text_attribute(item, ATTR_ID)?.to_string(),
            filename: text_attribute(item, ATTR_FILENAME)?.to_string(),
            storage_key: text_attribute(item, ATTR_STORAGE_KEY)?.to_string(),
        })
    }
}

impl From<&FileRecord> for FileLocation {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id.clone(),
            filename: record.filename.clone(),
            storage_key: record.storage_key.clone(),
        }
    }
}

fn text_attribute<'a>(item: &'a StoredItem, name: &'static str) -> Result<&'a str, RecordError> {
    item.get(name)
        .ok_or(RecordError::MissingAttribute(name))?
        .as_text()
        .ok_or(RecordError::InvalidAttribute(name))
}

// Older rows may carry a naive ISO-8601 timestamp without an offset.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
