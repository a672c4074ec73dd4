use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::models::{
        file_record::{FileLocation, FileRecord},
        stored_value::StoredItem,
    },
};

#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Writes the record keyed by its id, replacing any existing item.
    async fn put_metadata(&self, record: &FileRecord) -> Result<(), ApplicationError>;
    /// Reads only the attributes needed to locate the object.
    async fn get_metadata(&self, file_id: &str)
        -> Result<Option<FileLocation>, ApplicationError>;
    /// Every item in the table, in whatever order the store returns them.
    async fn scan_metadata(&self) -> Result<Vec<StoredItem>, ApplicationError>;
}
