use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::{
    application::{
        error::ApplicationError, repositories::metadata_repository::MetadataRepository,
    },
    domain::models::{
        file_record::{FileLocation, FileRecord, ATTR_ID, LOCATION_ATTRIBUTES},
        stored_value::{StoredItem, StoredValue},
    },
};

type DynamoItem = HashMap<String, AttributeValue>;

pub struct DynamoMetadataRepository {
    client: Client,
    table_name: String,
}

impl DynamoMetadataRepository {
    pub fn new(sdk_config: &SdkConfig, table_name: String, endpoint_url: Option<String>) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name,
        }
    }
}

#[async_trait]
impl MetadataRepository for DynamoMetadataRepository {
    async fn put_metadata(&self, record: &FileRecord) -> Result<(), ApplicationError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_dynamo_item(record.to_item())))
            .send()
            .await
            .map_err(|e| ApplicationError::DatabaseError(DisplayErrorContext(&e).to_string()))?;

        debug!("Stored metadata for file_id: {}", record.id);
        Ok(())
    }

    async fn get_metadata(
        &self,
        file_id: &str,
    ) -> Result<Option<FileLocation>, ApplicationError> {
        let (projection, names) = location_projection();
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_ID, AttributeValue::S(file_id.to_string()))
            .projection_expression(projection)
            .set_expression_attribute_names(Some(names))
            .send()
            .await
            .map_err(|e| ApplicationError::DatabaseError(DisplayErrorContext(&e).to_string()))?;

        match output.item() {
            Some(item) => Ok(Some(FileLocation::try_from(&from_dynamo_item(item))?)),
            None => Ok(None),
        }
    }

    async fn scan_metadata(&self) -> Result<Vec<StoredItem>, ApplicationError> {
        let mut items = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    ApplicationError::DatabaseError(DisplayErrorContext(&e).to_string())
                })?;

            items.extend(output.items().iter().map(from_dynamo_item));

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!("Scanned {} metadata items", items.len());
        Ok(items)
    }
}

// Attribute names go through placeholders so reserved words never clash
fn location_projection() -> (String, HashMap<String, String>) {
    let names: HashMap<String, String> = LOCATION_ATTRIBUTES
        .iter()
        .enumerate()
        .map(|(index, name)| (format!("#a{}", index), name.to_string()))
        .collect();
    let projection = (0..LOCATION_ATTRIBUTES.len())
        .map(|index| format!("#a{}", index))
        .collect::<Vec<_>>()
        .join(", ");
    (projection, names)
}

fn to_dynamo_item(item: StoredItem) -> DynamoItem {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

fn to_attribute(value: StoredValue) -> AttributeValue {
    match value {
        StoredValue::Null => AttributeValue::Null(true),
        StoredValue::Bool(flag) => AttributeValue::Bool(flag),
        StoredValue::Text(text) => AttributeValue::S(text),
        StoredValue::Decimal(text) => AttributeValue::N(text),
        StoredValue::Integer(number) => AttributeValue::N(number.to_string()),
        StoredValue::Float(number) => AttributeValue::N(number.to_string()),
        StoredValue::List(values) => {
            AttributeValue::L(values.into_iter().map(to_attribute).collect())
        }
        StoredValue::Map(entries) => AttributeValue::M(
            entries
                .into_iter()
                .map(|(name, value)| (name, to_attribute(value)))
                .collect(),
        ),
    }
}

fn from_dynamo_item(item: &DynamoItem) -> StoredItem {
    item.iter()
        .map(|(name, value)| (name.clone(), from_attribute(value)))
        .collect()
}

fn from_attribute(value: &AttributeValue) -> StoredValue {
    match value {
        AttributeValue::S(text) => StoredValue::Text(text.clone()),
        AttributeValue::N(number) => StoredValue::Decimal(number.clone()),
        AttributeValue::Bool(flag) => StoredValue::Bool(*flag),
        AttributeValue::Null(_) => StoredValue::Null,
        AttributeValue::L(values) => StoredValue::List(values.iter().map(from_attribute).collect()),
        AttributeValue::M(entries) => StoredValue::Map(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), from_attribute(value)))
                .collect(),
        ),
        AttributeValue::Ss(texts) => {
            StoredValue::List(texts.iter().cloned().map(StoredValue::Text).collect())
        }
        AttributeValue::Ns(numbers) => {
            StoredValue::List(numbers.iter().cloned().map(StoredValue::Decimal).collect())
        }
        AttributeValue::B(blob) => StoredValue::Text(STANDARD.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => StoredValue::List(
            blobs
                .iter()
                .map(|blob| StoredValue::Text(STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        _ => StoredValue::Null,
    }
}
