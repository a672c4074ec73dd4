use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    application::{error::ApplicationError, services::url_issuer::PresignedPost},
    domain::models::file_record::FileRecord,
};

const MISSING_FIELDS: &str = "Missing filename or contentType";

/// Upload request body as sent by the client. Fields stay optional here so
/// that absence can be reported with a single validation message.
#[derive(Debug, Deserialize)]
pub struct UploadRequestDTO {
    pub filename: Option<String>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
}

/// A validated upload request: both fields present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
}

impl TryFrom<UploadRequestDTO> for UploadRequest {
    type Error = ApplicationError;

    fn try_from(value: UploadRequestDTO) -> Result<Self, Self::Error> {
        match (value.filename, value.content_type) {
            (Some(filename), Some(content_type))
                if !filename.is_empty() && !content_type.is_empty() =>
            {
                Ok(UploadRequest {
                    filename,
                    content_type,
                })
            }
            _ => Err(ApplicationError::BadRequest(MISSING_FIELDS.to_string())),
        }
    }
}

impl UploadRequest {
    /// Parses a JSON object body. Any other top-level value, including an
    /// array in field order, is an invalid body.
    pub fn from_json(body: &[u8]) -> Result<Self, ApplicationError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|_| ApplicationError::invalid_body())?;
        let dto: UploadRequestDTO = serde_json::from_value(Value::Object(object))
            .map_err(|_| ApplicationError::invalid_body())?;
        dto.try_into()
    }
}

#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub record: FileRecord,
    pub upload: PresignedPost,
}

#[derive(Debug, Clone)]
pub struct FileDownload {
    pub id: String,
    pub filename: String,
    pub download_url: String,
}
