use crate::domain::models::file_record::RecordError;

#[derive(Debug)]
pub enum ApplicationError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
    DatabaseError(String),
}

impl ApplicationError {
    pub fn route_not_found() -> Self {
        ApplicationError::NotFound("Not found".to_string())
    }

    pub fn file_not_found() -> Self {
        ApplicationError::NotFound("File not found".to_string())
    }

    pub fn invalid_body() -> Self {
        ApplicationError::BadRequest("Invalid request body".to_string())
    }
}

impl From<RecordError> for ApplicationError {
    fn from(error: RecordError) -> Self {
        ApplicationError::DatabaseError(format!("Malformed file record: {}", error))
    }
}
