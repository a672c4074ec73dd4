use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
};
use tracing::{info, warn};

use crate::{
    adapters::{
        dto::file_dto::{FileDownloadResponse, UploadFileResponse},
        response::ApiResponse,
    },
    application::{
        dto::upload_dto::UploadRequest, error::ApplicationError,
        services::file_service::FileService,
    },
};

pub struct FileController;

impl FileController {
    /// Issues a presigned upload form and records the file's metadata
    /// POST /upload
    /// Body: {"filename": "a.txt", "contentType": "text/plain"}
    pub async fn upload_file(
        State(file_service): State<FileService>,
        body: Result<Bytes, BytesRejection>,
    ) -> Result<ApiResponse, ApplicationError> {
        info!("Upload requested");

        // Unreadable or oversized bodies get the same answer as malformed JSON
        let body = body.map_err(|rejection| {
            warn!("Upload body rejected: {}", rejection.body_text());
            ApplicationError::invalid_body()
        })?;
        let request = UploadRequest::from_json(&body)?;
        let ticket = file_service.upload(request).await?;

        Ok(ApiResponse::ok(&UploadFileResponse::from(ticket)))
    }

    /// GET /files
    pub async fn list_files(
        State(file_service): State<FileService>,
    ) -> Result<ApiResponse, ApplicationError> {
        info!("File listing requested");

        let files = file_service.list().await?;
        Ok(ApiResponse::ok(&files))
    }

    /// GET /files/{id}
    pub async fn get_file(
        State(file_service): State<FileService>,
        file_id: Result<Path<String>, PathRejection>,
    ) -> Result<ApiResponse, ApplicationError> {
        // An id that does not decode to UTF-8 cannot name a stored file
        let Path(file_id) = file_id.map_err(|rejection| {
            warn!("File id rejected: {}", rejection.body_text());
            ApplicationError::file_not_found()
        })?;
        info!("File requested: {}", file_id);

        let download = file_service.get(&file_id).await?;
        Ok(ApiResponse::ok(&FileDownloadResponse::from(download)))
    }

    /// Any unmatched method or path.
    pub async fn not_found() -> ApplicationError {
        ApplicationError::route_not_found()
    }
}
