use serde::Serialize;

use crate::application::{
    dto::upload_dto::{FileDownload, UploadTicket},
    services::url_issuer::PresignedPost,
};

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub id: String,
    #[serde(rename = "uploadURL")]
    pub upload_url: PresignedPost,
}

impl From<UploadTicket> for UploadFileResponse {
    fn from(ticket: UploadTicket) -> Self {
        Self {
            id: ticket.record.id,
            upload_url: ticket.upload,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileDownloadResponse {
    pub id: String,
    pub filename: String,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

impl From<FileDownload> for FileDownloadResponse {
    fn from(download: FileDownload) -> Self {
        Self {
            id: download.id,
            filename: download.filename,
            download_url: download.download_url,
        }
    }
}
