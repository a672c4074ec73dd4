use axum::extract::FromRef;

use crate::application::services::file_service::FileService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub file_service: FileService,
}
