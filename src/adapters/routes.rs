use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::{controllers::file_controller::FileController, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(FileController::upload_file))
        // HEAD would otherwise be answered by the GET handlers
        .route(
            "/files",
            get(FileController::list_files).head(FileController::not_found),
        )
        .route(
            "/files/{id}",
            get(FileController::get_file).head(FileController::not_found),
        )
        .fallback(FileController::not_found)
        .method_not_allowed_fallback(FileController::not_found)
        .with_state(state)
}
