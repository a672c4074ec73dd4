mod adapters;
mod application;
mod domain;
mod services;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use adapters::{
    repositories::DynamoMetadataRepository, routes::build_router, state::AppState,
};
use application::{
    repositories::metadata_repository::MetadataRepository, services::file_service::FileService,
};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use axum::http::HeaderValue;
use domain::config::app_config::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize AWS SDK crypto provider (required for aws-sdk-s3)
    // This must be called before any AWS SDK operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = AppConfig::from_env().unwrap_or_else(|e| panic!("ERROR: {}", e));

    tracing::info!(
        "Starting file-drop-service with bucket '{}' and table '{}'",
        config.bucket_name,
        config.table_name
    );

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    // Both clients are created once and shared by every request
    let url_issuer = services::create_url_issuer(&sdk_config, &config)
        .unwrap_or_else(|e| panic!("ERROR: Failed to create S3 URL issuer: {}", e));
    let metadata_repository = Arc::new(DynamoMetadataRepository::new(
        &sdk_config,
        config.table_name.clone(),
        config.dynamodb_endpoint_url.clone(),
    )) as Arc<dyn MetadataRepository>;

    let app_state = AppState {
        file_service: FileService::new(metadata_repository, url_issuer),
    };

    // Configure CORS
    let cors = match &config.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .map(|s| s.parse().expect("Invalid CORS origin"))
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    };

    let router = build_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
