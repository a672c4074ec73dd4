pub mod file_service;
pub mod url_issuer;
