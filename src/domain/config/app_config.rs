use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bucket_name: String,
    pub table_name: String,
    pub port: u16,
    pub aws_region: Option<String>,
    pub s3_endpoint_url: Option<String>,
    pub dynamodb_endpoint_url: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port = match optional("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let cors_allowed_origins = optional("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });

        Ok(Self {
            bucket_name: required("BUCKET_NAME")?,
            table_name: required("TABLE_NAME")?,
            port,
            aws_region: optional("AWS_REGION"),
            s3_endpoint_url: optional("S3_ENDPOINT_URL"),
            dynamodb_endpoint_url: optional("DYNAMODB_ENDPOINT_URL"),
            cors_allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn required_names_and_defaults() {
        let config = load(&[("BUCKET_NAME", "uploads"), ("TABLE_NAME", "files")]).unwrap();

        assert_eq!(config.bucket_name, "uploads");
        assert_eq!(config.table_name, "files");
        assert_eq!(config.port, 8080);
        assert_eq!(config.aws_region, None);
        assert_eq!(config.s3_endpoint_url, None);
        assert_eq!(config.cors_allowed_origins, None);
    }

    #[test]
    fn missing_bucket_is_an_error() {
        assert_eq!(
            load(&[("TABLE_NAME", "files")]),
            Err(ConfigError::Missing("BUCKET_NAME"))
        );
    }

    #[test]
    fn blank_table_counts_as_missing() {
        assert_eq!(
            load(&[("BUCKET_NAME", "uploads"), ("TABLE_NAME", "  ")]),
            Err(ConfigError::Missing("TABLE_NAME"))
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert_eq!(
            load(&[
                ("BUCKET_NAME", "uploads"),
                ("TABLE_NAME", "files"),
                ("PORT", "eighty"),
            ]),
            Err(ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            })
        );
    }

    #[test]
    fn optional_overrides_are_read() {
        let config = load(&[
            ("BUCKET_NAME", "uploads"),
            ("TABLE_NAME", "files"),
            ("PORT", "3000"),
            ("AWS_REGION", "eu-west-1"),
            ("S3_ENDPOINT_URL", "http://localhost:4566"),
            ("DYNAMODB_ENDPOINT_URL", "http://localhost:8000"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.s3_endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(
            config.dynamodb_endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(
            config.cors_allowed_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }
}
