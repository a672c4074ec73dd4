//! Browser-upload (POST object) policies signed with AWS Signature Version 4.
//!
//! The AWS SDK only presigns query-string requests, which cannot carry a
//! `content-length-range` condition. A POST policy can: the client submits a
//! multipart form to the bucket with the returned fields plus the file, and S3
//! checks every condition in the signed policy document before accepting it.

use std::{collections::BTreeMap, ops::RangeInclusive, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Map, Value};
use sha2::Sha256;

use crate::services::error::StorageError;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Maximum lifetime of a signed policy (7 days).
pub const MAX_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct SigningCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Builder for the form fields of a presigned POST upload.
pub struct PostPolicyBuilder {
    bucket: String,
    key: String,
    region: String,
    content_type: Option<String>,
    content_length_range: Option<RangeInclusive<u64>>,
    expires_in: Duration,
    timestamp: Option<DateTime<Utc>>,
}

impl PostPolicyBuilder {
    pub fn new(bucket: &str, key: &str, region: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            region: region.to_string(),
            content_type: None,
            content_length_range: None,
            expires_in: Duration::from_secs(3600),
            timestamp: None,
        }
    }

    /// Require the uploaded object's `Content-Type` to equal this value.
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn content_length_range(mut self, range: RangeInclusive<u64>) -> Self {
        self.content_length_range = Some(range);
        self
    }

    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Sign as of a fixed instant instead of now.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the policy document and returns the form fields that must be
    /// posted with the file.
    pub fn sign(
        self,
        credentials: &SigningCredentials,
    ) -> Result<BTreeMap<String, String>, StorageError> {
        validate_expiry(self.expires_in)?;
        if self.bucket.is_empty() {
            return Err(StorageError::PresignError("bucket name is empty".to_string()));
        }
        if self.key.is_empty() {
            return Err(StorageError::PresignError("object key is empty".to_string()));
        }
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(StorageError::InvalidCredentials(
                "access key and secret key are required".to_string(),
            ));
        }

        let now = self.timestamp.unwrap_or_else(Utc::now);
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let credential = format!(
            "{}/{}/{}/{}/aws4_request",
            credentials.access_key_id, date_stamp, self.region, SERVICE
        );

        let expiration = now
            + chrono::Duration::from_std(self.expires_in)
                .map_err(|e| StorageError::PresignError(e.to_string()))?;

        let mut fields = BTreeMap::new();
        fields.insert("key".to_string(), self.key.clone());
        fields.insert("x-amz-algorithm".to_string(), ALGORITHM.to_string());
        fields.insert("x-amz-credential".to_string(), credential);
        fields.insert("x-amz-date".to_string(), amz_date);
        if let Some(content_type) = &self.content_type {
            fields.insert("Content-Type".to_string(), content_type.clone());
        }
        if let Some(token) = &credentials.session_token {
            fields.insert("x-amz-security-token".to_string(), token.clone());
        }

        let mut conditions: Vec<Value> = vec![json!({ "bucket": self.bucket })];
        conditions.extend(fields.iter().map(|(name, value)| {
            let mut condition = Map::new();
            condition.insert(name.clone(), Value::String(value.clone()));
            Value::Object(condition)
        }));
        if let Some(range) = &self.content_length_range {
            conditions.push(json!(["content-length-range", range.start(), range.end()]));
        }

        let policy = json!({
            "expiration": expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "conditions": conditions,
        });
        let encoded_policy = STANDARD.encode(policy.to_string());

        let signing_key = signing_key(
            &credentials.secret_access_key,
            &date_stamp,
            &self.region,
        );
        let signature = hex::encode(hmac_sha256(&signing_key, encoded_policy.as_bytes()));

        fields.insert("policy".to_string(), encoded_policy);
        fields.insert("x-amz-signature".to_string(), signature);
        Ok(fields)
    }
}

pub fn validate_expiry(expires_in: Duration) -> Result<(), StorageError> {
    if expires_in.is_zero() {
        Err(StorageError::PresignError(
            "expiry duration must be greater than zero".to_string(),
        ))
    } else if expires_in > MAX_EXPIRY {
        Err(StorageError::PresignError(format!(
            "expiry duration {:?} exceeds maximum allowed {:?}",
            expires_in, MAX_EXPIRY
        )))
    } else {
        Ok(())
    }
}

/// Form target for a bucket: virtual-hosted AWS endpoint, or path-style when
/// a custom endpoint is configured.
pub fn post_target_url(bucket: &str, region: &str, endpoint_url: Option<&str>) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com/", bucket, region),
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC key should be valid");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn signing_key(secret_key: &str, date: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credentials() -> SigningCredentials {
        SigningCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
        }
    }

    fn builder() -> PostPolicyBuilder {
        PostPolicyBuilder::new("file-drop", "uploads/abc-a.txt", "us-east-1")
            .content_type("text/plain")
            .content_length_range(1..=20_971_520)
            .expires_in(Duration::from_secs(600))
            .timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
    }

    fn decoded_policy(fields: &BTreeMap<String, String>) -> Value {
        let raw = STANDARD.decode(&fields["policy"]).unwrap();
        serde_json::from_slice(&raw).unwrap()
    }

    #[test]
    fn returns_form_fields() {
        let fields = builder().sign(&credentials()).unwrap();

        assert_eq!(fields["key"], "uploads/abc-a.txt");
        assert_eq!(fields["Content-Type"], "text/plain");
        assert_eq!(fields["x-amz-algorithm"], "AWS4-HMAC-SHA256");
        assert_eq!(
            fields["x-amz-credential"],
            "AKIDEXAMPLE/20240115/us-east-1/s3/aws4_request"
        );
        assert_eq!(fields["x-amz-date"], "20240115T120000Z");
        assert_eq!(fields["x-amz-signature"].len(), 64);
        assert!(!fields.contains_key("x-amz-security-token"));
    }

    #[test]
    fn policy_carries_expiration_and_conditions() {
        let fields = builder().sign(&credentials()).unwrap();
        let policy = decoded_policy(&fields);

        assert_eq!(policy["expiration"], "2024-01-15T12:10:00.000Z");
        let conditions = policy["conditions"].as_array().unwrap();
        assert!(conditions.contains(&json!({"bucket": "file-drop"})));
        assert!(conditions.contains(&json!({"key": "uploads/abc-a.txt"})));
        assert!(conditions.contains(&json!({"Content-Type": "text/plain"})));
        assert!(conditions.contains(&json!(["content-length-range", 1, 20971520])));
    }

    #[test]
    fn signature_is_deterministic_and_key_dependent() {
        let first = builder().sign(&credentials()).unwrap();
        let second = builder().sign(&credentials()).unwrap();
        assert_eq!(first["x-amz-signature"], second["x-amz-signature"]);

        let mut other = credentials();
        other.secret_access_key = "another-secret".to_string();
        let third = builder().sign(&other).unwrap();
        assert_ne!(first["x-amz-signature"], third["x-amz-signature"]);
    }

    #[test]
    fn signature_matches_signing_key_over_policy() {
        let fields = builder().sign(&credentials()).unwrap();
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20240115",
            "us-east-1",
        );
        let expected = hex::encode(hmac_sha256(&key, fields["policy"].as_bytes()));
        assert_eq!(fields["x-amz-signature"], expected);
    }

    #[test]
    fn session_token_is_signed_into_policy() {
        let mut creds = credentials();
        creds.session_token = Some("session-token".to_string());

        let fields = builder().sign(&creds).unwrap();

        assert_eq!(fields["x-amz-security-token"], "session-token");
        let policy = decoded_policy(&fields);
        assert!(policy["conditions"]
            .as_array()
            .unwrap()
            .contains(&json!({"x-amz-security-token": "session-token"})));
    }

    #[test]
    fn rejects_out_of_range_expiry() {
        assert!(builder()
            .expires_in(Duration::ZERO)
            .sign(&credentials())
            .is_err());
        assert!(builder()
            .expires_in(MAX_EXPIRY + Duration::from_secs(1))
            .sign(&credentials())
            .is_err());
    }

    #[test]
    fn rejects_missing_credentials() {
        let creds = SigningCredentials {
            access_key_id: String::new(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        };
        assert!(matches!(
            builder().sign(&creds),
            Err(StorageError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn target_url_styles() {
        assert_eq!(
            post_target_url("file-drop", "eu-west-1", None),
            "https://file-drop.s3.eu-west-1.amazonaws.com/"
        );
        assert_eq!(
            post_target_url("file-drop", "us-east-1", Some("http://localhost:4566/")),
            "http://localhost:4566/file-drop"
        );
    }
}
