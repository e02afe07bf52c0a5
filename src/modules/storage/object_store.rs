//! S3/MinIO-compatible image store
//!
//! Uploads product images into a bucket folder and records the public object
//! URL as the asset path. Uses rust-s3 for object operations and a hand-signed
//! (AWS Signature v4) request for the bucket policy, which rust-s3 does not cover.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::core::config::ObjectStorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{content_type_for, is_absolute_url, unique_file_name, AssetStore};

type HmacSha256 = Hmac<Sha256>;

pub struct ObjectStorageStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    folder: String,
    access_key: String,
    secret_key: String,
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl ObjectStorageStore {
    /// Create the store from configuration.
    ///
    /// This will:
    /// 1. Create the bucket if it doesn't exist
    /// 2. Set public read policy for the image folder
    pub async fn new(config: ObjectStorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create S3 bucket handle: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket/key) work for both MinIO and S3
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let store = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            folder: config.folder,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        store.ensure_bucket_exists().await?;
        store.set_public_read_policy().await?;

        info!(
            "Object image store ready: endpoint={}, bucket={}, folder={}",
            store.endpoint,
            store.bucket.name(),
            store.folder
        );

        Ok(store)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) -> Result<()> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<()> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Allow anonymous reads of the image folder so `imageUrl` works in browsers
    async fn set_public_read_policy(&self) -> Result<()> {
        let bucket_name = self.bucket.name();
        let folder = &self.folder;

        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [format!("arn:aws:s3:::{bucket_name}/{folder}/*")]
                }
            ]
        });

        match self
            .put_bucket_policy_with_sigv4(&bucket_name, &policy.to_string())
            .await
        {
            Ok(_) => {
                info!("Set public read policy for {}/{}/*", bucket_name, folder);
            }
            Err(e) => {
                // Policy can still be applied by hand, e.g. `mc anonymous set download`
                warn!(
                    "Failed to set bucket policy for '{}': {}. Image URLs may not be publicly readable.",
                    bucket_name, e
                );
            }
        }
        Ok(())
    }

    /// Put bucket policy using AWS Signature v4
    async fn put_bucket_policy_with_sigv4(&self, bucket_name: &str, policy: &str) -> Result<()> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Storage(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Storage("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let url = format!("{}/{}?policy", self.endpoint, bucket_name);
        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_uri = format!("/{}", bucket_name);
        let canonical_querystring = "policy=";
        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host_header, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n{}\n{}\n{}\n{}",
            canonical_uri, canonical_querystring, canonical_headers, signed_headers, payload_hash
        );

        let algorithm = "AWS4-HMAC-SHA256";
        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            algorithm, amz_date, credential_scope, canonical_request_hash
        );

        let signature = signature_v4(
            &self.secret_key,
            &date_stamp,
            &self.region_name,
            &string_to_sign,
        )?;

        let authorization_header = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.access_key, credential_scope, signed_headers, signature
        );

        let response = self
            .http_client
            .put(&url)
            .header("Host", &host_header)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", &authorization_header)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::Storage(format!(
                "Failed to set bucket policy: {} - {}",
                status, body
            )))
        }
    }

    /// Public URL of an object key
    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }
}

#[async_trait]
impl AssetStore for ObjectStorageStore {
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<String> {
        let key = format!("{}/{}", self.folder, unique_file_name(original_name));

        self.bucket
            .put_object_with_content_type(&key, &data, content_type_for(original_name))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload image '{}': {}", key, e)))?;

        debug!("Uploaded image '{}' to bucket '{}'", key, self.bucket.name());
        Ok(self.public_url(&key))
    }

    async fn delete(&self, asset_path: &str) -> Result<()> {
        let key = if is_absolute_url(asset_path) {
            object_key_from_url(asset_path, &self.public_endpoint, &self.bucket.name())
                .ok_or_else(|| {
                    AppError::Storage(format!(
                        "Cannot derive object key from '{}'",
                        asset_path
                    ))
                })?
        } else {
            asset_path.trim_start_matches('/').to_string()
        };

        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete image '{}': {}", key, e)))?;

        debug!("Deleted image '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn resolve_url(&self, asset_path: &str) -> String {
        if is_absolute_url(asset_path) {
            asset_path.to_string()
        } else {
            self.public_url(asset_path.trim_start_matches('/'))
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

fn decode_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<String> {
    segments
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect()
}

/// Derive an object key from a stored URL.
///
/// URLs this store produced start with `{public_endpoint}/{bucket}/`, which may
/// carry a path prefix of its own (`https://host/minio/bucket/products/a.png`).
/// Other URLs fall back to their path segments: path-style URLs carry the
/// bucket as the first segment (`http://host/bucket/products/a.png`);
/// virtual-host URLs (`https://bucket.s3.amazonaws.com/products/a.png`) carry
/// only the key.
pub fn object_key_from_url(url: &str, public_endpoint: &str, bucket: &str) -> Option<String> {
    let own_prefix = format!("{}/{}/", public_endpoint.trim_end_matches('/'), bucket);
    let segments = match url.strip_prefix(&own_prefix) {
        Some(rest) => {
            let path = rest.split(['?', '#']).next().unwrap_or_default();
            decode_segments(path.split('/'))
        }
        None => {
            let parsed = Url::parse(url).ok()?;
            let segments = decode_segments(parsed.path_segments()?);
            if segments.first().map(String::as_str) == Some(bucket) {
                segments[1..].to_vec()
            } else {
                segments
            }
        }
    };

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Calculate an AWS Signature v4 signature for an S3 request
fn signature_v4(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    string_to_sign: &str,
) -> Result<String> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;

    let signature = hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
    Ok(hex::encode(signature))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "http://localhost:9000";
    const BUCKET: &str = "inventory-uploads";

    #[test]
    fn test_object_key_from_path_style_url() {
        assert_eq!(
            object_key_from_url(
                "http://localhost:9000/inventory-uploads/products/1-ab-phone.png",
                ENDPOINT,
                BUCKET
            ),
            Some("products/1-ab-phone.png".to_string())
        );
    }

    #[test]
    fn test_object_key_from_public_endpoint_with_path_prefix() {
        assert_eq!(
            object_key_from_url(
                "https://cdn.example.com/minio/inventory-uploads/products/1-ab-phone.png",
                "https://cdn.example.com/minio/",
                BUCKET
            ),
            Some("products/1-ab-phone.png".to_string())
        );
        assert_eq!(
            object_key_from_url(
                "https://cdn.example.com/minio/inventory-uploads/products/a%20b.png?v=1",
                "https://cdn.example.com/minio",
                BUCKET
            ),
            Some("products/a b.png".to_string())
        );
    }

    #[test]
    fn test_object_key_from_virtual_host_url() {
        assert_eq!(
            object_key_from_url(
                "https://inventory-uploads.s3.amazonaws.com/products/a%20b.png",
                ENDPOINT,
                BUCKET
            ),
            Some("products/a b.png".to_string())
        );
    }

    #[test]
    fn test_object_key_from_url_rejects_bucket_root() {
        assert_eq!(
            object_key_from_url("http://localhost:9000/inventory-uploads/", ENDPOINT, BUCKET),
            None
        );
        assert_eq!(object_key_from_url("not a url", ENDPOINT, BUCKET), None);
    }

    #[test]
    fn test_signature_v4_is_stable_hex_digest() {
        let signature = signature_v4(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20130524",
            "us-east-1",
            "test",
        )
        .unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        let again = signature_v4(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20130524",
            "us-east-1",
            "test",
        )
        .unwrap();
        assert_eq!(signature, again);
    }
}
