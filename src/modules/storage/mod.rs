//! Storage module for product images
//!
//! Provides the `AssetStore` abstraction and its two backends: a local-disk
//! store served by the HTTP layer and an S3/MinIO-compatible object store.
//! Exactly one backend is wired in at startup.

mod local_store;
mod object_store;

pub use local_store::LocalDiskStore;
pub use object_store::ObjectStorageStore;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_SIZE};
use crate::shared::validation::{UNSAFE_FILE_CHAR_REGEX, WHITESPACE_RUN_REGEX};

/// Durable storage for uploaded product images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store the bytes and return the asset path recorded on the product
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<String>;

    /// Remove a previously stored asset
    async fn delete(&self, asset_path: &str) -> Result<()>;

    /// Absolute URL clients can fetch the asset from
    fn resolve_url(&self, asset_path: &str) -> String;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Lowercased extension of a file name, if any
pub fn image_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Reject uploads that are not jpeg/jpg/png/webp images or are too large
pub fn validate_image(file_name: &str, size: usize) -> Result<()> {
    let allowed = image_extension(file_name)
        .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !allowed {
        return Err(AppError::Validation(
            "Only image files (jpeg, jpg, png, webp) are allowed".to_string(),
        ));
    }

    if size > MAX_IMAGE_SIZE {
        return Err(AppError::Validation(format!(
            "Image too large. Maximum size is {} MB",
            MAX_IMAGE_SIZE / 1024 / 1024
        )));
    }

    Ok(())
}

/// MIME type to upload an image with, derived from its extension
pub fn content_type_for(file_name: &str) -> &'static str {
    match image_extension(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn clean_segment(segment: &str) -> String {
    let underscored = WHITESPACE_RUN_REGEX.replace_all(segment, "_");
    UNSAFE_FILE_CHAR_REGEX
        .replace_all(&underscored, "")
        .into_owned()
}

/// Make an uploaded file name safe to use as a path segment.
///
/// The extension survives even when nothing of the stem does.
pub fn sanitize_file_name(original_name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name)
        .trim();

    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) => (stem, clean_segment(ext)),
        None => (base, String::new()),
    };

    let stem = clean_segment(stem);
    let stem = match stem.trim_start_matches('.') {
        "" => "image",
        cleaned => cleaned,
    };

    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// Collision-resistant stored name: `{unix_millis}-{8 hex}-{sanitized name}`
pub fn unique_file_name(original_name: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &nonce[..8],
        sanitize_file_name(original_name)
    )
}

pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
