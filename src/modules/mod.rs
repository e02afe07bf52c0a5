//! Infrastructure adapters used by the features
//!
//! Currently only image storage (local disk or an S3-compatible bucket).

pub mod storage;
