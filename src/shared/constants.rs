/// Image file extensions accepted for product uploads (lowercase, without dot)
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// Maximum product image size in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Number of products shown on the admin dashboard
pub const RECENT_PRODUCTS_LIMIT: usize = 6;

/// Category name length bounds (characters, after trimming)
pub const CATEGORY_NAME_MIN_LEN: usize = 2;
pub const CATEGORY_NAME_MAX_LEN: usize = 50;

/// Longest product or subcategory name the schema stores (characters)
pub const NAME_MAX_LEN: usize = 255;

/// Largest MRP a `NUMERIC(12, 2)` column holds, in hundredths
pub const MRP_MAX_CENTS: i64 = 999_999_999_999;
