use std::str::FromStr;

use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::products::models::Product;
use crate::modules::storage::AssetStore;
use crate::shared::constants::{MRP_MAX_CENTS, NAME_MAX_LEN};
use crate::shared::types::EntityRef;

/// An image file received in a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Raw product form fields as received from multipart/form-data.
///
/// Blank values count as absent. Shared by the JSON API and the admin pages.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub quantity: Option<String>,
    pub mrp: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Product form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The handlers read the multipart body through `ProductForm`.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ProductFormSchema {
    #[schema(example = "Phone X")]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    #[schema(example = 10)]
    pub quantity: Option<i64>,
    #[schema(example = 19999)]
    pub mrp: Option<f64>,
    /// jpeg, jpg, png or webp, at most 10MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Validated input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Uuid,
    pub quantity: i64,
    pub mrp: Decimal,
    pub image: Option<ImageUpload>,
}

/// Validated input for updating a product; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub mrp: Option<Decimal>,
    pub image: Option<ImageUpload>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_name(value: Option<String>) -> Result<Option<String>> {
    match non_blank(value) {
        Some(name) if name.chars().count() > NAME_MAX_LEN => Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            NAME_MAX_LEN
        ))),
        name => Ok(name),
    }
}

fn parse_id(value: Option<String>, field: &str) -> Result<Option<Uuid>> {
    non_blank(value)
        .map(|v| {
            Uuid::parse_str(&v).map_err(|_| AppError::Validation(format!("Invalid {}", field)))
        })
        .transpose()
}

fn parse_quantity(value: Option<String>) -> Result<Option<i64>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };

    match raw.parse::<i64>() {
        Ok(quantity) if quantity >= 0 => Ok(Some(quantity)),
        _ => Err(AppError::Validation(
            "Quantity must be a non-negative whole number".to_string(),
        )),
    }
}

fn parse_mrp(value: Option<String>) -> Result<Option<Decimal>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };

    let max = Decimal::new(MRP_MAX_CENTS, 2);
    match Decimal::from_str(&raw).map(|mrp| mrp.round_dp(2)) {
        Ok(mrp) if mrp.is_zero() => Ok(Some(Decimal::ZERO)),
        Ok(mrp) if mrp > Decimal::ZERO && mrp <= max => Ok(Some(mrp)),
        Ok(mrp) if mrp > max => Err(AppError::Validation(format!(
            "MRP must be at most {}",
            max
        ))),
        _ => Err(AppError::Validation(
            "MRP must be a non-negative number".to_string(),
        )),
    }
}

impl ProductForm {
    /// Read the product fields out of a multipart body
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == "image" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read image bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;

                // Browsers send an empty part when no file was chosen
                if !file_name.is_empty() && !data.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
            })?;

            match field_name.as_str() {
                "name" => form.name = Some(text),
                "categoryId" => form.category_id = Some(text),
                "subCategoryId" => form.sub_category_id = Some(text),
                "quantity" => form.quantity = Some(text),
                "mrp" => form.mrp = Some(text),
                _ => debug!("Ignoring unknown field: {}", field_name),
            }
        }

        Ok(form)
    }

    /// Validate the form for product creation
    pub fn into_create(self) -> Result<CreateProductInput> {
        let name = parse_name(self.name)?;
        let category_id = parse_id(self.category_id, "categoryId")?;
        let sub_category_id = parse_id(self.sub_category_id, "subCategoryId")?;

        let (name, category_id, sub_category_id) = match (name, category_id, sub_category_id) {
            (Some(name), Some(category_id), Some(sub_category_id)) => {
                (name, category_id, sub_category_id)
            }
            _ => {
                return Err(AppError::Validation(
                    "Please provide all required fields".to_string(),
                ))
            }
        };

        Ok(CreateProductInput {
            name,
            category_id,
            sub_category_id,
            quantity: parse_quantity(self.quantity)?.unwrap_or(0),
            mrp: parse_mrp(self.mrp)?.unwrap_or(Decimal::ZERO),
            image: self.image,
        })
    }

    /// Validate the form for a partial update
    pub fn into_update(self) -> Result<UpdateProductInput> {
        Ok(UpdateProductInput {
            name: parse_name(self.name)?,
            category_id: parse_id(self.category_id, "categoryId")?,
            sub_category_id: parse_id(self.sub_category_id, "subCategoryId")?,
            quantity: parse_quantity(self.quantity)?,
            mrp: parse_mrp(self.mrp)?,
            image: self.image,
        })
    }
}

/// Response DTO for product, with both references populated
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    pub category_id: EntityRef,
    pub sub_category_id: EntityRef,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 19999)]
    pub mrp: Decimal,
    /// Stored asset path or URL
    pub image: Option<String>,
    /// Absolute URL of the image
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponseDto {
    pub fn from_product(p: Product, assets: &dyn AssetStore) -> Self {
        let image_url = p.image.as_deref().map(|path| assets.resolve_url(path));

        Self {
            id: p.id,
            name: p.name,
            category_id: EntityRef {
                id: p.category_id,
                name: p.category_name,
            },
            sub_category_id: EntityRef {
                id: p.sub_category_id,
                name: p.sub_category_name,
            },
            quantity: p.quantity,
            mrp: p.mrp,
            image: p.image,
            image_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, category: &str, sub: &str) -> ProductForm {
        ProductForm {
            name: Some(name.to_string()),
            category_id: Some(category.to_string()),
            sub_category_id: Some(sub.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_create_applies_defaults() {
        let category = Uuid::new_v4();
        let sub = Uuid::new_v4();

        let input = form(" Phone X ", &category.to_string(), &sub.to_string())
            .into_create()
            .unwrap();
        assert_eq!(input.name, "Phone X");
        assert_eq!(input.category_id, category);
        assert_eq!(input.sub_category_id, sub);
        assert_eq!(input.quantity, 0);
        assert_eq!(input.mrp, Decimal::ZERO);
        assert!(input.image.is_none());
    }

    #[test]
    fn test_into_create_requires_all_references() {
        let category = Uuid::new_v4().to_string();

        let err = form("Phone X", &category, "").into_create().unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Please provide all required fields"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let err = form("  ", &category, &category).into_create().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_into_create_rejects_malformed_ids() {
        let err = form("Phone X", "not-a-uuid", &Uuid::new_v4().to_string())
            .into_create()
            .unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Invalid categoryId"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_fields() {
        assert_eq!(parse_quantity(Some("0".into())).unwrap(), Some(0));
        assert_eq!(parse_quantity(Some(" 12 ".into())).unwrap(), Some(12));
        assert_eq!(parse_quantity(Some("".into())).unwrap(), None);
        assert!(parse_quantity(Some("-1".into())).is_err());
        assert!(parse_quantity(Some("1.5".into())).is_err());
        assert!(parse_quantity(Some("ten".into())).is_err());

        assert_eq!(
            parse_mrp(Some("19999".into())).unwrap(),
            Some(Decimal::from(19999))
        );
        assert_eq!(
            parse_mrp(Some("12.345".into())).unwrap(),
            Some(Decimal::from_str("12.34").unwrap())
        );
        assert_eq!(parse_mrp(Some("0".into())).unwrap(), Some(Decimal::ZERO));
        assert!(parse_mrp(Some("-0.01".into())).is_err());
        assert!(parse_mrp(Some("abc".into())).is_err());
    }

    #[test]
    fn test_mrp_bounds() {
        assert_eq!(parse_mrp(Some("-0".into())).unwrap(), Some(Decimal::ZERO));
        assert_eq!(parse_mrp(Some("-0.00".into())).unwrap(), Some(Decimal::ZERO));
        assert_eq!(
            parse_mrp(Some("9999999999.99".into())).unwrap(),
            Some(Decimal::from_str("9999999999.99").unwrap())
        );

        let err = parse_mrp(Some("10000000000".into())).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "MRP must be at most 9999999999.99"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_name_length_is_bounded() {
        let category = Uuid::new_v4().to_string();
        let sub = Uuid::new_v4().to_string();

        let longest = "a".repeat(NAME_MAX_LEN);
        assert!(form(&longest, &category, &sub).into_create().is_ok());

        let too_long = "a".repeat(NAME_MAX_LEN + 1);
        assert!(matches!(
            form(&too_long, &category, &sub).into_create(),
            Err(AppError::Validation(_))
        ));

        let update = ProductForm {
            name: Some(too_long),
            ..Default::default()
        };
        assert!(matches!(update.into_update(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_into_update_keeps_absent_fields_absent() {
        let update = ProductForm {
            quantity: Some("0".to_string()),
            name: Some("".to_string()),
            ..Default::default()
        }
        .into_update()
        .unwrap();

        assert_eq!(update.quantity, Some(0));
        assert!(update.name.is_none());
        assert!(update.category_id.is_none());
        assert!(update.mrp.is_none());
    }
}
