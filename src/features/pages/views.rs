//! Notices, redirects and option filtering shared by the admin pages

use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::subcategories::dtos::SubcategoryResponseDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "warning" => NoticeLevel::Warning,
            "error" => NoticeLevel::Error,
            _ => NoticeLevel::Success,
        }
    }
}

/// Transient message shown after a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Validation problems are warnings; everything else is an error
    pub fn from_error(err: &AppError) -> Self {
        let level = match err {
            AppError::Validation(_) | AppError::BadRequest(_) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Self {
            level,
            message: err.public_message(),
        }
    }
}

/// Query string accepted by every admin page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub notice: Option<String>,
    pub level: Option<String>,
    /// Product to open in the edit modal
    pub edit: Option<String>,
    /// Category selected in the product form
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
}

impl PageQuery {
    pub fn notice(&self) -> Option<Notice> {
        let message = self.notice.as_deref().map(str::trim).filter(|m| !m.is_empty())?;
        Some(Notice {
            level: NoticeLevel::parse(self.level.as_deref().unwrap_or_default()),
            message: message.to_string(),
        })
    }

    pub fn edit_id(&self) -> Option<Uuid> {
        self.edit.as_deref().and_then(|v| Uuid::parse_str(v.trim()).ok())
    }

    pub fn category(&self) -> Option<Uuid> {
        self.category_id
            .as_deref()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
    }
}

/// Post-redirect-get back to `path` carrying a notice
pub fn redirect_with_notice(path: &str, notice: &Notice) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{}{}notice={}&level={}",
        path,
        separator,
        urlencoding::encode(&notice.message),
        notice.level.as_str()
    ))
}

/// Subcategories selectable for the given category; none until a category is chosen
pub fn subcategory_options(
    all: &[SubcategoryResponseDto],
    category_id: Option<Uuid>,
) -> Vec<SubcategoryResponseDto> {
    match category_id {
        Some(id) => all
            .iter()
            .filter(|s| s.category_id.id == id)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Accept only admin-local redirect targets
pub fn safe_return_to(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v)
            if (v == "/admin" || v.starts_with("/admin/") || v.starts_with("/admin?"))
                && !v.contains("//")
                && !v.contains('\\') =>
        {
            v.to_string()
        }
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;
    use chrono::Utc;

    use crate::shared::types::EntityRef;

    fn sub(name: &str, category_id: Uuid) -> SubcategoryResponseDto {
        SubcategoryResponseDto {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category_id: EntityRef {
                id: category_id,
                name: "Parent".to_string(),
            },
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subcategory_options_follow_selected_category() {
        let electronics = Uuid::new_v4();
        let toys = Uuid::new_v4();
        let all = vec![
            sub("Mobiles", electronics),
            sub("Puzzles", toys),
            sub("Laptops", electronics),
        ];

        let names: Vec<String> = subcategory_options(&all, Some(electronics))
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Mobiles", "Laptops"]);

        assert!(subcategory_options(&all, None).is_empty());
        assert!(subcategory_options(&all, Some(Uuid::new_v4())).is_empty());
    }

    #[test]
    fn test_notice_from_query() {
        let query = PageQuery {
            notice: Some("Category added successfully!".to_string()),
            level: Some("warning".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.notice(),
            Some(Notice {
                level: NoticeLevel::Warning,
                message: "Category added successfully!".to_string(),
            })
        );

        assert_eq!(PageQuery::default().notice(), None);

        let unknown_level = PageQuery {
            notice: Some("hi".to_string()),
            level: Some("bogus".to_string()),
            ..Default::default()
        };
        assert_eq!(unknown_level.notice().unwrap().level, NoticeLevel::Success);
    }

    #[test]
    fn test_notice_level_from_error() {
        let warning = Notice::from_error(&AppError::Validation("Name and Category are required".into()));
        assert_eq!(warning.level, NoticeLevel::Warning);
        assert_eq!(warning.message, "Name and Category are required");

        let error = Notice::from_error(&AppError::Storage("disk full".into()));
        assert_eq!(error.level, NoticeLevel::Error);
        assert_eq!(error.message, "Failed to store image");
    }

    #[test]
    fn test_redirect_encodes_notice() {
        let response =
            redirect_with_notice("/admin/categories", &Notice::success("Category added!"))
                .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/admin/categories?notice=Category%20added%21&level=success"
        );

        let response =
            redirect_with_notice("/admin/products?edit=1", &Notice::success("x")).into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/admin/products?edit=1&notice=x&level=success"
        );
    }

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/admin"), "/admin/products"), "/admin");
        assert_eq!(
            safe_return_to(Some("/admin/products"), "/admin"),
            "/admin/products"
        );
        assert_eq!(
            safe_return_to(Some("https://evil.example"), "/admin"),
            "/admin"
        );
        assert_eq!(safe_return_to(Some("/admin//evil"), "/admin"), "/admin");
        assert_eq!(safe_return_to(Some("/administrator"), "/admin"), "/admin");
        assert_eq!(safe_return_to(None, "/admin/products"), "/admin/products");
    }
}
