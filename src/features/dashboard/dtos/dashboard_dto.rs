use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Live record counts per store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    pub categories: i64,
    pub sub_categories: i64,
    pub products: i64,
}
