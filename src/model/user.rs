use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::work_location::LocationType;

/// An employee as seen by the attendance core. Owned by the user directory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Hanako Sato")]
    pub name: String,

    #[schema(example = "office")]
    pub location_type: LocationType,

    /// Users with this flag may punch from anywhere.
    #[schema(example = false)]
    pub skip_location_check: bool,

    #[schema(example = "2024-04-01", format = "date", value_type = String, nullable = true)]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "2024-04-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,

    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,
}
