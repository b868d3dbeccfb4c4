use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationType {
    Office,
    Client,
}

/// A registered place employees may punch from, with its geofence radius.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkLocation {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Head office")]
    pub name: String,

    #[serde(rename = "type")]
    #[schema(example = "office")]
    pub location_type: LocationType,

    #[schema(example = 35.681236)]
    pub latitude: f64,

    #[schema(example = 139.767125)]
    pub longitude: f64,

    #[schema(example = 100.0)]
    pub radius_meters: f64,
}
