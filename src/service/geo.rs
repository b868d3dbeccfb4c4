use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::model::user::User;
use crate::model::work_location::{LocationType, WorkLocation};
use crate::store::WorkLocationDirectory;

/// Mean earth radius used for haversine distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A validated pair of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Both values are required and must be finite and within range.
    pub fn parse(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Self> {
        let (latitude, longitude) = match (latitude, longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(AppError::validation("latitude and longitude are required")),
        };

        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::validation(
                "latitude must be between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::validation(
                "longitude must be between -180 and 180",
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn of(location: &WorkLocation) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

/// Checks that `point` lies inside the geofence of at least one location.
///
/// On failure the message names the radius of the nearest location.
pub fn check_within_any(
    point: &GeoPoint,
    location_type: LocationType,
    locations: &[WorkLocation],
) -> AppResult<()> {
    let mut nearest: Option<(f64, &WorkLocation)> = None;

    for location in locations {
        let distance = point.distance_to(&GeoPoint::of(location));
        if distance <= location.radius_meters {
            tracing::debug!(
                location_id = location.id,
                distance_m = distance,
                "Punch inside geofence"
            );
            return Ok(());
        }
        if nearest.is_none_or(|(best, _)| distance < best) {
            nearest = Some((distance, location));
        }
    }

    match nearest {
        Some((distance, location)) => {
            tracing::info!(
                %location_type,
                location_id = location.id,
                distance_m = distance,
                radius_m = location.radius_meters,
                "Punch outside geofence"
            );
            Err(AppError::validation(format!(
                "more than {}m from {}; punch rejected",
                location.radius_meters, location_type
            )))
        }
        None => Err(AppError::not_found(format!(
            "no work location registered for {location_type}"
        ))),
    }
}

pub struct GeoValidator {
    locations: Arc<dyn WorkLocationDirectory>,
}

impl GeoValidator {
    pub fn new(locations: Arc<dyn WorkLocationDirectory>) -> Self {
        Self { locations }
    }

    /// Validates a punch position for `user`. Users flagged to skip the
    /// check pass without any location lookup.
    pub async fn validate(&self, user: &User, point: &GeoPoint) -> AppResult<()> {
        if user.skip_location_check {
            tracing::debug!(user_id = user.id, "Location check skipped");
            return Ok(());
        }

        let candidates = self.locations.find_by_type(user.location_type).await?;
        check_within_any(point, user.location_type, &candidates)
    }
}
