use crate::api::{attendance, paid_leave, summary, time_correction};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web::{self, Data};
use std::sync::Arc;
use anyhow::{Result, anyhow};

use crate::service::Services;

type Limiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limits. Built once; every worker's `Governor` shares the same buckets.
#[derive(Clone)]
pub struct RateLimits {
    punch: Limiter,
    protected: Limiter,
}

impl RateLimits {
    pub fn new(punch_per_min: u32, protected_per_min: u32) -> Result<Self> {
        Ok(Self {
            punch: build_limiter(punch_per_min)?,
            protected: build_limiter(protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))
}

/// Exposes each service to the handlers as `web::Data`.
pub fn register_services(cfg: &mut web::ServiceConfig, services: &Services) {
    cfg.app_data(Data::from(services.recorder.clone()))
        .app_data(Data::from(services.summaries.clone()))
        .app_data(Data::from(services.corrections.clone()))
        .app_data(Data::from(services.paid_leave.clone()));
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limits: &RateLimits) {
    let punch_limiter = Arc::new(Governor::new(&limits.punch));
    let protected_limiter = Arc::new(Governor::new(&limits.protected));

    cfg.service(
        web::scope(api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance/punch
                    .service(
                        web::resource("/punch")
                            .wrap(punch_limiter.clone())
                            .route(web::post().to(attendance::punch)),
                    )
                    // /attendance/{user_id}/clock-in
                    .service(
                        web::resource("/{user_id}/clock-in")
                            .wrap(punch_limiter.clone())
                            .route(web::post().to(attendance::clock_in)),
                    )
                    // /attendance/{user_id}/clock-out
                    .service(
                        web::resource("/{user_id}/clock-out")
                            .wrap(punch_limiter)
                            .route(web::post().to(attendance::clock_out)),
                    )
                    .service(
                        web::resource("/{user_id}/status").route(web::get().to(attendance::status)),
                    )
                    .service(
                        web::resource("/{user_id}/records")
                            .route(web::get().to(attendance::records)),
                    ),
            )
            .service(
                web::scope("/summary")
                    // /summary/statistics
                    .service(
                        web::resource("/statistics").route(web::get().to(summary::statistics)),
                    )
                    .service(
                        web::resource("/statistics/users/{user_id}")
                            .route(web::get().to(summary::personal_statistics)),
                    )
                    .service(
                        web::resource("/statistics/departments/{department_id}")
                            .route(web::get().to(summary::department_statistics)),
                    )
                    // /summary/{user_id}/...
                    .service(web::resource("/{user_id}/daily").route(web::get().to(summary::daily)))
                    .service(
                        web::resource("/{user_id}/monthly").route(web::post().to(summary::monthly)),
                    ),
            )
            .service(
                web::scope("/corrections")
                    // /corrections/pending
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(time_correction::list_pending)),
                    )
                    .service(
                        web::resource("/pending/count")
                            .route(web::get().to(time_correction::pending_count)),
                    )
                    // /corrections/users/{user_id}
                    .service(
                        web::resource("/users/{user_id}")
                            .route(web::post().to(time_correction::create_correction))
                            .route(web::get().to(time_correction::list_user_corrections)),
                    )
                    // /corrections/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(time_correction::get_correction)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(time_correction::approve_correction)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(time_correction::reject_correction)),
                    )
                    .service(
                        web::resource("/{id}/apply")
                            .route(web::post().to(attendance::apply_correction)),
                    ),
            )
            .service(
                web::resource("/paid-leave/{user_id}")
                    .route(web::get().to(paid_leave::entitlement)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_accept_zero_and_typical_rates() {
        assert!(RateLimits::new(30, 1000).is_ok());
        assert!(RateLimits::new(0, 0).is_ok());
    }
}
