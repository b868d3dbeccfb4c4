use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hrm_attendance::config::Config;
use hrm_attendance::db::init_db;
use hrm_attendance::docs::ApiDoc;
use hrm_attendance::routes::{self, RateLimits};
use hrm_attendance::service::clock::SystemClock;
use hrm_attendance::service::{Services, Stores};
use hrm_attendance::store::{LogNotifier, WorkLocationDirectory};
use hrm_attendance::store::memory::MemoryStore;
use hrm_attendance::store::mysql::MySqlStore;
use hrm_attendance::utils::location_cache::CachedLocationDirectory;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let mut stores = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            Stores::shared(Arc::new(MySqlStore::new(pool)), Arc::new(LogNotifier))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store");
            Stores::shared(Arc::new(MemoryStore::new()), Arc::new(LogNotifier))
        }
    };

    let locations = Arc::new(CachedLocationDirectory::new(
        stores.locations.clone(),
        config.location_cache_ttl,
    ));
    let cached: Arc<dyn WorkLocationDirectory> = locations.clone();
    stores.locations = cached;

    actix_web::rt::spawn(async move {
        if let Err(e) = locations.warmup().await {
            warn!("Failed to warmup location cache: {}", e);
        }
    });

    let services = Services::build(
        stores,
        Arc::new(config.work_rules()),
        Arc::new(SystemClock),
    );
    let limits = RateLimits::new(config.rate_punch_per_min, config.rate_protected_per_min)?;

    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} matches the JS/CSS assets
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| routes::register_services(cfg, &services))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
