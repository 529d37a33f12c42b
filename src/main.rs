use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use civic_backend::{
    background_task::start_keep_alive,
    db::postgres::{create_pool, run_migrations},
    errors::expose_error_details,
    graceful_shutdown::{install_panic_hook, shutdown_signal},
    handlers::fallback::not_found,
    limiter::rate_limiter::RateLimiterStore,
    mail::HttpMailer,
    middlewares::{cors::build_cors, rate_limit::RateLimit, security_headers::security_headers},
    routes::configure_routes,
    settings::AppConfig,
    shared_repos::SharedRepositories,
    storage::RestObjectStorage,
    AppState,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => {
            init_tracing(cfg.is_production());
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let panicked = install_panic_hook();
    expose_error_details(!config.is_production());

    let pool = match create_pool(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = run_migrations(&pool).await {
            tracing::error!("Database migrations failed: {}", e);
            std::process::exit(1);
        }
    }

    let storage = RestObjectStorage::from_config(&config);
    if !storage.is_configured() {
        tracing::warn!("Object storage is not configured; uploads will fail");
    }

    let repos = SharedRepositories::new(pool.clone());
    let health_repo = repos.health_repo.clone();

    let limiter = RateLimiterStore::new(config.rate_limit_window(), config.rate_limit_max_requests);
    let eviction = limiter.spawn_eviction(config.rate_limit_window());

    let server_addr = format!("{}:{}", config.host, config.port);
    let workers = config.worker_count;
    let production = config.is_production();
    let origins = config.cors_origins();
    let trust_forwarded_for = config.trust_forwarded_for;
    let api_version = config.api_version.clone();
    let health_url = format!("{}/health", config.base_url());
    let keep_alive = if config.keep_alive_enabled {
        match config.keep_alive_schedule() {
            Ok(schedule) => Some((config.keep_alive_initial_delay(), schedule)),
            Err(e) => {
                tracing::error!("Keep-alive pinger disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let app_state = web::Data::new(AppState::new(
        config.clone(),
        repos,
        Arc::new(storage),
        Arc::new(HttpMailer::from_config(&config)),
    ));

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(|cfg| configure_routes(cfg, &api_version))
            .default_service(web::to(not_found))
            .wrap(NormalizePath::trim())
            .wrap(RateLimit::new(limiter.clone(), trust_forwarded_for))
            .wrap(security_headers(production))
            .wrap(build_cors(&origins))
            .wrap(TracingLogger::default())
    })
    .workers(workers)
    .bind(server_addr)?
    .disable_signals()
    .run();

    let server_handle = server.handle();

    let pinger = keep_alive.map(|(initial_delay, schedule)| {
        start_keep_alive(health_url, health_repo, initial_delay, schedule)
    });

    let result = tokio::select! {
        res = server => res,
        _ = shutdown_signal(panicked) => {
            server_handle.stop(true).await;
            Ok(())
        }
    };

    if let Some(pinger) = pinger {
        pinger.stop().await;
    }
    eviction.abort();
    pool.close().await;
    tracing::info!("Shutdown complete");

    result
}
