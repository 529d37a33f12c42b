use actix_web::web;

use crate::handlers::{docs, home::home, system::health_check};

mod complaints;
mod news;
mod newsletter;
mod payload;
mod projects;
mod subscribers;

pub use payload::MAX_BODY_SIZE;

/// Registers every route. Resource routes live under `/api/{api_version}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, api_version: &str) {
    cfg.service(home)
        .service(health_check)
        .service(docs::api_docs)
        .service(docs::api_routes);

    cfg.service(
        web::scope(&format!("/api/{}", api_version))
            .configure(projects::config_routes)
            .configure(news::config_routes)
            .configure(complaints::config_routes)
            .configure(subscribers::config_routes)
            .configure(newsletter::config_routes),
    );

    cfg.configure(payload::config_routes);
}
