use actix_web::web;

use crate::handlers::subscribers;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscribers")
            .service(
                web::resource("")
                    .route(web::get().to(subscribers::list_subscribers))
            )
            .service(
                web::resource("/subscribe")
                    .route(web::post().to(subscribers::subscribe))
            )
            .service(
                web::resource("/unsubscribe")
                    .route(web::post().to(subscribers::unsubscribe))
            )
            .service(
                web::resource("/count")
                    .route(web::get().to(subscribers::count_subscribers))
            )
    );
}
