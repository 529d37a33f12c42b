use actix_web::web;

use crate::handlers::complaints;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/complaints")
            .service(
                web::resource("")
                    .route(web::post().to(complaints::submit_complaint))
                    .route(web::get().to(complaints::list_complaints))
            )
            .service(
                web::resource("/{complaint_id}")
                    .route(web::get().to(complaints::get_complaint_by_id))
                    .route(web::delete().to(complaints::delete_complaint))
            )
    );
}
