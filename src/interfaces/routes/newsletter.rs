use actix_web::web;

use crate::handlers::newsletter;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/newsletter")
            .service(
                web::resource("/send")
                    .route(web::post().to(newsletter::send_newsletter))
            )
            .service(
                web::resource("/templates")
                    .route(web::get().to(newsletter::list_templates))
                    .route(web::post().to(newsletter::create_template))
            )
            .service(
                web::resource("/templates/{template_id}")
                    .route(web::get().to(newsletter::get_template_by_id))
                    .route(web::put().to(newsletter::update_template))
                    .route(web::delete().to(newsletter::delete_template))
            )
            .service(
                web::resource("/campaigns")
                    .route(web::get().to(newsletter::list_campaigns))
            )
    );
}
