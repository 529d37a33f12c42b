use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

use crate::auth::api_key::{ADMIN_SECRET_HEADER, API_KEY_HEADER};

/// Allow-listed origins, or any origin when the list is empty or contains `*`.
pub fn build_cors(origins: &[String]) -> Cors {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Cors::permissive();
    }

    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(ADMIN_SECRET_HEADER),
        ])
        .expose_headers(vec![
            HeaderName::from_static("ratelimit-limit"),
            HeaderName::from_static("ratelimit-remaining"),
            HeaderName::from_static("ratelimit-reset"),
        ])
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_rt::test]
    async fn allow_listed_origin_is_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&["https://city.example".to_string()]))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", "https://city.example"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "https://city.example"
        );
    }
}
