use actix_web::middleware::DefaultHeaders;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; base-uri 'self'; font-src 'self' https: data:; \
    form-action 'self'; frame-ancestors 'self'; img-src 'self' data: https:; object-src 'none'; \
    script-src 'self'; style-src 'self' https: 'unsafe-inline'; upgrade-insecure-requests";

/// Standard hardening headers added to every response unless a handler set them.
/// HSTS is only sent in production, where TLS terminates upstream.
pub fn security_headers(production: bool) -> DefaultHeaders {
    let headers = DefaultHeaders::new()
        .add(("Content-Security-Policy", CONTENT_SECURITY_POLICY))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("X-Download-Options", "noopen"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
        .add(("X-XSS-Protection", "0"));

    if production {
        headers.add(("Strict-Transport-Security", "max-age=15552000; includeSubDomains"))
    } else {
        headers
    }
}
