use actix_web::dev::ServiceRequest;

/// Client address used as the rate limiting key.
/// `X-Forwarded-For` is only honoured when the service sits behind a trusted proxy.
pub fn get_client_ip(req: &ServiceRequest, trust_x_forwarded_for: bool) -> String {
    if trust_x_forwarded_for {
        if let Some(forwarded) = req.headers().get("x-forwarded-for") {
            if let Ok(s) = forwarded.to_str() {
                if let Some(first) = s.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
                    return first.to_string();
                }
            }
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_header_only_when_trusted() {
        let req = TestRequest::default()
            .peer_addr("10.1.1.1:4000".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.2"))
            .to_srv_request();

        assert_eq!(get_client_ip(&req, true), "203.0.113.9");
        assert_eq!(get_client_ip(&req, false), "10.1.1.1");
    }
}
