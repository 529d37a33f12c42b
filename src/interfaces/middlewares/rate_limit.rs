use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, ResponseError,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::{
    errors::AppError,
    limiter::rate_limiter::{RateDecision, RateLimiterStore},
    utils::get_client_ip::get_client_ip,
};

/// Sliding-window limit per client address.
#[derive(Clone)]
pub struct RateLimit {
    store: RateLimiterStore,
    trust_forwarded_for: bool,
}

impl RateLimit {
    pub fn new(store: RateLimiterStore, trust_forwarded_for: bool) -> Self {
        RateLimit { store, trust_forwarded_for }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService {
            service: Rc::new(service),
            store: self.store.clone(),
            trust_forwarded_for: self.trust_forwarded_for,
        })
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    store: RateLimiterStore,
    trust_forwarded_for: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = get_client_ip(&req, self.trust_forwarded_for);
        let decision = self.store.check(&client);

        if !decision.allowed {
            tracing::warn!(client = %client, path = %req.path(), "Rate limit exceeded");

            let response = AppError::RateLimited(decision.reset_secs()).error_response();
            let mut res = req.into_response(response).map_into_right_body();
            apply_headers(res.headers_mut(), &decision);

            return Box::pin(async move { Ok(res) });
        }

        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let mut res = service.call(req).await?.map_into_left_body();
            apply_headers(res.headers_mut(), &decision);
            Ok(res)
        })
    }
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(decision.remaining));
    headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from(decision.reset_secs()));
}
