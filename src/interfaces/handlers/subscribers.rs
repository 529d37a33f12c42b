use actix_web::{web, Either, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        subscriber::{SubscriberListQuery, SubscriptionRequest},
    },
    errors::AppError,
    use_cases::{
        extractors::{AdminAccess, PublicAccess},
        subscriber::SubscribeOutcome,
    },
    AppState,
};

type SubscriptionBody = Either<web::Json<SubscriptionRequest>, web::Form<SubscriptionRequest>>;

fn into_request(body: SubscriptionBody) -> SubscriptionRequest {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

#[instrument(skip(_access, state, body))]
pub async fn subscribe(
    _access: PublicAccess,
    state: web::Data<AppState>,
    body: SubscriptionBody,
) -> Result<impl Responder, AppError> {
    let outcome = state.subscriber_handler.subscribe(into_request(body)).await?;

    let response = match outcome {
        SubscribeOutcome::Created(subscriber) => HttpResponse::Created().json(ApiResponse::with_message(
            "Successfully subscribed to the newsletter",
            subscriber,
        )),
        SubscribeOutcome::Resubscribed(subscriber) => HttpResponse::Ok().json(ApiResponse::with_message(
            "Successfully resubscribed to the newsletter",
            subscriber,
        )),
    };

    Ok(response)
}

#[instrument(skip(_access, state, body))]
pub async fn unsubscribe(
    _access: PublicAccess,
    state: web::Data<AppState>,
    body: SubscriptionBody,
) -> Result<impl Responder, AppError> {
    let subscriber = state.subscriber_handler.unsubscribe(into_request(body)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        "Successfully unsubscribed from the newsletter",
        subscriber,
    )))
}

#[instrument(skip(_access, state))]
pub async fn count_subscribers(
    _access: PublicAccess,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let count = state.subscriber_handler.count_subscribed().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(count)))
}

#[instrument(skip(_admin, state, query))]
pub async fn list_subscribers(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<SubscriberListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.subscriber_handler.list_subscribers(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}
