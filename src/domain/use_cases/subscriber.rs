use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::{
        envelope::Page,
        subscriber::{Subscriber, SubscriberCount, SubscriberListQuery, SubscriptionRequest},
    },
    errors::AppError,
    repositories::subscriber::SubscriberRepository,
};

#[derive(Debug)]
pub enum SubscribeOutcome {
    Created(Subscriber),
    Resubscribed(Subscriber),
}

pub struct SubscriberHandler {
    pub subscriber_repo: Arc<dyn SubscriberRepository>,
}

impl SubscriberHandler {
    pub fn new(subscriber_repo: Arc<dyn SubscriberRepository>) -> Self {
        SubscriberHandler { subscriber_repo }
    }

    fn normalize(request: SubscriptionRequest) -> Result<String, AppError> {
        let request = SubscriptionRequest {
            email: request.email.map(|e| e.trim().to_lowercase()),
        };
        request.validate()?;

        Ok(request.normalized_email())
    }

    /// New address → row created. Known but unsubscribed → flag flipped back.
    /// Known and subscribed → 400.
    pub async fn subscribe(&self, request: SubscriptionRequest) -> Result<SubscribeOutcome, AppError> {
        let email = Self::normalize(request)?;

        match self.subscriber_repo.find_subscriber_by_email(&email).await? {
            Some(existing) if existing.subscribed => {
                Err(AppError::BadRequest("Email is already subscribed".into()))
            }
            Some(existing) => {
                let subscriber = self.subscriber_repo.set_subscribed(&existing.id, true).await?;
                Ok(SubscribeOutcome::Resubscribed(subscriber))
            }
            None => {
                let subscriber = self.subscriber_repo.create_subscriber(&email).await?;
                Ok(SubscribeOutcome::Created(subscriber))
            }
        }
    }

    /// Idempotent for addresses that already opted out.
    pub async fn unsubscribe(&self, request: SubscriptionRequest) -> Result<Subscriber, AppError> {
        let email = Self::normalize(request)?;

        let existing = self
            .subscriber_repo
            .find_subscriber_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscriber".into()))?;

        if !existing.subscribed {
            return Ok(existing);
        }

        self.subscriber_repo.set_subscribed(&existing.id, false).await
    }

    pub async fn count_subscribed(&self) -> Result<SubscriberCount, AppError> {
        let count = self.subscriber_repo.count_subscribed().await?;
        Ok(SubscriberCount { count })
    }

    pub async fn list_subscribers(&self, query: SubscriberListQuery) -> Result<Page<Subscriber>, AppError> {
        self.subscriber_repo
            .list_subscribers(query.subscribed, query.pagination())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::repositories::subscriber::MockSubscriberRepository;

    fn subscriber(email: &str, subscribed: bool) -> Subscriber {
        Subscriber {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            email: email.to_string(),
            subscribed,
        }
    }

    fn request(email: &str) -> SubscriptionRequest {
        SubscriptionRequest { email: Some(email.to_string()) }
    }

    #[actix_rt::test]
    async fn email_is_normalized_before_lookup() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_find_subscriber_by_email()
            .withf(|email| email == "resident@city.example")
            .returning(|_| Ok(None));
        repo.expect_create_subscriber()
            .returning(|email| Ok(subscriber(email, true)));

        let handler = SubscriberHandler::new(Arc::new(repo));
        let outcome = handler.subscribe(request("  Resident@City.Example ")).await.unwrap();

        assert!(matches!(outcome, SubscribeOutcome::Created(s) if s.email == "resident@city.example"));
    }

    #[actix_rt::test]
    async fn subscribed_address_is_rejected() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_find_subscriber_by_email()
            .returning(|email| Ok(Some(subscriber(email, true))));
        repo.expect_create_subscriber().times(0);

        let handler = SubscriberHandler::new(Arc::new(repo));
        assert!(matches!(
            handler.subscribe(request("a@city.example")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[actix_rt::test]
    async fn unsubscribed_address_is_flipped_back() {
        let existing = subscriber("a@city.example", false);
        let id = existing.id;

        let mut repo = MockSubscriberRepository::new();
        repo.expect_find_subscriber_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_set_subscribed()
            .withf(move |candidate, flag| *candidate == id && *flag)
            .times(1)
            .returning(|_, _| Ok(subscriber("a@city.example", true)));
        repo.expect_create_subscriber().times(0);

        let handler = SubscriberHandler::new(Arc::new(repo));
        let outcome = handler.subscribe(request("a@city.example")).await.unwrap();
        assert!(matches!(outcome, SubscribeOutcome::Resubscribed(_)));
    }

    #[actix_rt::test]
    async fn unknown_address_cannot_unsubscribe() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_find_subscriber_by_email().returning(|_| Ok(None));

        let handler = SubscriberHandler::new(Arc::new(repo));
        assert!(matches!(
            handler.unsubscribe(request("ghost@city.example")).await,
            Err(AppError::NotFound(_))
        ));
    }
}
