use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::pagination::{PageQuery, Pagination};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub subscribed: bool,
}

/// Body of both `subscribe` and `unsubscribe`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct SubscriptionRequest {
    #[validate(
        required(message = "Email is required"),
        email(message = "Email must be a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: Option<String>,
}

impl SubscriptionRequest {
    /// Lookup key: trimmed and lower-cased.
    pub fn normalized_email(&self) -> String {
        self.email.as_deref().unwrap_or_default().trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SubscriberListQuery {
    pub subscribed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SubscriberListQuery {
    pub fn pagination(&self) -> Pagination {
        PageQuery { limit: self.limit, offset: self.offset }.into()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubscriberCount {
    pub count: i64,
}
