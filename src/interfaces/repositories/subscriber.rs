use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{envelope::Page, pagination::Pagination, subscriber::Subscriber},
    errors::AppError,
    repositories::sqlx_repo::SqlxSubscriberRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    async fn find_subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, AppError>;
    async fn create_subscriber(&self, email: &str) -> Result<Subscriber, AppError>;
    async fn set_subscribed(&self, id: &Uuid, subscribed: bool) -> Result<Subscriber, AppError>;
    async fn list_subscribers(&self, subscribed: Option<bool>, page: Pagination) -> Result<Page<Subscriber>, AppError>;
    async fn count_subscribed(&self) -> Result<i64, AppError>;
    async fn list_subscribed_emails(&self) -> Result<Vec<String>, AppError>;
}

impl SqlxSubscriberRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxSubscriberRepo { pool }
    }
}

#[async_trait]
impl SubscriberRepository for SqlxSubscriberRepo {
    async fn find_subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM newsletter_subscribers WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    async fn create_subscriber(&self, email: &str) -> Result<Subscriber, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO newsletter_subscribers (email, subscribed)
            VALUES ($1, TRUE)
            RETURNING *
            "#
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::BadRequest("Email is already subscribed".into());
                }
            }
            AppError::from(e)
        })?;

        Ok(subscriber)
    }

    async fn set_subscribed(&self, id: &Uuid, subscribed: bool) -> Result<Subscriber, AppError> {
        sqlx::query_as::<_, Subscriber>(
            "UPDATE newsletter_subscribers SET subscribed = $1 WHERE id = $2 RETURNING *"
        )
        .bind(subscribed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscriber".into()))
    }

    async fn list_subscribers(&self, subscribed: Option<bool>, page: Pagination) -> Result<Page<Subscriber>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM newsletter_subscribers");

        if let Some(subscribed) = subscribed {
            builder.push(" WHERE subscribed = ").push_bind(subscribed);
        }

        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit);
        builder.push(" OFFSET ").push_bind(page.offset);

        let items = builder
            .build_query_as::<Subscriber>()
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM newsletter_subscribers
            WHERE ($1::boolean IS NULL OR subscribed = $1)
            "#
        )
        .bind(subscribed)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, total))
    }

    async fn count_subscribed(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM newsletter_subscribers WHERE subscribed = TRUE"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_subscribed_emails(&self) -> Result<Vec<String>, AppError> {
        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT email FROM newsletter_subscribers WHERE subscribed = TRUE ORDER BY created_at"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}
