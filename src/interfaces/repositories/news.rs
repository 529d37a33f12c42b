use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        envelope::Page,
        news::{News, NewsInsert, UpdateNewsRequest},
        pagination::Pagination,
    },
    errors::AppError,
    repositories::sqlx_repo::{push_assignment, SqlxNewsRepo},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn list_news(&self, page: Pagination) -> Result<Page<News>, AppError>;
    async fn get_news_by_id(&self, id: &Uuid) -> Result<News, AppError>;
    async fn create_news(&self, news: &NewsInsert) -> Result<News, AppError>;
    async fn update_news(&self, id: &Uuid, changes: &UpdateNewsRequest) -> Result<News, AppError>;
    async fn delete_news(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxNewsRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxNewsRepo { pool }
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepo {
    async fn list_news(&self, page: Pagination) -> Result<Page<News>, AppError> {
        let items = sqlx::query_as::<_, News>(
            r#"
            SELECT * FROM news
            ORDER BY published_at DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total))
    }

    async fn get_news_by_id(&self, id: &Uuid) -> Result<News, AppError> {
        sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("News article".into()))
    }

    async fn create_news(&self, news: &NewsInsert) -> Result<News, AppError> {
        let created = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (title, details, event, location, published_at, images)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        )
        .bind(&news.title)
        .bind(&news.details)
        .bind(&news.event)
        .bind(&news.location)
        .bind(news.published_at)
        .bind(&news.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_news(&self, id: &Uuid, changes: &UpdateNewsRequest) -> Result<News, AppError> {
        let mut builder = QueryBuilder::new("UPDATE news SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            push_assignment(&mut builder, "title", title.trim().to_string());
        }
        if let Some(details) = &changes.details {
            push_assignment(&mut builder, "details", details.clone());
        }
        if let Some(event) = &changes.event {
            push_assignment(&mut builder, "event", event.trim().to_string());
        }
        if let Some(location) = &changes.location {
            push_assignment(&mut builder, "location", location.trim().to_string());
        }
        if let Some(published_at) = changes.published_at {
            push_assignment(&mut builder, "published_at", published_at);
        }
        if let Some(images) = &changes.images {
            push_assignment(&mut builder, "images", images.clone());
        }

        builder.push(" WHERE id = ").push_bind(*id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<News>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("News article".into()))
    }

    async fn delete_news(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
