use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entities::{
        complaint::{Complaint, ComplaintInsert},
        envelope::Page,
        pagination::Pagination,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxComplaintRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    async fn create_complaint(&self, complaint: &ComplaintInsert) -> Result<Complaint, AppError>;
    async fn get_complaint_by_id(&self, id: &Uuid) -> Result<Complaint, AppError>;
    async fn list_complaints(&self, page: Pagination) -> Result<Page<Complaint>, AppError>;
    async fn delete_complaint(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxComplaintRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxComplaintRepo { pool }
    }
}

#[async_trait]
impl ComplaintRepository for SqlxComplaintRepo {
    async fn create_complaint(&self, complaint: &ComplaintInsert) -> Result<Complaint, AppError> {
        let created = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (name, email, subject, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(&complaint.name)
        .bind(&complaint.email)
        .bind(&complaint.subject)
        .bind(&complaint.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_complaint_by_id(&self, id: &Uuid) -> Result<Complaint, AppError> {
        sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Complaint".into()))
    }

    async fn list_complaints(&self, page: Pagination) -> Result<Page<Complaint>, AppError> {
        let items = sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM complaints")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total))
    }

    async fn delete_complaint(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
