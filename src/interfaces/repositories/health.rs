use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{errors::AppError, repositories::sqlx_repo::SqlxHealthRepo};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Reads at most one row to keep the pooled connection warm.
    async fn sample_row(&self) -> Result<Option<Uuid>, AppError>;
}

impl SqlxHealthRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxHealthRepo { pool }
    }
}

#[async_trait]
impl HealthRepository for SqlxHealthRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn sample_row(&self) -> Result<Option<Uuid>, AppError> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM projects LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }
}
