use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        envelope::Page,
        newsletter::{CampaignInsert, NewsletterCampaign, NewsletterTemplate, TemplateInsert, UpdateTemplateRequest},
        pagination::Pagination,
    },
    errors::AppError,
    repositories::sqlx_repo::{push_assignment, push_nullable_assignment, SqlxCampaignRepo, SqlxTemplateRepo},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn list_templates(&self, page: Pagination) -> Result<Page<NewsletterTemplate>, AppError>;
    async fn get_template_by_id(&self, id: &Uuid) -> Result<NewsletterTemplate, AppError>;
    async fn create_template(&self, template: &TemplateInsert) -> Result<NewsletterTemplate, AppError>;
    async fn update_template(&self, id: &Uuid, changes: &UpdateTemplateRequest) -> Result<NewsletterTemplate, AppError>;
    async fn delete_template(&self, id: &Uuid) -> Result<(), AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create_campaign(&self, campaign: &CampaignInsert) -> Result<NewsletterCampaign, AppError>;
    async fn list_campaigns(&self, page: Pagination) -> Result<Page<NewsletterCampaign>, AppError>;
}

impl SqlxTemplateRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxTemplateRepo { pool }
    }
}

impl SqlxCampaignRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCampaignRepo { pool }
    }
}

#[async_trait]
impl TemplateRepository for SqlxTemplateRepo {
    async fn list_templates(&self, page: Pagination) -> Result<Page<NewsletterTemplate>, AppError> {
        let items = sqlx::query_as::<_, NewsletterTemplate>(
            "SELECT * FROM newsletter_templates ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_templates")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total))
    }

    async fn get_template_by_id(&self, id: &Uuid) -> Result<NewsletterTemplate, AppError> {
        sqlx::query_as::<_, NewsletterTemplate>("SELECT * FROM newsletter_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Template".into()))
    }

    async fn create_template(&self, template: &TemplateInsert) -> Result<NewsletterTemplate, AppError> {
        let created = sqlx::query_as::<_, NewsletterTemplate>(
            r#"
            INSERT INTO newsletter_templates (name, description, content, thumbnail_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.content)
        .bind(&template.thumbnail_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_template(&self, id: &Uuid, changes: &UpdateTemplateRequest) -> Result<NewsletterTemplate, AppError> {
        let mut builder = QueryBuilder::new("UPDATE newsletter_templates SET updated_at = NOW()");

        if let Some(name) = &changes.name {
            push_assignment(&mut builder, "name", name.trim().to_string());
        }
        push_nullable_assignment(&mut builder, "description", &changes.description);
        if let Some(content) = &changes.content {
            push_assignment(&mut builder, "content", content.clone());
        }
        push_nullable_assignment(&mut builder, "thumbnail_url", &changes.thumbnail_url);

        builder.push(" WHERE id = ").push_bind(*id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<NewsletterTemplate>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Template".into()))
    }

    async fn delete_template(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM newsletter_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CampaignRepository for SqlxCampaignRepo {
    async fn create_campaign(&self, campaign: &CampaignInsert) -> Result<NewsletterCampaign, AppError> {
        let created = sqlx::query_as::<_, NewsletterCampaign>(
            r#"
            INSERT INTO newsletter_campaigns (subject, content, sent_to_count, failed_count, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(&campaign.subject)
        .bind(&campaign.content)
        .bind(campaign.sent_to_count)
        .bind(campaign.failed_count)
        .bind(campaign.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_campaigns(&self, page: Pagination) -> Result<Page<NewsletterCampaign>, AppError> {
        let items = sqlx::query_as::<_, NewsletterCampaign>(
            "SELECT * FROM newsletter_campaigns ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_campaigns")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total))
    }
}
