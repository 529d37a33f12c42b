use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        envelope::Page,
        pagination::Pagination,
        project::{Project, ProjectInsert, ProjectStatus, UpdateProjectRequest},
    },
    errors::AppError,
    repositories::sqlx_repo::{push_assignment, push_nullable_assignment, SqlxProjectRepo},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self, status: Option<ProjectStatus>, page: Pagination) -> Result<Page<Project>, AppError>;
    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError>;
    async fn create_project(&self, project: &ProjectInsert) -> Result<Project, AppError>;
    async fn update_project(&self, id: &Uuid, changes: &UpdateProjectRequest) -> Result<Project, AppError>;
    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list_projects(&self, status: Option<ProjectStatus>, page: Pagination) -> Result<Page<Project>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM projects");

        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status);
        }

        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(page.limit);
        builder.push(" OFFSET ").push_bind(page.offset);

        let items = builder
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;

        // Same predicate as the page query so `count` is the filtered total
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM projects
            WHERE ($1::project_status IS NULL OR status = $1)
            "#
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, total))
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".into()))
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Project, AppError> {
        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, location, district, ward, status, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.location)
        .bind(&project.district)
        .bind(&project.ward)
        .bind(project.status)
        .bind(&project.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_project(&self, id: &Uuid, changes: &UpdateProjectRequest) -> Result<Project, AppError> {
        let mut builder = QueryBuilder::new("UPDATE projects SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            push_assignment(&mut builder, "title", title.trim().to_string());
        }
        if let Some(description) = &changes.description {
            push_assignment(&mut builder, "description", description.clone());
        }
        if let Some(location) = &changes.location {
            push_assignment(&mut builder, "location", location.trim().to_string());
        }
        push_nullable_assignment(&mut builder, "district", &changes.district);
        push_nullable_assignment(&mut builder, "ward", &changes.ward);
        if let Some(status) = changes.status() {
            push_assignment(&mut builder, "status", status);
        }
        if let Some(images) = &changes.images {
            push_assignment(&mut builder, "images", images.clone());
        }

        builder.push(" WHERE id = ").push_bind(*id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".into()))
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(%id, "Delete matched no project");
        }

        Ok(())
    }
}
