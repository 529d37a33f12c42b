use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::{
        envelope::Page,
        project::{NewProjectRequest, Project, ProjectInsert, ProjectListQuery, UpdateProjectRequest},
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
}

impl ProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepository>) -> Self {
        ProjectHandler { project_repo }
    }

    /// Lists projects, newest first, optionally filtered by status.
    pub async fn list_projects(&self, query: ProjectListQuery) -> Result<Page<Project>, AppError> {
        query.validate()?;

        self.project_repo
            .list_projects(query.status(), query.pagination())
            .await
    }

    pub async fn get_project_by_id(&self, id: &str) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;

        self.project_repo.get_project_by_id(&valid_id).await
    }

    pub async fn create_project(&self, request: NewProjectRequest) -> Result<Project, AppError> {
        let new_project = ProjectInsert::try_from(request)?;

        let project = self.project_repo.create_project(&new_project).await?;
        tracing::info!(id = %project.id, "Project created");

        Ok(project)
    }

    pub async fn update_project(&self, id: &str, request: UpdateProjectRequest) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        let changes = request.prepare()?;

        self.project_repo.update_project(&valid_id, &changes).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        self.project_repo.delete_project(&valid_id).await
    }
}
