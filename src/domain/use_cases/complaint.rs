use std::sync::Arc;

use crate::{
    entities::{
        complaint::{Complaint, ComplaintInsert, NewComplaintForm},
        envelope::Page,
        pagination::PageQuery,
    },
    errors::AppError,
    repositories::complaint::ComplaintRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct ComplaintHandler {
    pub complaint_repo: Arc<dyn ComplaintRepository>,
}

impl ComplaintHandler {
    pub fn new(complaint_repo: Arc<dyn ComplaintRepository>) -> Self {
        ComplaintHandler { complaint_repo }
    }

    /// Public, one-way submission.
    pub async fn submit_complaint(&self, form: NewComplaintForm) -> Result<Complaint, AppError> {
        let new_complaint = ComplaintInsert::try_from(form)?;

        let complaint = self.complaint_repo.create_complaint(&new_complaint).await?;
        tracing::info!(id = %complaint.id, "Complaint received");

        Ok(complaint)
    }

    pub async fn get_complaint_by_id(&self, id: &str) -> Result<Complaint, AppError> {
        let valid_id = valid_uuid(id)?;

        self.complaint_repo.get_complaint_by_id(&valid_id).await
    }

    pub async fn list_complaints(&self, query: PageQuery) -> Result<Page<Complaint>, AppError> {
        self.complaint_repo.list_complaints(query.into()).await
    }

    pub async fn delete_complaint(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        self.complaint_repo.delete_complaint(&valid_id).await
    }
}
