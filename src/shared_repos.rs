use std::sync::Arc;

use crate::repositories::{
    complaint::ComplaintRepository,
    health::HealthRepository,
    news::NewsRepository,
    newsletter::{CampaignRepository, TemplateRepository},
    project::ProjectRepository,
    sqlx_repo::{
        SqlxCampaignRepo, SqlxComplaintRepo, SqlxHealthRepo, SqlxNewsRepo, SqlxProjectRepo,
        SqlxSubscriberRepo, SqlxTemplateRepo,
    },
    subscriber::SubscriberRepository,
};

/// Every store gateway the application talks to.
#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub news_repo: Arc<dyn NewsRepository>,
    pub complaint_repo: Arc<dyn ComplaintRepository>,
    pub subscriber_repo: Arc<dyn SubscriberRepository>,
    pub template_repo: Arc<dyn TemplateRepository>,
    pub campaign_repo: Arc<dyn CampaignRepository>,
    pub health_repo: Arc<dyn HealthRepository>,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            news_repo: Arc::new(SqlxNewsRepo::new(pool.clone())),
            complaint_repo: Arc::new(SqlxComplaintRepo::new(pool.clone())),
            subscriber_repo: Arc::new(SqlxSubscriberRepo::new(pool.clone())),
            template_repo: Arc::new(SqlxTemplateRepo::new(pool.clone())),
            campaign_repo: Arc::new(SqlxCampaignRepo::new(pool.clone())),
            health_repo: Arc::new(SqlxHealthRepo::new(pool)),
        }
    }
}
