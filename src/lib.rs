use std::sync::Arc;

mod domain;
mod infrastructure;
mod interfaces;
pub mod background_task;
pub mod constants;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use infrastructure::{auth, db, limiter, mail, storage, utils};
pub use interfaces::{handlers, middlewares, repositories, routes};

use auth::api_key::ApiKeyGate;
use mail::Mailer;
use repositories::health::HealthRepository;
use settings::AppConfig;
use shared_repos::SharedRepositories;
use storage::ObjectStorage;
use use_cases::{
    complaint::ComplaintHandler,
    news::NewsHandler,
    newsletter::{DeliveryOptions, NewsletterHandler},
    project::ProjectHandler,
    subscriber::SubscriberHandler,
    upload::UploadHandler,
};

pub struct AppState {
    pub config: AppConfig,
    pub gate: ApiKeyGate,
    pub project_handler: ProjectHandler,
    pub news_handler: NewsHandler,
    pub complaint_handler: ComplaintHandler,
    pub subscriber_handler: SubscriberHandler,
    pub newsletter_handler: NewsletterHandler,
    pub upload_handler: UploadHandler,
    pub health_repo: Arc<dyn HealthRepository>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repos: SharedRepositories,
        storage: Arc<dyn ObjectStorage>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let gate = ApiKeyGate::from_config(&config);
        let newsletter_handler = NewsletterHandler::new(
            repos.template_repo,
            repos.campaign_repo,
            repos.subscriber_repo.clone(),
            mailer,
            DeliveryOptions::from_config(&config),
        );
        let upload_handler = UploadHandler::from_config(storage, &config);

        AppState {
            gate,
            project_handler: ProjectHandler::new(repos.project_repo),
            news_handler: NewsHandler::new(repos.news_repo),
            complaint_handler: ComplaintHandler::new(repos.complaint_repo),
            subscriber_handler: SubscriberHandler::new(repos.subscriber_repo),
            newsletter_handler,
            upload_handler,
            health_repo: repos.health_repo,
            config,
        }
    }
}
