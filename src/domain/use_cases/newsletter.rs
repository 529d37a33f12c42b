use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use serde::Serialize;
use tokio::time::sleep;
use tracing::instrument;

use crate::{
    entities::{
        envelope::Page,
        newsletter::{
            CampaignInsert, CampaignListQuery, CampaignStatus, DeliveryReport, NewTemplateRequest,
            NewsletterCampaign, NewsletterTemplate, Recipients, SendNewsletterRequest, TemplateInsert,
            UpdateTemplateRequest,
        },
        pagination::PageQuery,
    },
    errors::AppError,
    mail::{
        template::{render_newsletter, unsubscribe_link},
        Mailer, OutgoingMail,
    },
    repositories::{
        newsletter::{CampaignRepository, TemplateRepository},
        subscriber::SubscriberRepository,
    },
    settings::AppConfig,
    utils::valid_uuid::valid_uuid,
};

/// Batching knobs for bulk sends.
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub max_errors: usize,
    pub unsubscribe_url: Option<String>,
}

impl DeliveryOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        DeliveryOptions {
            batch_size: config.newsletter_batch_size.max(1),
            batch_delay: config.newsletter_batch_delay(),
            max_errors: config.newsletter_max_errors,
            unsubscribe_url: config
                .unsubscribe_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        }
    }
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        DeliveryOptions {
            batch_size: 50,
            batch_delay: Duration::from_secs(1),
            max_errors: 10,
            unsubscribe_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendOutcome {
    #[serde(flatten)]
    pub report: DeliveryReport,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<NewsletterCampaign>,
}

pub struct NewsletterHandler {
    template_repo: Arc<dyn TemplateRepository>,
    campaign_repo: Arc<dyn CampaignRepository>,
    subscriber_repo: Arc<dyn SubscriberRepository>,
    mailer: Arc<dyn Mailer>,
    options: DeliveryOptions,
}

impl NewsletterHandler {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        campaign_repo: Arc<dyn CampaignRepository>,
        subscriber_repo: Arc<dyn SubscriberRepository>,
        mailer: Arc<dyn Mailer>,
        options: DeliveryOptions,
    ) -> Self {
        NewsletterHandler {
            template_repo,
            campaign_repo,
            subscriber_repo,
            mailer,
            options,
        }
    }

    /// Sends a newsletter to one test address or every subscribed address.
    /// Bulk runs are recorded as a campaign.
    #[instrument(skip(self, request))]
    pub async fn send_newsletter(&self, request: SendNewsletterRequest) -> Result<SendOutcome, AppError> {
        let recipients = request.recipients()?;

        self.mailer.verify().await.map_err(|e| {
            tracing::error!(error = %e, "Mail channel verification failed");
            AppError::from(e)
        })?;

        let addresses = match &recipients {
            Recipients::Test(email) => vec![email.clone()],
            Recipients::All => self.subscriber_repo.list_subscribed_emails().await?,
        };

        if addresses.is_empty() {
            return Err(AppError::BadRequest("There are no subscribed recipients".into()));
        }

        let report = self.deliver(request.subject(), request.content(), &addresses).await;

        let campaign = match recipients {
            Recipients::All => {
                let campaign = CampaignInsert {
                    subject: request.subject().to_string(),
                    content: request.content().to_string(),
                    sent_to_count: i32::try_from(report.sent).unwrap_or(i32::MAX),
                    failed_count: i32::try_from(report.failed).unwrap_or(i32::MAX),
                    status: CampaignStatus::from_tally(report.sent, report.failed),
                };
                Some(self.campaign_repo.create_campaign(&campaign).await?)
            }
            Recipients::Test(_) => None,
        };

        tracing::info!(total = report.total, sent = report.sent, failed = report.failed, "Newsletter run finished");
        Ok(SendOutcome { report, campaign })
    }

    fn compose(&self, subject: &str, content: &str, to: &str) -> OutgoingMail {
        let unsubscribe = self
            .options
            .unsubscribe_url
            .as_deref()
            .map(|base| unsubscribe_link(base, to));

        OutgoingMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: render_newsletter(subject, content, unsubscribe.as_deref()),
        }
    }

    /// Sends batch by batch. Every send in a batch is awaited and a failed
    /// recipient never aborts the rest. Nothing is retried.
    async fn deliver(&self, subject: &str, content: &str, addresses: &[String]) -> DeliveryReport {
        let mut report = DeliveryReport {
            total: addresses.len(),
            ..DeliveryReport::default()
        };

        let batch_count = addresses.len().div_ceil(self.options.batch_size);

        for (index, batch) in addresses.chunks(self.options.batch_size).enumerate() {
            let sends = batch.iter().map(|to| async move {
                let mail = self.compose(subject, content, to);
                (to, self.mailer.send(&mail).await)
            });

            for (to, outcome) in join_all(sends).await {
                match outcome {
                    Ok(()) => report.sent += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(recipient = %to, error = %e, "Newsletter delivery failed");
                        if report.errors.len() < self.options.max_errors {
                            report.errors.push(format!("{}: {}", to, e));
                        }
                    }
                }
            }

            if index + 1 < batch_count && !self.options.batch_delay.is_zero() {
                sleep(self.options.batch_delay).await;
            }
        }

        report
    }

    pub async fn list_templates(&self, query: PageQuery) -> Result<Page<NewsletterTemplate>, AppError> {
        self.template_repo.list_templates(query.into()).await
    }

    pub async fn get_template_by_id(&self, id: &str) -> Result<NewsletterTemplate, AppError> {
        let valid_id = valid_uuid(id)?;

        self.template_repo.get_template_by_id(&valid_id).await
    }

    pub async fn create_template(&self, request: NewTemplateRequest) -> Result<NewsletterTemplate, AppError> {
        let new_template = TemplateInsert::try_from(request)?;

        self.template_repo.create_template(&new_template).await
    }

    pub async fn update_template(&self, id: &str, request: UpdateTemplateRequest) -> Result<NewsletterTemplate, AppError> {
        let valid_id = valid_uuid(id)?;
        let changes = request.prepare()?;

        self.template_repo.update_template(&valid_id, &changes).await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        self.template_repo.delete_template(&valid_id).await
    }

    pub async fn list_campaigns(&self, query: CampaignListQuery) -> Result<Page<NewsletterCampaign>, AppError> {
        self.campaign_repo.list_campaigns(query.pagination()).await
    }
}
