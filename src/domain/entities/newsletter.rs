use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::entities::{
    option_fields::OptionField,
    pagination::{PageQuery, Pagination},
    validation::{new_validation_error, trimmed, trimmed_field, validate_optional_url_field, validate_url},
};

// ───── Templates ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsletterTemplate {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateInsert {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct NewTemplateRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(
        required(message = "Content is required"),
        length(min = 1, message = "Content cannot be empty")
    )]
    pub content: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: OptionField<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub thumbnail_url: OptionField<String>,
}

impl UpdateTemplateRequest {
    /// Trims the name and thumbnail URL, then validates.
    pub fn prepare(self) -> Result<Self, ValidationErrors> {
        let changes = UpdateTemplateRequest {
            name: trimmed(self.name),
            thumbnail_url: trimmed_field(self.thumbnail_url),
            ..self
        };
        changes.validate()?;
        Ok(changes)
    }
}

impl TryFrom<NewTemplateRequest> for TemplateInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewTemplateRequest) -> Result<Self, Self::Error> {
        let value = NewTemplateRequest {
            name: trimmed(value.name),
            thumbnail_url: trimmed(value.thumbnail_url),
            ..value
        };
        value.validate()?;

        Ok(TemplateInsert {
            name: value.name.unwrap_or_default(),
            description: value.description,
            content: value.content.unwrap_or_default(),
            thumbnail_url: value.thumbnail_url,
        })
    }
}

// ───── Campaigns ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "campaign_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Completed,
    Partial,
    Failed,
}

impl CampaignStatus {
    /// `completed` with no failures, `failed` when nothing was delivered,
    /// `partial` otherwise.
    pub fn from_tally(sent: usize, failed: usize) -> Self {
        match (sent, failed) {
            (_, 0) => CampaignStatus::Completed,
            (0, _) => CampaignStatus::Failed,
            _ => CampaignStatus::Partial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsletterCampaign {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub subject: String,
    pub content: String,
    pub sent_to_count: i32,
    pub failed_count: i32,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone)]
pub struct CampaignInsert {
    pub subject: String,
    pub content: String,
    pub sent_to_count: i32,
    pub failed_count: i32,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CampaignListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CampaignListQuery {
    pub fn pagination(&self) -> Pagination {
        PageQuery { limit: self.limit, offset: self.offset }.into()
    }
}

// ───── Sending ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// A single preview address.
    Test(String),
    /// Every subscriber currently flagged subscribed.
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct SendNewsletterRequest {
    #[validate(
        required(message = "Subject is required"),
        length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters")
    )]
    pub subject: Option<String>,

    #[validate(
        required(message = "Content is required"),
        length(min = 1, message = "Content cannot be empty")
    )]
    pub content: Option<String>,

    #[serde(rename = "recipientType", alias = "recipient_type")]
    #[validate(required(message = "Recipient type is required"))]
    pub recipient_type: Option<String>,

    #[serde(rename = "testEmail", alias = "test_email")]
    #[validate(email(message = "Test email must be a valid email address"))]
    pub test_email: Option<String>,
}

impl SendNewsletterRequest {
    /// Validates the payload and resolves who receives it.
    pub fn recipients(&self) -> Result<Recipients, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let target = match self.recipient_type.as_deref().map(str::trim) {
            Some("all") => Some(Recipients::All),
            Some("test") => match self.test_email.as_deref().map(str::trim) {
                Some(email) if !email.is_empty() => Some(Recipients::Test(email.to_lowercase())),
                _ => {
                    errors.add(
                        "testEmail",
                        new_validation_error("required", "Test email is required when recipientType is test"),
                    );
                    None
                }
            },
            Some(_) => {
                errors.add(
                    "recipientType",
                    new_validation_error("invalid_recipient_type", "Recipient type must be one of: test, all"),
                );
                None
            }
            None => None,
        };

        match target {
            Some(target) if errors.is_empty() => Ok(target),
            _ => Err(errors),
        }
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or_default().trim()
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Outcome of one send run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}
