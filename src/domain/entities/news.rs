use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    entities::{
        pagination::{PageQuery, Pagination},
        validation::{trimmed, validate_image_urls},
    },
    utils::html::sanitize_html,
};

const MIN_TITLE_LENGTH: u64 = 10;
const MAX_TITLE_LENGTH: u64 = 200;
const MIN_DETAILS_LENGTH: u64 = 20;
const MAX_DETAILS_LENGTH: u64 = 10_000;
const MIN_EVENT_LENGTH: u64 = 3;
const MAX_EVENT_LENGTH: u64 = 200;
const MIN_LOCATION_LENGTH: u64 = 5;
const MAX_LOCATION_LENGTH: u64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct News {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub details: String,
    pub event: String,
    pub location: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewsInsert {
    pub title: String,
    pub details: String,
    pub event: String,
    pub location: String,
    pub published_at: DateTime<Utc>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct NewNewsRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH, message = "Title must be between 10 and 200 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Details are required"),
        length(min = MIN_DETAILS_LENGTH, max = MAX_DETAILS_LENGTH, message = "Details must be between 20 and 10000 characters")
    )]
    pub details: Option<String>,

    #[validate(
        required(message = "Event is required"),
        length(min = MIN_EVENT_LENGTH, max = MAX_EVENT_LENGTH, message = "Event must be between 3 and 200 characters")
    )]
    pub event: Option<String>,

    #[validate(
        required(message = "Location is required"),
        length(min = MIN_LOCATION_LENGTH, max = MAX_LOCATION_LENGTH, message = "Location must be between 5 and 200 characters")
    )]
    pub location: Option<String>,

    /// Defaults to the time of creation.
    pub published_at: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateNewsRequest {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH, message = "Title must be between 10 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = MIN_DETAILS_LENGTH, max = MAX_DETAILS_LENGTH, message = "Details must be between 20 and 10000 characters"))]
    pub details: Option<String>,

    #[validate(length(min = MIN_EVENT_LENGTH, max = MAX_EVENT_LENGTH, message = "Event must be between 3 and 200 characters"))]
    pub event: Option<String>,

    #[validate(length(min = MIN_LOCATION_LENGTH, max = MAX_LOCATION_LENGTH, message = "Location must be between 5 and 200 characters"))]
    pub location: Option<String>,

    pub published_at: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

impl NewNewsRequest {
    /// Trims plain text and sanitizes the details.
    pub fn normalized(self) -> Self {
        NewNewsRequest {
            title: trimmed(self.title),
            details: self.details.map(|d| sanitize_html(d.trim())),
            event: trimmed(self.event),
            location: trimmed(self.location),
            ..self
        }
    }
}

impl UpdateNewsRequest {
    pub fn prepare(self) -> Result<Self, ValidationErrors> {
        let changes = UpdateNewsRequest {
            title: trimmed(self.title),
            details: self.details.map(|d| sanitize_html(d.trim())),
            event: trimmed(self.event),
            location: trimmed(self.location),
            ..self
        };
        changes.validate()?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NewsListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NewsListQuery {
    pub fn pagination(&self) -> Pagination {
        PageQuery { limit: self.limit, offset: self.offset }.into()
    }
}

impl TryFrom<NewNewsRequest> for NewsInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewNewsRequest) -> Result<Self, Self::Error> {
        let value = value.normalized();
        value.validate()?;

        Ok(NewsInsert {
            title: value.title.unwrap_or_default(),
            details: value.details.unwrap_or_default(),
            event: value.event.unwrap_or_default(),
            location: value.location.unwrap_or_default(),
            published_at: value.published_at.unwrap_or_else(Utc::now),
            images: value.images.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> NewNewsRequest {
        NewNewsRequest {
            title: Some("Town hall meeting announced".into()),
            details: Some("The quarterly town hall will discuss the budget.".into()),
            event: Some("Town Hall".into()),
            location: Some("Civic Centre".into()),
            ..Default::default()
        }
    }

    #[test]
    fn published_at_defaults_to_now() {
        let before = Utc::now();
        let insert = NewsInsert::try_from(valid_request()).unwrap();
        assert!(insert.published_at >= before);
    }

    #[test]
    fn explicit_published_at_is_kept() {
        let at = "2024-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let request = NewNewsRequest { published_at: Some(at), ..valid_request() };
        assert_eq!(NewsInsert::try_from(request).unwrap().published_at, at);
    }

    #[test]
    fn short_details_are_rejected() {
        let request = NewNewsRequest { details: Some("too short".into()), ..valid_request() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("details"));
    }

    #[test]
    fn seven_images_are_rejected() {
        let images = (0..7).map(|i| format!("https://cdn.example/{i}.jpg")).collect();
        let request = NewNewsRequest { images: Some(images), ..valid_request() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("images"));
    }

    #[test]
    fn details_are_measured_after_sanitizing() {
        let request = NewNewsRequest {
            details: Some("<p>Hi</p><script>document.cookie</script>".into()),
            ..valid_request()
        };
        let errors = NewsInsert::try_from(request).unwrap_err();
        assert!(errors.field_errors().contains_key("details"));
    }

    #[test]
    fn stored_fields_match_clean_input() {
        let request = valid_request();
        let insert = NewsInsert::try_from(request.clone()).unwrap();
        assert_eq!(Some(insert.title), request.title);
        assert_eq!(Some(insert.details), request.details);
        assert_eq!(Some(insert.location), request.location);
    }
}
