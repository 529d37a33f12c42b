use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    entities::{
        option_fields::OptionField,
        pagination::{PageQuery, Pagination},
        validation::{new_validation_error, trimmed, trimmed_field, validate_image_urls},
    },
    utils::html::sanitize_html,
};

// ───── Constants ──────────────────────────────────────────────────────
pub const MIN_TITLE_LENGTH: u64 = 10;
pub const MAX_TITLE_LENGTH: u64 = 200;
pub const MIN_DESCRIPTION_LENGTH: u64 = 20;
pub const MAX_DESCRIPTION_LENGTH: u64 = 10_000;
pub const MIN_LOCATION_LENGTH: u64 = 5;
pub const MAX_LOCATION_LENGTH: u64 = 200;
pub const MAX_AREA_LENGTH: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    InProgress,
    Completed,
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(new_validation_error(
                "invalid_status",
                "Status must be one of: in_progress, completed",
            )),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::InProgress => write!(f, "in_progress"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

pub fn validate_project_status(status: &str) -> Result<(), ValidationError> {
    ProjectStatus::from_str(status).map(|_| ())
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub status: ProjectStatus,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectInsert {
    pub title: String,
    pub description: String,
    pub location: String,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub status: ProjectStatus,
    pub images: Vec<String>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct NewProjectRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH, message = "Title must be between 10 and 200 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = MIN_DESCRIPTION_LENGTH, max = MAX_DESCRIPTION_LENGTH, message = "Description must be between 20 and 10000 characters")
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Location is required"),
        length(min = MIN_LOCATION_LENGTH, max = MAX_LOCATION_LENGTH, message = "Location must be between 5 and 200 characters")
    )]
    pub location: Option<String>,

    #[validate(length(max = MAX_AREA_LENGTH))]
    pub district: Option<String>,

    #[validate(length(max = MAX_AREA_LENGTH))]
    pub ward: Option<String>,

    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,

    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH, message = "Title must be between 10 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = MIN_DESCRIPTION_LENGTH, max = MAX_DESCRIPTION_LENGTH, message = "Description must be between 20 and 10000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = MIN_LOCATION_LENGTH, max = MAX_LOCATION_LENGTH, message = "Location must be between 5 and 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = MAX_AREA_LENGTH))]
    pub district: OptionField<String>,

    #[validate(length(max = MAX_AREA_LENGTH))]
    pub ward: OptionField<String>,

    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,

    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

impl NewProjectRequest {
    /// Trims plain text and sanitizes the description, producing the values
    /// that get validated and stored.
    pub fn normalized(self) -> Self {
        NewProjectRequest {
            title: trimmed(self.title),
            description: self.description.map(|d| sanitize_html(d.trim())),
            location: trimmed(self.location),
            district: trimmed(self.district),
            ward: trimmed(self.ward),
            ..self
        }
    }
}

impl UpdateProjectRequest {
    pub fn status(&self) -> Option<ProjectStatus> {
        self.status.as_deref().and_then(|s| ProjectStatus::from_str(s).ok())
    }

    /// Normalizes like [`NewProjectRequest::normalized`], then validates.
    pub fn prepare(self) -> Result<Self, ValidationErrors> {
        let changes = UpdateProjectRequest {
            title: trimmed(self.title),
            description: self.description.map(|d| sanitize_html(d.trim())),
            location: trimmed(self.location),
            district: trimmed_field(self.district),
            ward: trimmed_field(self.ward),
            ..self
        };
        changes.validate()?;
        Ok(changes)
    }
}

/// `GET /projects` query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectListQuery {
    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProjectListQuery {
    pub fn status(&self) -> Option<ProjectStatus> {
        self.status.as_deref().and_then(|s| ProjectStatus::from_str(s).ok())
    }

    pub fn pagination(&self) -> Pagination {
        PageQuery { limit: self.limit, offset: self.offset }.into()
    }
}

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        let value = value.normalized();
        value.validate()?;

        let status = value
            .status
            .as_deref()
            .and_then(|s| ProjectStatus::from_str(s).ok())
            .unwrap_or_default();

        Ok(ProjectInsert {
            title: value.title.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            location: value.location.unwrap_or_default(),
            district: value.district,
            ward: value.ward,
            status,
            images: value.images.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> NewProjectRequest {
        NewProjectRequest {
            title: Some("Road resurfacing on Main St".into()),
            description: Some("Full resurfacing of the main arterial road.".into()),
            location: Some("Main Street".into()),
            status: Some("completed".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_request_converts_to_insert() {
        let insert = ProjectInsert::try_from(valid_request()).unwrap();
        assert_eq!(insert.status, ProjectStatus::Completed);
        assert!(insert.images.is_empty());
    }

    #[test]
    fn status_defaults_to_in_progress() {
        let request = NewProjectRequest { status: None, ..valid_request() };
        let insert = ProjectInsert::try_from(request).unwrap();
        assert_eq!(insert.status, ProjectStatus::InProgress);
    }

    #[test]
    fn short_title_is_rejected_on_title() {
        let request = NewProjectRequest { title: Some("Road".into()), ..valid_request() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = NewProjectRequest::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("location"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let request = NewProjectRequest { status: Some("paused".into()), ..valid_request() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProjectRequest::default().prepare().is_ok());
    }

    #[test]
    fn update_applies_same_bounds() {
        let update = UpdateProjectRequest { location: Some("Hi".into()), ..Default::default() };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("location"));
    }

    #[test]
    fn script_only_description_is_rejected_after_sanitizing() {
        let request = NewProjectRequest {
            description: Some("<script>alert('resurfacing')</script>".into()),
            ..valid_request()
        };
        let errors = ProjectInsert::try_from(request).unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn padded_title_is_measured_after_trimming() {
        let request = NewProjectRequest { title: Some("    Road         ".into()), ..valid_request() };
        let errors = ProjectInsert::try_from(request).unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let request = NewProjectRequest { title: Some("  Road resurfacing  ".into()), ..valid_request() };
        assert_eq!(ProjectInsert::try_from(request).unwrap().title, "Road resurfacing");
    }

    #[test]
    fn plain_text_description_is_stored_as_given() {
        let description = "Road & bridge repairs for the north district";
        let request = NewProjectRequest { description: Some(description.into()), ..valid_request() };
        assert_eq!(ProjectInsert::try_from(request).unwrap().description, description);
    }

    #[test]
    fn update_sanitizes_before_measuring() {
        let update = UpdateProjectRequest {
            description: Some("<script>alert(1)</script>".into()),
            ..Default::default()
        };
        let errors = update.prepare().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }
}
