use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::entities::validation::trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Complaint {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ComplaintInsert {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct NewComplaintForm {
    #[validate(
        required(message = "Name is required"),
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Email must be a valid email address"),
        length(min = 5, max = 100, message = "Email must be between 5 and 100 characters")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Subject is required"),
        length(min = 5, max = 200, message = "Subject must be between 5 and 200 characters")
    )]
    pub subject: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters")
    )]
    pub description: Option<String>,
}

impl NewComplaintForm {
    /// Trims every field and lower-cases the email.
    pub fn normalized(self) -> Self {
        NewComplaintForm {
            name: trimmed(self.name),
            email: self.email.map(|e| e.trim().to_lowercase()),
            subject: trimmed(self.subject),
            description: trimmed(self.description),
        }
    }
}

impl TryFrom<NewComplaintForm> for ComplaintInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewComplaintForm) -> Result<Self, Self::Error> {
        let value = value.normalized();
        value.validate()?;

        Ok(ComplaintInsert {
            name: value.name.unwrap_or_default(),
            email: value.email.unwrap_or_default(),
            subject: value.subject.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
        })
    }
}
