use uuid::Uuid;

use crate::errors::AppError;

/// Validates if a string is a valid UUID format
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::BadRequest("Invalid UUID format".to_string()))
}
