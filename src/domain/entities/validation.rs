use std::borrow::Cow;

use validator::ValidationError;

use crate::entities::option_fields::OptionField;

pub const MAX_IMAGES: usize = 6;

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_image_urls(images: &[String]) -> Result<(), ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(new_validation_error("too_many_images", "A maximum of 6 images is allowed"));
    }
    for image in images {
        validate_url(image).map_err(|_| {
            new_validation_error("invalid_image_url", "Each image must be a valid http(s) URL")
        })?;
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

/// Surrounding whitespace is dropped before a field is validated or stored.
pub fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub fn trimmed_field(value: OptionField<String>) -> OptionField<String> {
    match value {
        OptionField::SetToValue(v) => OptionField::SetToValue(v.trim().to_string()),
        other => other,
    }
}

pub fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}
