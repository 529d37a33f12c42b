use serde::Serialize;

/// Uniform success body: `{ success, message?, data?, count? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
            count: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            count: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A page of rows together with the total number of matching rows.
    pub fn list(page: Page<T>) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(page.items),
            count: Some(page.total),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: None,
            count: None,
        }
    }
}

/// Rows of one page plus the filtered total, independent of the page slice.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Page { items, total }
    }
}
