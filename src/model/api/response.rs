use serde::{Deserialize, Serialize};

/// The envelope wrapping every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The payload, on success.
    pub data: Option<T>,
    /// The failure reason, on failure.
    pub error: Option<ErrorBody>,
}

impl<T> ServiceResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(code: &str, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }
    }
}

impl ServiceResponse<()> {
    /// A successful response with no payload.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// A stable error code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
