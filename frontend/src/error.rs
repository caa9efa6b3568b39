use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by backend calls and form handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// The fetch itself failed: offline, DNS, CORS and the like.
    #[error("network error: {0}")]
    Network(#[from] gloo_net::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    /// Rejected on the client before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// A browser API call threw.
    #[error("browser error: {0}")]
    Browser(String),
}

impl AppError {
    /// Text suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AppError::Status { message, .. } if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            AppError::Status { status, .. } => {
                format!("The request failed with status {status}. Please try again.")
            }
            AppError::Decode(_) => "The server sent a response we could not read.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Browser(_) => "Something went wrong in the browser. Please reload the page.".to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<JsValue> for AppError {
    fn from(value: JsValue) -> Self {
        AppError::Browser(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}
