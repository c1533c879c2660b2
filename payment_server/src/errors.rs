use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use payment_engine::PaymentFlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    PaymentFlow(#[from] PaymentFlowError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The stable code callers branch on. Flow errors carry their own vocabulary; server-side failures collapse
    /// into a small local set.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PaymentFlow(e) => e.error_code(),
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) => "INVALID_REQUEST",
            Self::InitializeError(_) | Self::ConfigurationError(_) => "SERVER_MISCONFIGURED",
            Self::BackendError(_) | Self::IOError(_) | Self::Unspecified(_) => "SERVER_ERROR",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::PaymentFlow(e) => match e {
                PaymentFlowError::Validation(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::InvalidSignature => StatusCode::BAD_REQUEST,
                PaymentFlowError::Expired(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::AlreadyRefunded(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::CantRefund { .. } => StatusCode::BAD_REQUEST,
                PaymentFlowError::NotRefund(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
                PaymentFlowError::Conflict { .. } => StatusCode::BAD_REQUEST,
                PaymentFlowError::NotFound(_) => StatusCode::NOT_FOUND,
                // Protocol drift is an escalation path. The 502 makes it land on an operator dashboard instead of
                // a caller-side retry loop.
                PaymentFlowError::Provider(_) => StatusCode::BAD_GATEWAY,
                PaymentFlowError::RetryableProvider(_) => StatusCode::SERVICE_UNAVAILABLE,
                PaymentFlowError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "status": self.error_code(), "error": self.to_string() }).to_string())
    }
}
