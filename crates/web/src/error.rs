use salvo::http::{ParseError, StatusCode};
use salvo::{Depot, Request, Response, Writer, async_trait};
use thiserror::Error;
use yatube_store::StoreError;

use crate::config::ConfigError;

/// Failures that abort a request.
///
/// Rendering sets the status code only; the error page catcher fills in the body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store: {0}")]
    Store(StoreError),
    #[error("template: {0}")]
    Template(#[from] tera::Error),
    #[error("form: {0}")]
    Form(#[from] ParseError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("session: {0}")]
    Session(#[from] serde_json::Error),
    #[error("password hashing: {0}")]
    Password(password_hash::Error),
    #[error("{0} missing from depot")]
    MissingState(&'static str),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Store(other),
        }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        Self::Password(e)
    }
}

impl AppError {
    /// Status code this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, path = %req.uri().path(), "request failed");
        } else {
            tracing::debug!(error = %self, path = %req.uri().path(), "request rejected");
        }
        res.status_code(status);
    }
}
