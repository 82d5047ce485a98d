use api_types::ErrorBody;
use query_cache::CacheError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// 401: no session, or the token was refused.
    #[error("{message}")]
    Unauthorized { message: String },
    /// Any other 4xx.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// 5xx, or any other non-2xx status.
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The body was not the expected JSON. On a mutation this is only
    /// reported after a 2xx, so the change was applied and the affected
    /// queries are already invalidated.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Refused locally, before any request was sent.
    #[error("{0}")]
    Invalid(String),
    #[error("client configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Coarse classification of a [`ClientError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    AuthMissing,
    Validation,
    Network,
    Server,
    Client,
}

impl ClientError {
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized { message },
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::AuthMissing,
            Self::Rejected { .. } | Self::Invalid(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } | Self::Decode(_) => ErrorKind::Server,
            Self::Config(_) | Self::Cache(_) => ErrorKind::Client,
        }
    }
}

/// Where the user-facing message of a failed response comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Message {
    /// Always the caller's fallback text (queries).
    Fixed,
    /// The `message` field of the error body when present (mutations).
    FromBody,
}

/// Turns a non-2xx response into the matching [`ClientError`].
pub(crate) async fn ensure_success(
    res: Response,
    fallback: &str,
    source: Message,
) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = match source {
        Message::Fixed => fallback.to_string(),
        Message::FromBody => match error_body(res).await {
            Some(ErrorBody {
                message: Some(message),
            }) if !message.trim().is_empty() => message,
            _ => fallback.to_string(),
        },
    };
    tracing::warn!(%status, "request failed: {message}");
    Err(ClientError::from_status(status, message))
}

pub(crate) async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let body = res.bytes().await.map_err(ClientError::Network)?;
    Ok(serde_json::from_slice(&body)?)
}

async fn error_body(res: Response) -> Option<ErrorBody> {
    let body = res.bytes().await.ok()?;
    serde_json::from_slice(&body).ok()
}
