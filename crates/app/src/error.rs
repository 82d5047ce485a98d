use finflow_client::ClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not logged in, run `finflow login` first")]
    NotLoggedIn,
    #[error("invalid input: {0}")]
    Input(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
