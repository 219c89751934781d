use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Relay { status: StatusCode, message: String },
}
