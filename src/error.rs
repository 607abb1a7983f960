//! Error types for Compass Coach.

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Lead store error: {0}")]
    Store(#[from] StoreError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage-machine errors. All of these are recoverable: the session stays in
/// its current stage and the message is shown to the user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please fill email, name, and password.")]
    MissingIdentityFields,

    #[error("Action {action} is not valid in stage {stage}")]
    WrongStage { action: &'static str, stage: String },

    #[error("Missing answer for question {key}")]
    MissingAnswer { key: String },

    #[error("Score {score} for question {key} is outside 1-5")]
    ScoreOutOfRange { key: String, score: u8 },

    #[error("Unknown question key {key}")]
    UnknownQuestion { key: String },
}

/// Lead-store errors. The engine logs these and keeps the wizard moving.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Report-pipeline errors. A missing score here means the survey-completion
/// invariant was broken upstream, so generation fails rather than defaulting.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No score recorded for question {key}")]
    MissingScore { key: String },

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Pdf(lopdf::Error::from(err))
    }
}

/// Mail-transport errors. Callers receive these folded into a
/// `SendOutcome`, never as a fatal fault.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP relay error: {0}")]
    Relay(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
