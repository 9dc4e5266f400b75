//! Mailer errors

use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The SMTP settings cannot be used to open a connection
    #[error("invalid SMTP configuration: {0}")]
    Configuration(String),

    /// The sender or recipient is not a usable address
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The connection, authentication or the server rejected the message
    #[error("failed to send email: {0}")]
    SendError(String),
}
