//! SMTP email service implementation

use std::{fmt, time::Duration};

use async_trait::async_trait;
use clap::{ArgAction, Parser};
use lettre::{
    address::{Address, Envelope},
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::domain::communication::mailer::{Mailer, MailerError, Message};

/// SMTP configuration
///
/// Empty values are accepted here and only fail once a message is sent.
#[derive(Clone, Default, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[arg(long = "smtp-server", env = "SMTP_SERVER", default_value = "")]
    pub host: String,

    /// The SMTP port
    #[arg(long = "smtp-port", env = "SMTP_PORT", default_value = "")]
    pub port: String,

    /// The SMTP username
    #[arg(long = "smtp-username", env = "SMTP_USERNAME", default_value = "")]
    pub username: String,

    /// The SMTP password
    #[arg(
        long = "smtp-password",
        env = "SMTP_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// The sender email address
    #[arg(long = "from-email", env = "FROM_EMAIL", default_value = "")]
    pub sender: String,

    /// Seconds to wait on the SMTP server before giving up
    #[arg(long = "smtp-timeout", env = "SMTP_TIMEOUT", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Refuse to send unless the connection can be upgraded with STARTTLS
    #[arg(
        long = "smtp-require-tls",
        env = "SMTP_REQUIRE_TLS",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub require_tls: bool,

    /// Verify the TLS certificate
    #[arg(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub verify_tls: bool,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("sender", &self.sender)
            .field("timeout_secs", &self.timeout_secs)
            .field("require_tls", &self.require_tls)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// SMTP mailer
#[derive(Debug, Default, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new SMTP mailer
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Builds a transport for a single delivery.
    ///
    /// The connection is plaintext until the server offers STARTTLS and
    /// authenticates with the PLAIN mechanism.
    pub fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        if self.config.host.is_empty() {
            return Err(MailerError::Configuration(
                "SMTP host is not set".to_string(),
            ));
        }

        let port = self.config.port.parse::<u16>().map_err(|_| {
            MailerError::Configuration(format!("invalid SMTP port \"{}\"", self.config.port))
        })?;

        let tls_parameters = TlsParameters::builder(self.config.host.clone())
            .dangerous_accept_invalid_certs(!self.config.verify_tls)
            .build()
            .map_err(|e| MailerError::Configuration(e.to_string()))?;

        let tls = if self.config.require_tls {
            Tls::Required(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
                .port(port)
                .tls(tls)
                .credentials(creds)
                .authentication(vec![Mechanism::Plain])
                .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
                .build(),
        )
    }

    fn envelope(&self, to: &str) -> Result<Envelope, MailerError> {
        let from = parse_address(&self.config.sender)?;
        let to = parse_address(to)?;

        Envelope::new(Some(from), vec![to]).map_err(|e| MailerError::InvalidAddress(e.to_string()))
    }
}

fn parse_address(address: &str) -> Result<Address, MailerError> {
    address
        .parse::<Address>()
        .map_err(|e| MailerError::InvalidAddress(format!("\"{address}\": {e}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, message: &Message) -> Result<(), MailerError> {
        let envelope = self.envelope(&message.to)?;
        let transport = self.transport()?;

        debug!(
            "delivering to {} via {}:{}",
            message.to, self.config.host, self.config.port
        );

        let limit = Duration::from_secs(self.config.timeout_secs);
        let raw = message.to_rfc822();

        timeout(limit, transport.send_raw(&envelope, raw.as_bytes()))
            .await
            .map_err(|_| {
                MailerError::SendError(format!(
                    "timed out after {}s waiting for {}:{}",
                    self.config.timeout_secs, self.config.host, self.config.port
                ))
            })?
            .map_err(|e| MailerError::SendError(e.to_string()))?;

        info!("Email sent to {}", message.to);

        Ok(())
    }
}
