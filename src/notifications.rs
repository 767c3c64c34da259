//! Outbound mail delivery through an HTTP mail gateway.
//!
//! The gateway is an external collaborator: messages are posted to it as JSON
//! and it owns SMTP. When no gateway is configured (local development), mail
//! is logged and dropped.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::ServiceError;

const MAX_RETRIES: u32 = 3;

/// A rendered mail message handed to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Well-known message kinds the API can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Welcome,
    Otp,
    PasswordChanged,
}

impl MailKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "welcome" => Some(Self::Welcome),
            "otp" => Some(Self::Otp),
            "password-change" => Some(Self::PasswordChanged),
            _ => None,
        }
    }
}

/// Mail delivery client.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    gateway_url: Option<String>,
    gateway_token: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(gateway_url: Option<String>, gateway_token: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client construction cannot fail with static config"),
            gateway_url,
            gateway_token,
            from,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.mail_gateway_url.clone(),
            cfg.mail_gateway_token.clone(),
            cfg.mail_from.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.gateway_url.is_some()
    }

    /// Probe the gateway. Errors when unconfigured or unreachable.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> Result<(), ServiceError> {
        let url = self.gateway_url.as_ref().ok_or_else(|| {
            ServiceError::ExternalServiceError("Mail gateway is not configured".to_string())
        })?;

        let mut request = self.client.get(url.as_str());
        if let Some(token) = &self.gateway_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("Mail gateway unreachable: {}", e))
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::ExternalServiceError(format!(
                "Mail gateway returned status {}",
                response.status()
            )))
        }
    }

    /// Deliver a message, retrying with exponential backoff.
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send(&self, message: MailMessage) -> Result<(), ServiceError> {
        let url = match &self.gateway_url {
            Some(url) => url.clone(),
            None => {
                info!(to = %message.to, subject = %message.subject, "Mail gateway not configured; dropping message");
                return Ok(());
            }
        };

        for attempt in 1..=MAX_RETRIES {
            let mut request = self.client.post(&url).json(&message);
            if let Some(token) = &self.gateway_token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!(to = %message.to, "Mail delivered to gateway");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        status = %response.status(),
                        attempt,
                        max = MAX_RETRIES,
                        "Mail gateway rejected message"
                    );
                }
                Err(e) => {
                    warn!(error = %e, attempt, max = MAX_RETRIES, "Mail delivery error");
                }
            }

            if attempt < MAX_RETRIES {
                let backoff = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(ServiceError::ExternalServiceError(format!(
            "Failed to deliver mail after {} retries",
            MAX_RETRIES
        )))
    }

    /// Fire-and-forget delivery for best-effort notifications.
    pub fn send_async(&self, message: MailMessage) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(message).await {
                error!("Async mail delivery failed: {}", e);
            }
        });
    }

    pub fn welcome_message(&self, to: &str, name: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Welcome to StockMaster".to_string(),
            text: format!(
                "Hi {},\n\nYour StockMaster account is ready. You can now sign in and start managing inventory.\n",
                name
            ),
        }
    }

    pub fn otp_message(&self, to: &str, otp: &str, name: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Your StockMaster password reset code".to_string(),
            text: format!(
                "Hi {},\n\nYour password reset code is {}. It expires in 10 minutes.\n\nIf you did not request a reset, you can ignore this message.\n",
                name, otp
            ),
        }
    }

    pub fn password_changed_message(&self, to: &str, name: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: "Your StockMaster password was changed".to_string(),
            text: format!(
                "Hi {},\n\nYour account password was just changed. If this was not you, contact an administrator immediately.\n",
                name
            ),
        }
    }

    pub fn message_for(&self, kind: MailKind, to: &str, name: &str) -> MailMessage {
        match kind {
            MailKind::Welcome => self.welcome_message(to, name),
            MailKind::Otp => self.otp_message(to, "123456", name),
            MailKind::PasswordChanged => self.password_changed_message(to, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_mailer() -> Mailer {
        Mailer::new(None, None, "no-reply@stockmaster.local".to_string())
    }

    #[test]
    fn mail_message_serialization() {
        let msg = test_mailer().otp_message("user@example.com", "123456", "User");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("user@example.com"));
        assert!(json.contains("123456"));
        assert!(json.contains("no-reply@stockmaster.local"));
    }

    #[test]
    fn mail_kind_parsing() {
        assert_eq!(MailKind::parse("welcome"), Some(MailKind::Welcome));
        assert_eq!(MailKind::parse("otp"), Some(MailKind::Otp));
        assert_eq!(
            MailKind::parse("password-change"),
            Some(MailKind::PasswordChanged)
        );
        assert_eq!(MailKind::parse("spam"), None);
    }

    #[tokio::test]
    async fn unconfigured_gateway_drops_mail() {
        let mailer = test_mailer();
        let msg = mailer.welcome_message("user@example.com", "User");
        assert!(mailer.send(msg).await.is_ok());
        assert!(mailer.test_connection().await.is_err());
    }
}
