use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::{errors::MailError, settings::AppConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound transactional mail channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Confirms the channel is configured and reachable before a send run.
    async fn verify(&self) -> Result<(), MailError>;

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Mail provider reached over its HTTP API (`POST {api_url}/emails`).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<Zeroizing<String>>,
    sender: Option<String>,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: Option<&str>, from_address: Option<&str>, from_name: &str) -> Self {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| Zeroizing::new(k.to_string()));

        let sender = from_address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|address| match from_name.trim() {
                "" => address.to_string(),
                name => format!("{} <{}>", name, address),
            });

        HttpMailer {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            sender,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.mail_api_url,
            config.mail_api_key.as_deref(),
            config.mail_from_address.as_deref(),
            &config.mail_from_name,
        )
    }

    fn credentials(&self) -> Result<(&str, &str), MailError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| MailError::NotConfigured("missing API key".into()))?;
        let sender = self
            .sender
            .as_deref()
            .ok_or_else(|| MailError::NotConfigured("missing sender address".into()))?;
        Ok((key.as_str(), sender))
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        let (key, _) = self.credentials()?;

        let response = self
            .client
            .get(format!("{}/domains", self.api_url))
            .bearer_auth(key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 => Err(MailError::Rejected(401, "API key was not accepted".into())),
            status if status >= 500 => Err(MailError::Unreachable(format!("provider returned {}", status))),
            _ => Ok(()),
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let (key, sender) = self.credentials()?;

        let body = SendEmailBody {
            from: sender,
            to: [mail.to.as_str()],
            subject: &mail.subject,
            html: &mail.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(status.as_u16(), detail));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn verify_fails_without_credentials() {
        let mailer = HttpMailer::new("https://mail.invalid", None, Some("news@city.example"), "City");
        assert!(matches!(mailer.verify().await, Err(MailError::NotConfigured(_))));

        let mailer = HttpMailer::new("https://mail.invalid", Some("re_key"), None, "City");
        assert!(matches!(mailer.verify().await, Err(MailError::NotConfigured(_))));
    }

    #[test]
    fn sender_includes_display_name() {
        let mailer = HttpMailer::new("https://api.example/", Some("k"), Some("news@city.example"), "Civic Updates");
        assert_eq!(mailer.sender.as_deref(), Some("Civic Updates <news@city.example>"));
        assert_eq!(mailer.api_url, "https://api.example");
    }
}
