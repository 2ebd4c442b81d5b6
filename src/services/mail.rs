use crate::config::{Config, MailBackend};
use futures::future::BoxFuture;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, Result<(), anyhow::Error>>;
}

pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let mail = &config.mail;
        let from: Mailbox = mail
            .from
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid from address: {}", mail.from))?;
        let host = mail
            .smtp_host
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SMTP_HOST must be set for the smtp mail backend"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .port(mail.smtp_port)
            .credentials(Credentials::new(
                mail.smtp_username.clone(),
                mail.smtp_password.clone(),
            ))
            .build();

        Ok(SmtpMailer { from, transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, Result<(), anyhow::Error>> {
        Box::pin(async move {
            let to: Mailbox = mail
                .to
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid to address: {}", mail.to))?;
            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .header(ContentType::TEXT_PLAIN)
                .subject(mail.subject)
                .body(mail.body)?;
            self.transport.send(message).await?;
            Ok(())
        })
    }
}

/// Logs mail instead of delivering it; the default for local setups.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, Result<(), anyhow::Error>> {
        Box::pin(async move {
            log::info!(
                "Mail to {} | {} | {}",
                mail.to,
                mail.subject,
                mail.body
            );
            Ok(())
        })
    }
}

/// Keeps every message in memory. Used by the integration tests.
#[derive(Default, Clone)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    pub fn last_to(&self, address: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|mail| mail.to == address)
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, Result<(), anyhow::Error>> {
        Box::pin(async move {
            self.outbox
                .lock()
                .map_err(|_| anyhow::anyhow!("Mail outbox poisoned"))?
                .push(mail);
            Ok(())
        })
    }
}

pub fn create_mailer(config: &Config) -> Result<Arc<dyn Mailer>, anyhow::Error> {
    let mailer: Arc<dyn Mailer> = match config.mail.backend {
        MailBackend::Log => Arc::new(LogMailer),
        MailBackend::Smtp => Arc::new(SmtpMailer::new(config)?),
    };
    Ok(mailer)
}

/// Text of the message carrying a signup confirmation code.
pub fn confirmation_mail(email: &str, code: &str) -> OutgoingMail {
    OutgoingMail {
        to: email.to_string(),
        subject: "Confirmation code".to_string(),
        body: format!("Your confirmation code: {}", code),
    }
}
