//! Email delivery of loan notifications

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};

use super::notifications::{LoanEvent, Notifier};
use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{EBook, Loan, User},
    repository::LendingStore,
};

#[derive(Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
    store: Arc<dyn LendingStore>,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, store: Arc<dyn LendingStore>) -> Self {
        Self { config, store }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, event: LoanEvent, loan: &Loan) -> AppResult<()> {
        let user = self
            .store
            .get_user(loan.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", loan.user_id)))?;
        let ebook = self
            .store
            .get_ebook(loan.ebook_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("EBook with id {} not found", loan.ebook_id)))?;

        let (subject, body) = compose(event, &user, &ebook, loan);
        let config = self.config.clone();
        let to = user.email.clone();

        // SMTP delivery blocks
        tokio::task::spawn_blocking(move || send_email(&config, &to, &subject, &body))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
    }
}

/// Subject and plain-text body for a loan event
pub fn compose(event: LoanEvent, user: &User, ebook: &EBook, loan: &Loan) -> (String, String) {
    let due = loan.due_date.format("%Y-%m-%d");
    match event {
        LoanEvent::Created => (
            format!("Loan confirmation: {}", ebook.title),
            format!(
                "Hello {name},\n\nYou have borrowed \"{title}\" by {author}.\nYour loan is due on {due}.\n",
                name = user.name,
                title = ebook.title,
                author = ebook.author,
                due = due
            ),
        ),
        LoanEvent::Ended => (
            format!("Loan ended: {}", ebook.title),
            format!(
                "Hello {name},\n\nYour loan of \"{title}\" has ended. We hope you enjoyed it.\n",
                name = user.name,
                title = ebook.title
            ),
        ),
        LoanEvent::DueSoon => (
            format!("Reminder: {} is due soon", ebook.title),
            format!(
                "Hello {name},\n\nYour loan of \"{title}\" ends on {due}.\n",
                name = user.name,
                title = ebook.title,
                due = due
            ),
        ),
    }
}

/// Plain text wrapped for the HTML part, with markup characters escaped
fn html_body(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(r#"<html><body><pre>{}</pre></body></html>"#, escaped)
}

fn send_email(config: &EmailConfig, to: &str, subject: &str, body: &str) -> AppResult<()> {
    let from_name = config.smtp_from_name.as_deref().unwrap_or("E-Book Lending");
    let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, config.smtp_from))
        .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

    let to_mailbox = Mailbox::from_str(to)
        .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

    let email = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body(body)),
                ),
        )
        .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

    let mailer_builder = if config.smtp_use_tls {
        SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
    } else {
        SmtpTransport::builder_dangerous(&config.smtp_host)
    }
    .port(config.smtp_port);

    let mailer_builder = if let (Some(username), Some(password)) =
        (&config.smtp_username, &config.smtp_password)
    {
        mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
    } else {
        mailer_builder
    };

    mailer_builder
        .build()
        .send(&email)
        .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

    Ok(())
}
