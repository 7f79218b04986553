//! Report delivery via SMTP.
//!
//! [`compose_message`] builds a plain-text message with the run's artifacts
//! attached; [`deliver`] hands it to any lettre [`Transport`] and reports the
//! result as a [`DeliveryOutcome`] instead of an error, so the caller decides
//! whether a failed send fails the run.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};

use crate::error::NotifyError;

// ---------------------------------------------------------------------------
// Outgoing mail
// ---------------------------------------------------------------------------

/// Content type used for every attachment.
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// The report message before it is encoded.
#[derive(Debug, Clone)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Attached in order, each named by its file name.
    pub attachments: Vec<PathBuf>,
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

/// Encode `mail` as a multipart message, reading every attachment from disk.
pub fn compose_message(mail: &Mail) -> Result<Message, NotifyError> {
    let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
        .map_err(|e| NotifyError::Build(e.to_string()))?;

    let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(mail.body.clone()));
    for path in &mail.attachments {
        let content = fs::read(path).map_err(|source| NotifyError::Attachment {
            path: path.clone(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        multipart =
            multipart.singlepart(Attachment::new(filename).body(content, content_type.clone()));
    }

    Message::builder()
        .from(mailbox(&mail.from)?)
        .to(mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .multipart(multipart)
        .map_err(|e| NotifyError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered => write!(f, "delivered"),
            DeliveryOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Plain SMTP transport to a relay, without TLS or authentication.
///
/// `timeout` bounds every network operation of a send.
pub fn smtp_transport(server: &str, port: u16, timeout: Duration) -> SmtpTransport {
    SmtpTransport::builder_dangerous(server)
        .port(port)
        .timeout(Some(timeout))
        .build()
}

/// Send `message` once. Failures are returned, not raised.
pub fn deliver<T>(transport: &T, message: &Message) -> DeliveryOutcome
where
    T: Transport,
    T::Error: fmt::Display,
{
    match transport.send(message) {
        Ok(_) => {
            tracing::info!("report email sent");
            DeliveryOutcome::Delivered
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to send report email");
            DeliveryOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
