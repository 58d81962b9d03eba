//! Outgoing message composition

use lettre::message::header::{HeaderName, HeaderValue};
use lettre::message::{Mailbox, Mailboxes, MessageBuilder, MultiPart};
use lettre::Message;
use tracing::warn;

use crate::error::{MergeError, Result};
use crate::headers::Headers;
use crate::message::Attachment;

/// Headers whose values the composer owns
const MANAGED_HEADERS: [&str; 4] = ["to", "mime-version", "content-type", "content-transfer-encoding"];

/// Build one complete message
///
/// `headers` are the effective headers; `to` is the resolved destination.
/// The body is multipart/alternative (plain text first, HTML preferred);
/// when attachments are present it is wrapped in multipart/mixed with one
/// part per attachment, in order.
///
/// # Errors
/// - [`MergeError::MissingRequiredHeader`] before anything else is built
/// - [`MergeError::InvalidAddress`] for unparsable address headers
/// - [`MergeError::Io`] when an attachment cannot be read
pub fn compose_message(
    headers: &Headers,
    to: &str,
    text: &str,
    html: &str,
    attachments: &[Attachment],
) -> Result<Message> {
    headers.require()?;

    let mut builder = Message::builder();
    for (name, value) in headers.iter() {
        builder = apply_header(builder, name, value)?;
    }
    builder = builder.to(parse_mailbox("To", to)?);

    let alternative = MultiPart::alternative_plain_html(text.to_string(), html.to_string());
    if attachments.is_empty() {
        return Ok(builder.multipart(alternative)?);
    }

    let mut mixed = MultiPart::mixed().multipart(alternative);
    for attachment in attachments {
        mixed = mixed.singlepart(attachment.to_part()?);
    }
    Ok(builder.multipart(mixed)?)
}

fn apply_header(builder: MessageBuilder, name: &str, value: &str) -> Result<MessageBuilder> {
    let lowered = name.to_ascii_lowercase();
    if MANAGED_HEADERS.contains(&lowered.as_str()) {
        warn!(header = %name, "Ignoring header set by the composer");
        return Ok(builder);
    }

    let builder = match lowered.as_str() {
        "from" => builder.from(parse_mailbox(name, value)?),
        "sender" => builder.sender(parse_mailbox(name, value)?),
        "subject" => builder.subject(value),
        "cc" => parse_mailboxes(name, value)?
            .into_iter()
            .fold(builder, MessageBuilder::cc),
        "bcc" => parse_mailboxes(name, value)?
            .into_iter()
            .fold(builder, MessageBuilder::bcc),
        "reply-to" => parse_mailboxes(name, value)?
            .into_iter()
            .fold(builder, MessageBuilder::reply_to),
        _ => {
            let header = HeaderName::new_from_ascii(name.to_string())
                .map_err(|_| MergeError::InvalidHeader(name.to_string()))?;
            builder.raw_header(HeaderValue::new(header, value.to_string()))
        }
    };
    Ok(builder)
}

fn parse_mailbox(header: &str, value: &str) -> Result<Mailbox> {
    value.parse().map_err(|_| MergeError::InvalidAddress {
        header: header.to_string(),
        value: value.to_string(),
    })
}

fn parse_mailboxes(header: &str, value: &str) -> Result<Mailboxes> {
    value.parse().map_err(|_| MergeError::InvalidAddress {
        header: header.to_string(),
        value: value.to_string(),
    })
}
