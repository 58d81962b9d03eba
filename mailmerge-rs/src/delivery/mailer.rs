//! Campaign delivery
//!
//! The [`Mailer`] drives one run: pre-flight checks, the overall
//! confirmation, one authenticated session, then every recipient in order.
//!
//! ```text
//! Idle -> OverallConfirmPending -> Aborted
//!                               -> SessionOpen -> (Rendering -> ConfirmPending -> Skipped | Sent)* -> Closed
//! ```

use tracing::{debug, error, info, warn};

use crate::campaign::{CampaignData, Recipient};
use crate::config::SenderConfig;
use crate::delivery::channel::{Channel, Session};
use crate::delivery::confirm::Confirmer;
use crate::delivery::preview::Previewer;
use crate::error::Result;
use crate::headers::Headers;
use crate::html::inline_styles;
use crate::message::{compose_message, Attachment};
use crate::templates::TemplateRenderer;

const OVERALL_PROMPT: &str = "PLEASE DOUBLE-CHECK EVERYTHING and type 'yes' to proceed";
const RECIPIENT_PROMPT: &str = "Type 'yes' to proceed";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every recipient was either sent or skipped
    Completed { sent: usize, skipped: usize },
    /// The overall confirmation was declined, nothing was opened or sent
    Aborted,
}

impl RunOutcome {
    /// Process exit status
    pub fn status(&self) -> u8 {
        match self {
            RunOutcome::Completed { .. } => 0,
            RunOutcome::Aborted => 1,
        }
    }
}

/// Everything one run needs after pre-flight succeeded
struct Plan<'c> {
    campaign: &'c CampaignData,
    sender: &'c SenderConfig,
    headers: Headers,
    attachments: Vec<Attachment>,
}

impl Plan<'_> {
    fn destination<'r>(&'r self, recipient: &'r Recipient) -> &'r str {
        self.sender
            .override_recipient
            .as_deref()
            .unwrap_or(&recipient.address)
    }
}

/// Delivery orchestrator
pub struct Mailer<'a, C, F, P> {
    templates: &'a TemplateRenderer,
    channel: C,
    confirmer: F,
    previewer: P,
}

impl<'a, C, F, P> Mailer<'a, C, F, P>
where
    C: Channel,
    F: Confirmer,
    P: Previewer,
{
    pub fn new(templates: &'a TemplateRenderer, channel: C, confirmer: F, previewer: P) -> Self {
        Self {
            templates,
            channel,
            confirmer,
            previewer,
        }
    }

    pub fn confirmer(&self) -> &F {
        &self.confirmer
    }

    pub fn previewer(&self) -> &P {
        &self.previewer
    }

    /// Deliver `campaign` using `sender`
    ///
    /// Required headers and attachment types are checked before anything is
    /// shown or opened. Once a session is open it is closed exactly once,
    /// whether the run succeeds or fails.
    pub fn run(
        &mut self,
        campaign: &CampaignData,
        sender: &SenderConfig,
        confirmations: bool,
    ) -> Result<RunOutcome> {
        let plan = self.preflight(campaign, sender)?;

        if confirmations {
            let summary = overall_summary(&plan);
            if !self.confirmer.confirm(&summary, OVERALL_PROMPT)? {
                error!("Confirmation failed, exiting");
                return Ok(RunOutcome::Aborted);
            }
        }

        let mut session = self.channel.open(&sender.server)?;
        let delivered = self.deliver(&mut session, &plan, confirmations);
        let closed = session.close();

        let (sent, skipped) = match (delivered, closed) {
            (Ok(counts), Ok(())) => counts,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(close_error)) => {
                warn!("Failed to close session after error: {}", close_error);
                return Err(e);
            }
        };

        info!(sent, skipped, "Done.");
        Ok(RunOutcome::Completed { sent, skipped })
    }

    fn preflight<'c>(&self, campaign: &'c CampaignData, sender: &'c SenderConfig) -> Result<Plan<'c>> {
        let headers = campaign.headers.overlay(&sender.headers);
        headers.require()?;
        let attachments = Attachment::resolve_all(&campaign.attachments)?;
        debug!(
            recipients = campaign.recipients.len(),
            attachments = attachments.len(),
            "Pre-flight checks passed"
        );

        Ok(Plan {
            campaign,
            sender,
            headers,
            attachments,
        })
    }

    fn deliver(
        &mut self,
        session: &mut C::Session,
        plan: &Plan<'_>,
        confirmations: bool,
    ) -> Result<(usize, usize)> {
        session.login(&plan.sender.login, &plan.sender.pwd)?;

        let mut sent = 0;
        let mut skipped = 0;
        for recipient in &plan.campaign.recipients {
            let text = self.templates.render_text(&recipient.fields)?;
            let html = inline_styles(&self.templates.render_html(&recipient.fields)?)?;
            let to = plan.destination(recipient);

            if confirmations {
                let subject = plan.headers.get("Subject").unwrap_or_default();
                self.previewer.preview(&recipient.address, subject, &html)?;

                let details = recipient_details(plan, recipient, &text);
                if !self.confirmer.confirm(&details, RECIPIENT_PROMPT)? {
                    warn!(recipient = %recipient.address, "Not confirmed, skipping");
                    skipped += 1;
                    continue;
                }
            }

            let message = compose_message(&plan.headers, to, &text, &html, &plan.attachments)?;
            session.send(&message)?;
            info!(recipient = %recipient.address, to = %to, "Sent.");
            sent += 1;
        }

        Ok((sent, skipped))
    }
}

fn overall_summary(plan: &Plan<'_>) -> String {
    let mut out = String::from("Sending emails with this config:\n");
    out.push_str(&format!(
        "  - logging in as {} to {}\n\n",
        plan.sender.login, plan.sender.server
    ));

    out.push_str("  - sending with these headers (check From, Subject AND CC):\n");
    for (name, value) in plan.headers.iter() {
        out.push_str(&format!("      {}: '{}'\n", name, value));
    }
    out.push('\n');

    if plan.attachments.is_empty() {
        out.push_str("  - there are NO ATTACHMENTS\n");
    } else {
        out.push_str("  - sending the following attachments:\n");
        for attachment in &plan.attachments {
            out.push_str(&format!("    - '{}'\n", attachment.path().display()));
        }
    }
    out
}

fn recipient_details(plan: &Plan<'_>, recipient: &Recipient, text: &str) -> String {
    let destination = match &plan.sender.override_recipient {
        None => format!("Sending the above email to {}.", recipient.address),
        Some(target) => format!(
            "This would be sent to {}, but sender config overrides all sending to {}.",
            recipient.address, target
        ),
    };
    format!("{}\n{}\n======\n{}", "=".repeat(50), text, destination)
}
