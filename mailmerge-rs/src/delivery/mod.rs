//! Delivery: the orchestrator and the capabilities it is wired with
//!
//! - [`channel`]: mail-submission sessions (SMTP over TLS)
//! - [`confirm`]: human confirmation gates
//! - [`preview`]: visual preview of rendered HTML
//! - [`mailer`]: the per-recipient delivery loop

pub mod channel;
pub mod confirm;
pub mod mailer;
pub mod preview;

pub use channel::{Channel, Session, SmtpChannel, SmtpSession};
pub use confirm::{Confirmer, TerminalConfirmer, CONFIRMATION_TOKEN};
pub use mailer::{Mailer, RunOutcome};
pub use preview::{CommandPreviewer, Previewer, DEFAULT_VIEWER};
