//! Authenticated mail-submission channel
//!
//! A [`Channel`] opens one [`Session`] per run. The session is logged into
//! once and then used for every message, one at a time.
//!
//! # Features
//! - Implicit TLS (SMTPS) submission, port 465 unless the server names one
//! - AUTH PLAIN / LOGIN
//! - SMTP envelope taken from the message's address headers

use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{MergeError, Result};

/// Port used when the server string carries none
pub const DEFAULT_SUBMISSION_PORT: u16 = 465;

/// Opens sessions to a mail-submission server
pub trait Channel {
    type Session: Session;

    fn open(&mut self, server: &str) -> Result<Self::Session>;
}

/// An open connection to a mail-submission server
pub trait Session {
    fn login(&mut self, user: &str, pwd: &str) -> Result<()>;

    fn send(&mut self, message: &Message) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// SMTP over implicit TLS
///
/// # Examples
/// ```no_run
/// use mailmerge_rs::delivery::{Channel, Session, SmtpChannel};
///
/// # fn example() -> mailmerge_rs::Result<()> {
/// let mut channel = SmtpChannel::new();
/// let mut session = channel.open("smtp.example.com")?;
/// session.login("user@example.com", "secret")?;
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct SmtpChannel {
    hello_name: ClientId,
    timeout: Option<Duration>,
}

impl SmtpChannel {
    pub fn new() -> Self {
        let hostname = gethostname::gethostname().to_string_lossy().to_string();
        Self {
            hello_name: ClientId::Domain(hostname),
            timeout: None,
        }
    }

    /// Limit every network read and write; unlimited by default
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SmtpChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for SmtpChannel {
    type Session = SmtpSession;

    fn open(&mut self, server: &str) -> Result<SmtpSession> {
        let (host, port) = split_server(server)?;
        info!("Connecting to {}:{}", host, port);

        let tls = TlsParameters::new(host.to_string()).map_err(transport)?;
        let connection =
            SmtpConnection::connect((host, port), self.timeout, &self.hello_name, Some(&tls), None)
                .map_err(transport)?;

        Ok(SmtpSession {
            connection,
            server: server.to_string(),
        })
    }
}

pub struct SmtpSession {
    connection: SmtpConnection,
    server: String,
}

impl Session for SmtpSession {
    fn login(&mut self, user: &str, pwd: &str) -> Result<()> {
        debug!("Authenticating as {} on {}", user, self.server);
        let credentials = Credentials::new(user.to_string(), pwd.to_string());
        self.connection
            .auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
            .map_err(transport)?;
        Ok(())
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        let response = self
            .connection
            .send(message.envelope(), &message.formatted())
            .map_err(transport)?;
        debug!("< {:?}", response);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.connection.quit().map_err(transport)?;
        debug!("Closed connection to {}", self.server);
        Ok(())
    }
}

fn transport(error: impl std::fmt::Display) -> MergeError {
    MergeError::Transport(error.to_string())
}

/// Split `host[:port]`, defaulting to [`DEFAULT_SUBMISSION_PORT`]
pub fn split_server(server: &str) -> Result<(&str, u16)> {
    let server = server.trim();
    let (host, port) = match server.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| MergeError::Config(format!("invalid port in server {:?}", server)))?;
            (host, port)
        }
        None => (server, DEFAULT_SUBMISSION_PORT),
    };

    if host.is_empty() {
        return Err(MergeError::Config(format!("invalid server {:?}", server)));
    }
    Ok((host, port))
}
