//! Send a mail-merge campaign
//!
//! # Usage
//!
//! ```bash
//! # Review every message, pick the sender profile interactively
//! mailmerge spring-meetup
//!
//! # Non-interactive run with a named profile
//! mailmerge spring-meetup --sender work --no-confirmations
//!
//! # Profiles from a TOML file, previews in another browser
//! mailmerge spring-meetup --config senders.toml --viewer chromium
//! ```

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use dialoguer::Select;
use mailmerge_rs::campaign::CampaignDocument;
use mailmerge_rs::config::{SenderConfig, SenderProfiles, DEFAULT_CONFIG_PATH};
use mailmerge_rs::delivery::confirm::{ask, is_interactive};
use mailmerge_rs::delivery::{CommandPreviewer, Mailer, RunOutcome, SmtpChannel, TerminalConfirmer, DEFAULT_VIEWER};
use mailmerge_rs::templates::{TemplateRenderer, DEFAULT_INCLUDES_DIR};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailmerge")]
#[command(about = "Render and send a mail-merge campaign", long_about = None)]
struct Cli {
    /// Campaign name, read from <mails-dir>/<campaign>.txt
    campaign: String,

    /// Sender profile to use; asked interactively when omitted
    #[arg(short, long)]
    sender: Option<String>,

    /// Send without the overall and per-recipient confirmations
    #[arg(long = "no-confirmations", action = ArgAction::SetFalse)]
    confirmations: bool,

    /// Sender configuration file (.json or .toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding campaign files
    #[arg(long, default_value = "mails")]
    mails_dir: PathBuf,

    /// Directory holding template partials
    #[arg(long, default_value = DEFAULT_INCLUDES_DIR)]
    includes_dir: PathBuf,

    /// Program used to preview rendered HTML
    #[arg(long, default_value = DEFAULT_VIEWER)]
    viewer: String,

    /// SMTP read/write timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(outcome) => ExitCode::from(outcome.status()),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let profiles = SenderProfiles::from_file(&cli.config)
        .with_context(|| format!("Failed to load sender config {}", cli.config.display()))?;
    let sender = select_sender(&profiles, cli.sender.as_deref())?;

    let document = CampaignDocument::load(&cli.mails_dir, &cli.campaign)?;
    let campaign = document.data()?;
    let templates = TemplateRenderer::compile(&document.body, &cli.includes_dir)?;
    info!(
        campaign = %cli.campaign,
        recipients = campaign.recipients.len(),
        "Campaign loaded"
    );

    let channel = SmtpChannel::new().with_timeout(cli.timeout.map(Duration::from_secs));
    let mut mailer = Mailer::new(
        &templates,
        channel,
        TerminalConfirmer::new(),
        CommandPreviewer::new(cli.viewer),
    );
    Ok(mailer.run(&campaign, sender, cli.confirmations)?)
}

fn select_sender<'p>(profiles: &'p SenderProfiles, name: Option<&str>) -> anyhow::Result<&'p SenderConfig> {
    if profiles.is_empty() {
        return Err(anyhow!("No sender profiles configured"));
    }

    if let Some(name) = name {
        return profiles
            .get(name)
            .ok_or_else(|| anyhow!("Unknown sender {:?}", name));
    }

    let items: Vec<String> = profiles
        .iter()
        .map(|(name, config)| format!("[{}]: {}", name, config.summary()))
        .collect();

    if is_interactive() {
        let index = Select::new()
            .with_prompt("Select sender")
            .items(&items)
            .default(0)
            .interact()?;
        return profiles
            .iter()
            .nth(index)
            .map(|(_, config)| config)
            .ok_or_else(|| anyhow!("No sender selected"));
    }

    for (number, item) in items.iter().enumerate() {
        println!("{}. {}", number + 1, item);
    }
    let answer = ask("Select sender (number or name)")?;
    pick_sender(profiles, &answer).ok_or_else(|| anyhow!("No sender selected for {:?}", answer))
}

/// Resolve a typed choice: a 1-based list number or a profile name
fn pick_sender<'p>(profiles: &'p SenderProfiles, answer: &str) -> Option<&'p SenderConfig> {
    let answer = answer.trim();
    match answer.parse::<usize>() {
        Ok(number) if number > 0 => profiles.iter().nth(number - 1).map(|(_, config)| config),
        _ => profiles.get(answer),
    }
}
