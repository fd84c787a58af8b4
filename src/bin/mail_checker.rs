use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::time::Duration;

use mail_checker::auth::credentials::CredentialStore;
use mail_checker::auth::prompt::{AuthPrompt, NoPrompt, StdioPrompt};
use mail_checker::checker::PollChecker;
use mail_checker::config::{Config, load_config, resolve_credentials_path, resolve_token_path};
use mail_checker::logging;
use mail_checker::mail::gmail::GmailApi;
use mail_checker::mail::session::MailSession;

#[derive(Parser)]
#[command(name = "mail_checker")]
#[command(about = "Poll a Gmail mailbox for messages matching a filter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the poll loop: check once immediately, then on the configured cadence
    Run {
        /// Fail a tick instead of prompting on stdin when no token is stored
        #[arg(long)]
        no_input: bool,

        /// Override the configured check interval (minutes)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// One-time interactive grant; stores the token for later runs
    Authorize,

    /// Authenticate and print the mailbox label set
    Labels,
}

fn build_session(cfg: &Config, interactive: bool) -> Result<MailSession> {
    let store = CredentialStore::new(
        resolve_credentials_path(cfg)?,
        resolve_token_path(cfg)?,
    );
    let api = GmailApi::new()?;
    let prompt: Box<dyn AuthPrompt> = if interactive {
        Box::new(StdioPrompt)
    } else {
        Box::new(NoPrompt)
    };
    Ok(MailSession::new(store, Box::new(api), prompt))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    logging::init(cfg.log_level.as_deref());

    match cli.cmd {
        Command::Run { no_input, interval } => {
            let session = build_session(&cfg, !no_input)?;
            let mut checker = PollChecker::new(session, cfg.query.clone(), cfg.max_results);
            let minutes = interval.unwrap_or(cfg.check_interval_minutes).max(1);
            checker.run(Duration::from_secs(minutes * 60))
        }

        Command::Authorize => {
            let mut session = build_session(&cfg, true)?;
            session.authenticate()?;
            println!("Authorization complete; token stored.");
            Ok(())
        }

        Command::Labels => {
            let mut session = build_session(&cfg, true)?;
            session.authenticate()?;
            for label in session.list_labels()? {
                println!("{}\t{}", label.id, label.name);
            }
            Ok(())
        }
    }
}
