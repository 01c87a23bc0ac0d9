// src/cli.rs

use clap::{Parser, Subcommand};
use secure_string::SecureString;
use std::path::PathBuf;

use imap_triage::cfg::rule::{MarkAction, MatchField, MessageScope};

/// Command-line interface options for imap-triage.
#[derive(Parser, Debug)]
#[command(
    name = "imap-triage",
    version = env!("GIT_DESCRIBE"),
    about = "Rule-based IMAP message triage",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "imap-triage.yml")]
    pub config: PathBuf,

    /// Rule file (overrides `rules-path` in the config)
    #[arg(short, long, env = "IMAP_TRIAGE_RULES")]
    pub rules: Option<PathBuf>,

    #[arg(short, long, help = "turn on debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in, sort the messages of one folder, log out
    Run {
        /// Folder to triage
        #[arg(short, long, default_value = "INBOX")]
        folder: String,

        /// IMAP server domain
        #[arg(short = 'D', long, env = "IMAP_DOMAIN")]
        imap_domain: Option<String>,

        /// IMAP username
        #[arg(short = 'U', long, env = "IMAP_USERNAME")]
        imap_username: Option<String>,

        /// IMAP password
        #[arg(short = 'P', long, env = "IMAP_PASSWORD")]
        imap_password: Option<SecureString>,
    },

    /// Store a new rule
    Add {
        /// from, to, cc, subject or a header name
        #[arg(short, long)]
        field: MatchField,

        /// Text to look for
        #[arg(short, long)]
        search: String,

        /// Folder the rule watches
        #[arg(long, default_value = "INBOX")]
        source: String,

        /// Folder matched messages move to
        #[arg(long)]
        dest: String,

        /// all, unread or read
        #[arg(long, default_value = "all")]
        scope: MessageScope,

        /// none, markread or markunread
        #[arg(long, default_value = "none")]
        mark: MarkAction,

        /// Stop at this rule when it matches
        #[arg(long)]
        priority: bool,
    },

    /// Delete the rule shown at INDEX by `list`
    Delete { index: usize },

    /// Show stored rules
    List,
}
