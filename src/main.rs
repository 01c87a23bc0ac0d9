use clap::Parser;
use env_logger::Builder;
use eyre::{eyre, Result};
use log::{debug, info, LevelFilter};
use std::io::Write;

use imap_triage::cfg::config::{load_config, Config};
use imap_triage::cfg::rule::Rule;
use imap_triage::imap_store::{connect, ImapFolderStore};
use imap_triage::rule_store::RuleStore;
use imap_triage::store::{JsonPreferenceStore, MessageListSource};
use imap_triage::triage::{TriageOptions, TriagePass};

mod cli;

use cli::{Cli, Command};

fn init_logging(debug: bool) {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info).parse_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .ok();
}

fn run(
    cfg: &Config,
    rules: &mut RuleStore<JsonPreferenceStore>,
    folder: &str,
    domain: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let domain = domain
        .or_else(|| cfg.imap_domain.clone())
        .ok_or_else(|| eyre!("No IMAP domain given (--imap-domain or imap-domain)"))?;
    let username = username
        .or_else(|| cfg.imap_username.clone())
        .ok_or_else(|| eyre!("No IMAP username given (--imap-username or imap-username)"))?;
    let password = password
        .or_else(|| cfg.imap_password.as_ref().map(|p| p.unsecure().to_string()))
        .ok_or_else(|| eyre!("No IMAP password given (--imap-password or imap-password)"))?;

    let session = connect(&domain, &username, &password)?;

    rules.bootstrap_spam_rules(cfg);

    let mut store = ImapFolderStore::open(session, folder)?;
    let messages = store.fetch_messages()?;
    info!("✅ Fetched {} messages from '{}'", messages.len(), folder);

    let stored = rules.list()?;
    let options = TriageOptions::from(cfg);
    let report = TriagePass::new(&mut store, &options).run(&stored, &messages);

    for moved in &report.moved {
        match moved.unseen {
            Some(unseen) => println!("{}: moved {} ({} unseen)", moved.folder, moved.moved.len(), unseen),
            None => println!("{}: moved {}", moved.folder, moved.moved.len()),
        }
    }
    for (folder, err) in &report.failed {
        println!("{}: move failed: {}", folder, err);
    }

    store.logout()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    debug!("{:?}", cli);

    let cfg = load_config(&cli.config)?;
    let rules_path = cli.rules.clone().unwrap_or_else(|| cfg.rules_path());
    let mut rules = RuleStore::new(JsonPreferenceStore::new(rules_path));

    match cli.command {
        Command::Run {
            folder,
            imap_domain,
            imap_username,
            imap_password,
        } => {
            let password = imap_password.map(|p| p.unsecure().to_string());
            run(&cfg, &mut rules, &folder, imap_domain, imap_username, password)?;
        }
        Command::Add {
            field,
            search,
            source,
            dest,
            scope,
            mark,
            priority,
        } => {
            let rule = Rule::new(field, &search, &source, &dest)
                .with_scope(scope)
                .with_mark(mark)
                .with_priority(priority);
            rules.append(rule)?;
            println!("Rule saved");
        }
        Command::Delete { index } => {
            let removed = rules.delete_at(index)?;
            println!("Deleted: {}", removed.describe());
        }
        Command::List => {
            let summaries = rules.summaries()?;
            if summaries.is_empty() {
                println!("No stored rules");
            }
            for summary in summaries {
                println!("{}", summary);
            }
        }
    }

    Ok(())
}
