// src/rule_store.rs

use log::{debug, info, warn};
use std::fmt;

use crate::cfg::config::Config;
use crate::cfg::rule::{MatchField, Rule};
use crate::error::{Result, TriageError};
use crate::store::PreferenceStore;

/// Folder the spam-forwarding rules watch.
pub const SPAM_SOURCE_FOLDER: &str = "INBOX";

/// Value a spam filter writes into its flag header.
pub const SPAM_FLAG_VALUE: &str = "Yes";

/// A stored rule as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    /// Position in the list; also the delete key.
    pub index: usize,
    pub text: String,
    pub priority: bool,
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.priority { "!" } else { " " };
        write!(f, "{}[{}] {}", marker, self.index, self.text)
    }
}

/// CRUD over the user's rule list.
///
/// Every mutation is a full read-modify-write of the persisted list.
pub struct RuleStore<P: PreferenceStore> {
    prefs: P,
}

impl<P: PreferenceStore> RuleStore<P> {
    pub fn new(prefs: P) -> Self {
        RuleStore { prefs }
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn list(&self) -> Result<Vec<Rule>> {
        self.prefs.load_rules()
    }

    /// Validate and append. Nothing is written when validation fails.
    pub fn append(&mut self, rule: Rule) -> Result<()> {
        let rule = rule.normalized()?;
        info!("Adding rule: {}", rule.describe());
        self.prefs.update_rules(|rules| {
            rules.push(rule);
            Ok(())
        })
    }

    /// Remove the rule at `index`. Later rules shift down by one.
    pub fn delete_at(&mut self, index: usize) -> Result<Rule> {
        let removed = self.prefs.update_rules(|rules| {
            if index >= rules.len() {
                return Err(TriageError::NoSuchRule(index));
            }
            Ok(rules.remove(index))
        })?;
        info!("Deleted rule {}: {}", index, removed.describe());
        Ok(removed)
    }

    pub fn summaries(&self) -> Result<Vec<RuleSummary>> {
        Ok(self
            .list()?
            .iter()
            .enumerate()
            .map(|(index, rule)| RuleSummary {
                index,
                text: rule.describe(),
                priority: rule.priority,
            })
            .collect())
    }

    /// Make sure the subject and flag-header rules routing spam from INBOX
    /// to `junk_folder` exist. Returns true when they were added.
    ///
    /// Either rule already present counts as installed. A blank junk folder
    /// disables the bootstrap; a blank spam subject leaves out the subject rule.
    pub fn ensure_spam_forwarding_pair(
        &mut self,
        spam_subject: &str,
        spam_header: &str,
        junk_folder: Option<&str>,
    ) -> Result<bool> {
        let junk = match junk_folder.map(str::trim).filter(|s| !s.is_empty()) {
            Some(junk) => junk,
            None => {
                debug!("No junk folder configured; skipping spam rules");
                return Ok(false);
            }
        };

        let subject = spam_subject.trim();
        let header = MatchField::new(spam_header);
        let mut wanted = Vec::new();
        if !subject.is_empty() {
            wanted.push(Rule::new(MatchField::Subject, subject, SPAM_SOURCE_FOLDER, junk).normalized()?);
        }
        if !header.as_str().is_empty() {
            wanted.push(Rule::new(header.clone(), SPAM_FLAG_VALUE, SPAM_SOURCE_FOLDER, junk).normalized()?);
        }
        if wanted.is_empty() {
            debug!("No spam subject or flag header configured; skipping spam rules");
            return Ok(false);
        }

        let added = self.prefs.update_rules(|rules| {
            let installed = rules.iter().any(|r| {
                (!subject.is_empty() && r.field == MatchField::Subject && r.search == subject)
                    || (r.field.key() == header.key() && r.search == SPAM_FLAG_VALUE)
            });
            if installed {
                return Ok(false);
            }
            rules.extend(wanted);
            Ok(true)
        })?;

        if added {
            info!("Installed spam forwarding rules → {}", junk);
        } else {
            debug!("Spam forwarding rules already present");
        }
        Ok(added)
    }

    /// Login-time spam bootstrap driven by `cfg`. Failures are logged and
    /// never stop the caller from going on to the pass.
    pub fn bootstrap_spam_rules(&mut self, cfg: &Config) -> bool {
        if !cfg.auto_add_spam_filter_rule {
            return false;
        }
        match self.ensure_spam_forwarding_pair(&cfg.spam_subject, &cfg.spam_flag_header, cfg.junk_folder()) {
            Ok(added) => added,
            Err(e) => {
                warn!("Could not install spam forwarding rules: {}", e);
                false
            }
        }
    }
}
