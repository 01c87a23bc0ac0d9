// src/store.rs
//
// Collaborator seams: the mail store, the message list and the per-user
// rule blob. Production code talks to IMAP and a JSON file; tests swap in
// in-memory doubles.

use advisory_lock::{AdvisoryFileLock, FileLockMode};
use eyre::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::cfg::rule::Rule;
use crate::error::TriageError;
use crate::message::Message;

/// Read-state flag written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenFlag {
    Seen,
    Unseen,
}

/// Folder operations needed by a pass. One implementation per backend.
pub trait FolderStore {
    /// Folder the listed messages live in.
    fn current_folder(&self) -> &str;

    fn folder_exists(&mut self, folder: &str) -> Result<bool>;

    /// Move `uids` from `source` to `dest` in one operation.
    fn move_messages(&mut self, uids: &[u32], dest: &str, source: &str) -> Result<()>;

    fn set_flag(&mut self, uid: u32, flag: SeenFlag) -> Result<()>;

    fn count_unseen(&mut self, folder: &str) -> Result<u32>;
}

/// Produces the messages of the open folder.
pub trait MessageListSource {
    fn fetch_messages(&mut self) -> Result<Vec<Message>>;
}

/// Per-user persisted rule list.
pub trait PreferenceStore {
    fn load_rules(&self) -> std::result::Result<Vec<Rule>, TriageError>;
    fn save_rules(&mut self, rules: &[Rule]) -> std::result::Result<(), TriageError>;

    /// Load, change and save the list as one step. Nothing is written when
    /// `change` fails or leaves the list as it was.
    ///
    /// Backends shared between processes override this to hold a lock
    /// across the whole cycle.
    fn update_rules<T, F>(&mut self, change: F) -> std::result::Result<T, TriageError>
    where
        F: FnOnce(&mut Vec<Rule>) -> std::result::Result<T, TriageError>,
    {
        modify_rules(self, change)
    }
}

fn modify_rules<P, T, F>(prefs: &mut P, change: F) -> std::result::Result<T, TriageError>
where
    P: PreferenceStore + ?Sized,
    F: FnOnce(&mut Vec<Rule>) -> std::result::Result<T, TriageError>,
{
    let before = prefs.load_rules()?;
    let mut rules = before.clone();
    let out = change(&mut rules)?;
    if rules != before {
        prefs.save_rules(&rules)?;
    }
    Ok(out)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleBlob {
    #[serde(default)]
    filters: Vec<Rule>,
}

/// Rules kept as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonPreferenceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// Exclusive advisory lock on a sibling file; blocks until granted.
    fn lock(&self) -> std::result::Result<File, TriageError> {
        let lock_path = self.lock_path();
        let persist = |e: String| TriageError::Persistence(format!("lock {}: {}", lock_path.display(), e));

        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persist(e.to_string()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| persist(e.to_string()))?;
        AdvisoryFileLock::lock(&file, FileLockMode::Exclusive).map_err(|e| persist(format!("{:?}", e)))?;
        debug!("Locked {}", lock_path.display());
        Ok(file)
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load_rules(&self) -> std::result::Result<Vec<Rule>, TriageError> {
        if !self.path.exists() {
            debug!("No rule file at {}; starting empty", self.path.display());
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| TriageError::Persistence(format!("read {}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(vec![]);
        }
        let blob: RuleBlob = serde_json::from_str(&content)
            .map_err(|e| TriageError::Persistence(format!("parse {}: {}", self.path.display(), e)))?;
        Ok(blob.filters)
    }

    /// Writes a sibling temp file and renames it into place.
    fn save_rules(&mut self, rules: &[Rule]) -> std::result::Result<(), TriageError> {
        let persist = |e: std::io::Error| TriageError::Persistence(format!("write {}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist)?;
        }
        let blob = RuleBlob {
            filters: rules.to_vec(),
        };
        let json = serde_json::to_string_pretty(&blob).map_err(|e| TriageError::Persistence(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(persist)?;
        fs::rename(&tmp, &self.path).map_err(persist)?;
        info!("Saved {} rules to {}", rules.len(), self.path.display());
        Ok(())
    }

    fn update_rules<T, F>(&mut self, change: F) -> std::result::Result<T, TriageError>
    where
        F: FnOnce(&mut Vec<Rule>) -> std::result::Result<T, TriageError>,
    {
        let lock = self.lock()?;
        let out = modify_rules(self, change);
        if let Err(e) = AdvisoryFileLock::unlock(&lock) {
            warn!("Failed to unlock {}: {:?}", self.lock_path().display(), e);
        }
        out
    }
}
