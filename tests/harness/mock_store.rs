// tests/harness/mock_store.rs
//
// Mock folder store for testing.
// Records all storage calls for verification and operates against a VirtualMailbox.

use eyre::{eyre, Result};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use imap_triage::store::{FolderStore, SeenFlag};

use crate::harness::virtual_mailbox::VirtualMailbox;

/// Recorded storage calls for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedAction {
    /// A folder existence check
    Exists { folder: String },
    /// One batched move
    Move { uids: Vec<u32>, from: String, to: String },
    /// A seen-state change
    SetFlag { uid: u32, flag: SeenFlag },
    /// An unseen-count query
    CountUnseen { folder: String },
}

impl RecordedAction {
    /// Check if this is a Move action to the specified destination
    pub fn is_move_to(&self, destination: &str) -> bool {
        matches!(self, RecordedAction::Move { to, .. } if to == destination)
    }
}

/// Mock folder store with one folder open.
pub struct MockFolderStore {
    mailbox: Arc<RwLock<VirtualMailbox>>,
    actions: Arc<RwLock<Vec<RecordedAction>>>,
    current_folder: String,
    failing_moves: HashSet<String>,
    offline: bool,
}

impl MockFolderStore {
    /// Create a new mock store over `mailbox`, with `folder` open.
    pub fn new(mailbox: Arc<RwLock<VirtualMailbox>>, folder: &str) -> Self {
        Self {
            mailbox,
            actions: Arc::new(RwLock::new(Vec::new())),
            current_folder: folder.to_string(),
            failing_moves: HashSet::new(),
            offline: false,
        }
    }

    /// Make every move into `folder` fail.
    pub fn fail_moves_to(&mut self, folder: &str) {
        self.failing_moves.insert(folder.to_string());
    }

    /// Make every call fail.
    pub fn go_offline(&mut self) {
        self.offline = true;
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(eyre!("connection reset"));
        }
        Ok(())
    }

    // ===== Action Recording =====

    /// Get all recorded actions.
    pub fn get_recorded_actions(&self) -> Vec<RecordedAction> {
        self.actions.read().unwrap().clone()
    }

    /// Get all Move actions.
    pub fn get_move_actions(&self) -> Vec<RecordedAction> {
        self.actions
            .read()
            .unwrap()
            .iter()
            .filter(|a| matches!(a, RecordedAction::Move { .. }))
            .cloned()
            .collect()
    }

    /// Get all SetFlag actions.
    pub fn get_flag_actions(&self) -> Vec<RecordedAction> {
        self.actions
            .read()
            .unwrap()
            .iter()
            .filter(|a| matches!(a, RecordedAction::SetFlag { .. }))
            .cloned()
            .collect()
    }

    fn record_action(&self, action: RecordedAction) {
        self.actions.write().unwrap().push(action);
    }
}

impl FolderStore for MockFolderStore {
    fn current_folder(&self) -> &str {
        &self.current_folder
    }

    fn folder_exists(&mut self, folder: &str) -> Result<bool> {
        self.record_action(RecordedAction::Exists {
            folder: folder.to_string(),
        });
        self.check_online()?;
        Ok(self.mailbox.read().unwrap().folder_exists(folder))
    }

    fn move_messages(&mut self, uids: &[u32], dest: &str, source: &str) -> Result<()> {
        self.record_action(RecordedAction::Move {
            uids: uids.to_vec(),
            from: source.to_string(),
            to: dest.to_string(),
        });
        self.check_online()?;
        if self.failing_moves.contains(dest) {
            return Err(eyre!("NO [TRYCREATE] cannot move into {}", dest));
        }
        let mut mailbox = self.mailbox.write().unwrap();
        for uid in uids {
            mailbox.move_message(*uid, source, dest);
        }
        Ok(())
    }

    fn set_flag(&mut self, uid: u32, flag: SeenFlag) -> Result<()> {
        self.record_action(RecordedAction::SetFlag { uid, flag });
        self.check_online()?;
        self.mailbox.write().unwrap().set_seen(uid, flag == SeenFlag::Seen);
        Ok(())
    }

    fn count_unseen(&mut self, folder: &str) -> Result<u32> {
        self.record_action(RecordedAction::CountUnseen {
            folder: folder.to_string(),
        });
        self.check_online()?;
        Ok(self.mailbox.read().unwrap().unseen_count(folder))
    }
}
