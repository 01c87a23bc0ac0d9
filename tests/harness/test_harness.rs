// tests/harness/test_harness.rs
//
// High-level test harness combining all components.
// Provides a convenient API for writing integration tests.

use std::sync::{Arc, RwLock};

use imap_triage::batch::BatchReport;
use imap_triage::cfg::rule::Rule;
use imap_triage::matcher::HeaderMatcher;
use imap_triage::message::Message;
use imap_triage::rule_store::RuleStore;
use imap_triage::store::FolderStore;
use imap_triage::triage::{TriageOptions, TriagePass};

use crate::harness::memory_prefs::MemoryPreferenceStore;
use crate::harness::mock_store::{MockFolderStore, RecordedAction};
use crate::harness::virtual_mailbox::{MailboxMessage, VirtualMailbox};

pub struct TestHarness {
    pub mailbox: Arc<RwLock<VirtualMailbox>>,
    pub store: MockFolderStore,
    pub rules: RuleStore<MemoryPreferenceStore>,
    pub options: TriageOptions,
}

impl TestHarness {
    /// INBOX open, case-insensitive search, X-Spam-Flag as the extra header.
    pub fn new() -> Self {
        Self::with_folder("INBOX")
    }

    pub fn with_folder(folder: &str) -> Self {
        let mailbox = Arc::new(RwLock::new(VirtualMailbox::new()));
        mailbox.write().unwrap().create_folder(folder);
        let store = MockFolderStore::new(Arc::clone(&mailbox), folder);
        let options = TriageOptions {
            matcher: HeaderMatcher::new(true, false),
            extra_headers: vec!["X-Spam-Flag".to_string()],
        };

        Self {
            mailbox,
            store,
            rules: RuleStore::new(MemoryPreferenceStore::new()),
            options,
        }
    }

    // ===== Setup =====

    pub fn create_folders(&mut self, folders: &[&str]) {
        let mut mailbox = self.mailbox.write().unwrap();
        for folder in folders {
            mailbox.create_folder(folder);
        }
    }

    /// Add a message directly to the mailbox.
    pub fn add_message(&mut self, message: MailboxMessage) -> u32 {
        self.mailbox.write().unwrap().add_message(message)
    }

    /// Store a rule through the rule store, as a user would.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.append(rule).expect("rule should be accepted");
    }

    // ===== Running =====

    /// Messages of the open folder, as the fetch would list them.
    pub fn listed_messages(&self) -> Vec<Message> {
        let mailbox = self.mailbox.read().unwrap();
        mailbox
            .messages_in(self.store.current_folder())
            .into_iter()
            .map(|m| m.to_message())
            .collect()
    }

    /// Run one full pass over the open folder.
    pub fn run(&mut self) -> BatchReport {
        let messages = self.listed_messages();
        let rules = self.rules.list().expect("rules should load");
        TriagePass::new(&mut self.store, &self.options).run(&rules, &messages)
    }

    // ===== Inspection =====

    pub fn folder_of(&self, uid: u32) -> String {
        self.mailbox.read().unwrap().get_message(uid).unwrap().folder.clone()
    }

    pub fn is_seen(&self, uid: u32) -> bool {
        self.mailbox.read().unwrap().get_message(uid).unwrap().seen
    }

    pub fn actions(&self) -> Vec<RecordedAction> {
        self.store.get_recorded_actions()
    }

    pub fn move_actions(&self) -> Vec<RecordedAction> {
        self.store.get_move_actions()
    }

    /// Assert that no message was moved or flagged.
    pub fn assert_untouched(&self) {
        let changes: Vec<_> = self
            .actions()
            .into_iter()
            .filter(|a| matches!(a, RecordedAction::Move { .. } | RecordedAction::SetFlag { .. }))
            .collect();
        assert!(changes.is_empty(), "Expected no changes but found {:?}", changes);
    }
}
