// tests/harness/memory_prefs.rs
//
// In-memory rule blob standing in for the user's preference storage.

use std::sync::{Arc, RwLock};

use imap_triage::cfg::rule::Rule;
use imap_triage::store::PreferenceStore;
use imap_triage::TriageError;

/// Shares its rule list, so a test can inspect what a `RuleStore` saved.
#[derive(Clone, Default)]
pub struct MemoryPreferenceStore {
    rules: Arc<RwLock<Vec<Rule>>>,
    fail_saves: bool,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saves always fail.
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Make later saves fail (or succeed again). Clones keep their own setting.
    pub fn set_failing(&mut self, failing: bool) {
        self.fail_saves = failing;
    }

    pub fn snapshot(&self) -> Vec<Rule> {
        self.rules.read().unwrap().clone()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_rules(&self) -> Result<Vec<Rule>, TriageError> {
        Ok(self.snapshot())
    }

    fn save_rules(&mut self, rules: &[Rule]) -> Result<(), TriageError> {
        if self.fail_saves {
            return Err(TriageError::Persistence("preference backend rejected write".into()));
        }
        *self.rules.write().unwrap() = rules.to_vec();
        Ok(())
    }
}
