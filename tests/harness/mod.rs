// tests/harness/mod.rs
//
// Integration testing harness for imap-triage.
// Provides an in-memory mail store and rule blob for driving full passes.

pub mod memory_prefs;
pub mod mock_store;
pub mod test_harness;
pub mod virtual_mailbox;

pub use memory_prefs::MemoryPreferenceStore;
pub use mock_store::RecordedAction;
pub use test_harness::TestHarness;
pub use virtual_mailbox::MailboxMessage;
