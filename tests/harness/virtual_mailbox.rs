// tests/harness/virtual_mailbox.rs
//
// In-memory mail store for testing.
// Simulates folders, seen-state and moves without network access.

use std::collections::{BTreeMap, HashSet};

use imap_triage::message::Message;

/// Represents the state of a message in the virtual mailbox.
#[derive(Debug, Clone)]
pub struct MailboxMessage {
    pub uid: u32,
    pub folder: String,
    pub seen: bool,
    pub headers: Vec<(String, String)>,
}

impl MailboxMessage {
    /// Create a new unread INBOX message with minimal required headers.
    pub fn new(subject: &str, from: &str, to: &str) -> Self {
        Self {
            uid: 0,
            folder: "INBOX".to_string(),
            seen: false,
            headers: vec![
                ("From".to_string(), from.to_string()),
                ("To".to_string(), to.to_string()),
                ("Subject".to_string(), subject.to_string()),
            ],
        }
    }

    /// Builder method to place the message in another folder.
    pub fn in_folder(mut self, folder: &str) -> Self {
        self.folder = folder.to_string();
        self
    }

    /// Builder method to mark the message read.
    pub fn seen(mut self) -> Self {
        self.seen = true;
        self
    }

    /// Builder method to add CC recipients.
    pub fn with_cc(self, cc: &[&str]) -> Self {
        let joined = cc.join(", ");
        self.with_header("Cc", &joined)
    }

    /// Builder method to add a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Render the header block the way a FETCH RFC822.HEADER would.
    pub fn raw_headers(&self) -> Vec<u8> {
        let mut raw = String::new();
        for (name, value) in &self.headers {
            raw.push_str(&format!("{}: {}\r\n", name, value));
        }
        raw.push_str("\r\n");
        raw.into_bytes()
    }

    /// Convert into the library's message type.
    pub fn to_message(&self) -> Message {
        let flags = if self.seen { vec!["\\Seen".to_string()] } else { vec![] };
        Message::new(self.uid, &self.raw_headers(), &flags)
    }
}

/// Record of a message move operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub uid: u32,
    pub from_folder: String,
    pub to_folder: String,
}

/// In-memory mail store for testing.
#[derive(Debug, Default)]
pub struct VirtualMailbox {
    messages: BTreeMap<u32, MailboxMessage>,
    next_uid: u32,
    folders: HashSet<String>,
    moves: Vec<MoveRecord>,
}

impl VirtualMailbox {
    /// Create a new virtual mailbox holding only INBOX.
    pub fn new() -> Self {
        let mut folders = HashSet::new();
        folders.insert("INBOX".to_string());

        Self {
            messages: BTreeMap::new(),
            next_uid: 1,
            folders,
            moves: Vec::new(),
        }
    }

    /// Add a message to the mailbox, returning the assigned UID.
    pub fn add_message(&mut self, mut message: MailboxMessage) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;

        message.uid = uid;
        self.folders.insert(message.folder.clone());
        self.messages.insert(uid, message);
        uid
    }

    /// Get a message by UID.
    pub fn get_message(&self, uid: u32) -> Option<&MailboxMessage> {
        self.messages.get(&uid)
    }

    /// Messages in a folder, by ascending UID.
    pub fn messages_in(&self, folder: &str) -> Vec<&MailboxMessage> {
        self.messages.values().filter(|m| m.folder == folder).collect()
    }

    /// Move a message from one folder to another.
    pub fn move_message(&mut self, uid: u32, from: &str, to: &str) -> bool {
        match self.messages.get_mut(&uid) {
            Some(msg) if msg.folder == from => {
                msg.folder = to.to_string();
                self.moves.push(MoveRecord {
                    uid,
                    from_folder: from.to_string(),
                    to_folder: to.to_string(),
                });
                true
            }
            _ => false,
        }
    }

    /// Set or clear a message's seen-state.
    pub fn set_seen(&mut self, uid: u32, seen: bool) -> bool {
        if let Some(msg) = self.messages.get_mut(&uid) {
            msg.seen = seen;
            true
        } else {
            false
        }
    }

    pub fn unseen_count(&self, folder: &str) -> u32 {
        self.messages
            .values()
            .filter(|m| m.folder == folder && !m.seen)
            .count() as u32
    }

    /// Get the move history for assertions.
    pub fn get_move_history(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn folder_exists(&self, folder: &str) -> bool {
        self.folders.contains(folder)
    }

    pub fn create_folder(&mut self, folder: &str) {
        self.folders.insert(folder.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_uids() {
        let mut mailbox = VirtualMailbox::new();
        let a = mailbox.add_message(MailboxMessage::new("A", "a@example.com", "me@example.com"));
        let b = mailbox.add_message(MailboxMessage::new("B", "b@example.com", "me@example.com"));
        assert_eq!((a, b), (1, 2));
        assert_eq!(mailbox.messages_in("INBOX").len(), 2);
    }

    #[test]
    fn test_move_requires_source_folder() {
        let mut mailbox = VirtualMailbox::new();
        let uid = mailbox.add_message(MailboxMessage::new("A", "a@example.com", "me@example.com"));
        assert!(!mailbox.move_message(uid, "Archive", "INBOX"));
        assert!(mailbox.move_message(uid, "INBOX", "Archive"));
        assert_eq!(mailbox.get_message(uid).unwrap().folder, "Archive");
        assert_eq!(mailbox.get_move_history().len(), 1);
    }

    #[test]
    fn test_to_message_round_trips_headers() {
        let msg = MailboxMessage::new("Hello", "a@example.com", "me@example.com")
            .with_cc(&["c@example.com"])
            .with_header("X-Spam-Flag", "YES")
            .seen()
            .to_message();
        assert_eq!(msg.subject, "Hello");
        assert_eq!(msg.cc, "c@example.com");
        assert!(msg.seen);
        assert_eq!(msg.others.get("x-spam-flag").map(String::as_str), Some("YES"));
    }
}
