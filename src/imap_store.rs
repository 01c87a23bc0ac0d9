// src/imap_store.rs

use eyre::{eyre, Result};
use imap::Session;
use log::{debug, info};
use native_tls::{TlsConnector, TlsStream};
use std::fmt;
use std::io::{Read, Write};
use std::net::TcpStream;

use crate::error::TriageError;
use crate::message::Message;
use crate::store::{FolderStore, MessageListSource, SeenFlag};

/// Open a TLS session on port 993 and log in.
pub fn connect(domain: &str, username: &str, password: &str) -> Result<Session<TlsStream<TcpStream>>> {
    debug!("Connecting to {}:993", domain);
    let tls = TlsConnector::builder().build()?;
    let client = imap::connect((domain, 993), domain, &tls)
        .map_err(|e| eyre!("Failed to connect to {}: {:?}", domain, e))?;
    let session = client
        .login(username, password)
        .map_err(|(e, _)| eyre!("Login failed for {}: {:?}", username, e))?;
    info!("Logged in to {} as {}", domain, username);
    Ok(session)
}

/// `FolderStore` over a live IMAP session with one folder selected.
pub struct ImapFolderStore<T: Read + Write> {
    session: Session<T>,
    folder: String,
}

impl<T: Read + Write> ImapFolderStore<T> {
    pub fn open(mut session: Session<T>, folder: &str) -> Result<Self> {
        session
            .select(folder)
            .map_err(|e| unavailable(format!("SELECT '{}'", folder), e))?;
        debug!("Selected '{}'", folder);
        Ok(ImapFolderStore {
            session,
            folder: folder.to_string(),
        })
    }

    pub fn logout(mut self) -> Result<()> {
        info!("Logging out from IMAP");
        self.session.logout()?;
        Ok(())
    }
}

/// Server-side failure of a call the caller cannot work around.
fn unavailable(what: impl fmt::Display, err: imap::error::Error) -> TriageError {
    TriageError::StorageUnavailable(format!("{} failed: {}", what, err))
}

fn uid_set(uids: &[u32]) -> String {
    uids.iter().map(|u| u.to_string()).collect::<Vec<_>>().join(",")
}

impl<T: Read + Write> FolderStore for ImapFolderStore<T> {
    fn current_folder(&self) -> &str {
        &self.folder
    }

    fn folder_exists(&mut self, folder: &str) -> Result<bool> {
        let list = self
            .session
            .list(None, Some("*"))
            .map_err(|e| unavailable("LIST", e))?;
        Ok(list.iter().any(|mb| mb.name() == folder))
    }

    fn move_messages(&mut self, uids: &[u32], dest: &str, source: &str) -> Result<()> {
        if uids.is_empty() {
            return Ok(());
        }
        if source != self.folder {
            return Err(eyre!("'{}' is not the selected folder ('{}')", source, self.folder));
        }
        let set = uid_set(uids);
        debug!("UID MOVE {} \"{}\"", set, dest);
        self.session
            .uid_mv(&set, dest)
            .map_err(|e| eyre!("Failed to MOVE UIDs {} → `{}`: {:?}", set, dest, e))
    }

    fn set_flag(&mut self, uid: u32, flag: SeenFlag) -> Result<()> {
        let cmd = match flag {
            SeenFlag::Seen => "+FLAGS.SILENT (\\Seen)",
            SeenFlag::Unseen => "-FLAGS.SILENT (\\Seen)",
        };
        debug!("UID STORE {} {}", uid, cmd);
        self.session
            .uid_store(uid.to_string(), cmd)
            .map(|_| ())
            .map_err(|e| eyre!("Failed to set {:?} on UID {}: {:?}", flag, uid, e))
    }

    fn count_unseen(&mut self, folder: &str) -> Result<u32> {
        let status = self
            .session
            .status(folder, "(UNSEEN)")
            .map_err(|e| eyre!("STATUS '{}' failed: {:?}", folder, e))?;
        Ok(status.unseen.unwrap_or(0))
    }
}

impl<T: Read + Write> MessageListSource for ImapFolderStore<T> {
    /// Fetch UID, FLAGS and the RFC 2822 header of every message.
    fn fetch_messages(&mut self) -> Result<Vec<Message>> {
        let seqs = self
            .session
            .search("ALL")
            .map_err(|e| unavailable(format!("SEARCH in '{}'", self.folder), e))?;
        debug!("SEARCH returned {} messages in '{}'", seqs.len(), self.folder);
        if seqs.is_empty() {
            return Ok(vec![]);
        }

        let mut seqs: Vec<u32> = seqs.into_iter().collect();
        seqs.sort_unstable();
        let seq_set = uid_set(&seqs);

        let fetches = self
            .session
            .fetch(&seq_set, "(UID FLAGS RFC822.HEADER)")
            .map_err(|e| unavailable(format!("FETCH in '{}'", self.folder), e))?;
        debug!("FETCH returned {} records", fetches.len());

        let mut out = Vec::with_capacity(fetches.len());
        for fetch in fetches.iter() {
            let uid = match fetch.uid {
                Some(uid) => uid,
                None => {
                    debug!("Skipping seq {} without UID", fetch.message);
                    continue;
                }
            };
            let flags: Vec<String> = fetch.flags().iter().map(|f| f.to_string()).collect();
            let raw_header = fetch.header().unwrap_or(&[]);
            out.push(Message::new(uid, raw_header, &flags));
        }

        debug!("Successfully fetched {} messages", out.len());
        Ok(out)
    }
}
