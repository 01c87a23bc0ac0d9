// src/batch.rs

use log::{debug, info, warn};

use crate::cfg::rule::MarkAction;
use crate::evaluator::Disposition;
use crate::store::{FolderStore, SeenFlag};

/// Messages bound for one destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderBatch {
    pub folder: String,
    pub uids: Vec<u32>,
    pub marks: Vec<(u32, SeenFlag)>,
}

/// Dispositions grouped by destination, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    batches: Vec<FolderBatch>,
}

/// Outcome for one destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub folder: String,
    pub moved: Vec<u32>,
    /// Unseen count after the move, when the store could tell.
    pub unseen: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub moved: Vec<FolderReport>,
    /// Folders whose move failed, with the store's error text.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn moved_count(&self) -> usize {
        self.moved.iter().map(|r| r.moved.len()).sum()
    }
}

impl BatchPlan {
    pub fn from_dispositions<I>(dispositions: I) -> Self
    where
        I: IntoIterator<Item = (u32, Disposition)>,
    {
        let mut plan = BatchPlan::default();
        for (uid, disposition) in dispositions {
            plan.push(uid, disposition);
        }
        plan
    }

    pub fn push(&mut self, uid: u32, disposition: Disposition) {
        if disposition.dest.is_empty() {
            return;
        }
        let idx = match self.batches.iter().position(|b| b.folder == disposition.dest) {
            Some(idx) => idx,
            None => {
                self.batches.push(FolderBatch {
                    folder: disposition.dest.clone(),
                    uids: Vec::new(),
                    marks: Vec::new(),
                });
                self.batches.len() - 1
            }
        };
        let batch = &mut self.batches[idx];
        if batch.uids.contains(&uid) {
            return;
        }
        batch.uids.push(uid);
        match disposition.mark {
            MarkAction::MarkRead => batch.marks.push((uid, SeenFlag::Seen)),
            MarkAction::MarkUnread => batch.marks.push((uid, SeenFlag::Unseen)),
            MarkAction::None => {}
        }
    }

    pub fn batches(&self) -> &[FolderBatch] {
        &self.batches
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Flag, then move, one folder at a time. A failing folder is recorded
    /// and skipped; the rest still go through.
    pub fn apply<S>(&self, store: &mut S) -> BatchReport
    where
        S: FolderStore + ?Sized,
    {
        let source = store.current_folder().to_string();
        let mut report = BatchReport::default();

        for batch in &self.batches {
            for (uid, flag) in &batch.marks {
                if let Err(e) = store.set_flag(*uid, *flag) {
                    warn!("Failed to set {:?} on UID {}: {}", flag, uid, e);
                }
            }

            info!("Moving {} messages {} → {}", batch.uids.len(), source, batch.folder);
            if let Err(e) = store.move_messages(&batch.uids, &batch.folder, &source) {
                warn!("Move to '{}' failed; skipping folder: {}", batch.folder, e);
                report.failed.push((batch.folder.clone(), e.to_string()));
                continue;
            }

            let unseen = match store.count_unseen(&batch.folder) {
                Ok(n) => Some(n),
                Err(e) => {
                    debug!("Could not count unseen in '{}': {}", batch.folder, e);
                    None
                }
            };
            report.moved.push(FolderReport {
                folder: batch.folder.clone(),
                moved: batch.uids.clone(),
                unseen,
            });
        }
        report
    }
}
