// src/triage.rs

use log::{debug, info, warn};

use crate::batch::{BatchPlan, BatchReport};
use crate::cfg::config::Config;
use crate::cfg::rule::Rule;
use crate::evaluator::FilterEvaluator;
use crate::index::ActiveRuleIndex;
use crate::matcher::HeaderMatcher;
use crate::message::Message;
use crate::store::FolderStore;

/// Search options that stay fixed for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct TriageOptions {
    pub matcher: HeaderMatcher,
    pub extra_headers: Vec<String>,
}

impl From<&Config> for TriageOptions {
    fn from(cfg: &Config) -> Self {
        TriageOptions {
            matcher: cfg.matcher(),
            extra_headers: cfg.spam_headers.clone(),
        }
    }
}

/// One evaluation pass over a fetched message list.
///
/// Nothing outlives the call: the index, the plan and the report are all
/// built and returned here.
pub struct TriagePass<'a, S: FolderStore + ?Sized> {
    store: &'a mut S,
    options: &'a TriageOptions,
}

impl<'a, S: FolderStore + ?Sized> TriagePass<'a, S> {
    pub fn new(store: &'a mut S, options: &'a TriageOptions) -> Self {
        debug!(
            "Initializing TriagePass with {} extra headers",
            options.extra_headers.len()
        );
        TriagePass { store, options }
    }

    /// Build the active index for the open folder.
    pub fn build_index(&mut self, rules: &[Rule]) -> ActiveRuleIndex {
        let open = self.store.current_folder().to_string();
        let store = &mut *self.store;
        ActiveRuleIndex::build(rules, &open, |folder| match store.folder_exists(folder) {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Could not check folder '{}': {}", folder, e);
                false
            }
        })
    }

    /// Decide every message's disposition without touching the store.
    pub fn plan(&mut self, rules: &[Rule], messages: &[Message]) -> BatchPlan {
        let index = self.build_index(rules);
        if index.is_empty() {
            debug!("No active rules for '{}'", self.store.current_folder());
            return BatchPlan::default();
        }

        let open = self.store.current_folder().to_string();
        let evaluator = FilterEvaluator::new(&index, self.options.matcher, &open, &self.options.extra_headers);
        BatchPlan::from_dispositions(
            messages
                .iter()
                .filter_map(|msg| evaluator.evaluate(msg).map(|d| (msg.uid, d))),
        )
    }

    /// Plan, then apply the moves and flag changes.
    pub fn run(mut self, rules: &[Rule], messages: &[Message]) -> BatchReport {
        info!(
            "→ Evaluating {} messages in '{}' against {} rules",
            messages.len(),
            self.store.current_folder(),
            rules.len()
        );
        if rules.is_empty() || messages.is_empty() {
            return BatchReport::default();
        }

        let plan = self.plan(rules, messages);
        if plan.is_empty() {
            info!("No messages matched");
            return BatchReport::default();
        }
        let report = plan.apply(self.store);
        info!("✅ Moved {} messages", report.moved_count());
        report
    }
}
