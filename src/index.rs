// src/index.rs

use log::debug;
use std::collections::HashMap;

use crate::cfg::rule::{MarkAction, MatchField, MessageScope, Rule};

/// What a matched rule does to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub dest: String,
    pub scope: MessageScope,
    pub priority: bool,
    pub mark: MarkAction,
}

impl From<&Rule> for Template {
    fn from(rule: &Rule) -> Self {
        Template {
            dest: rule.dest.clone(),
            scope: rule.scope,
            priority: rule.priority,
            mark: rule.mark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub search: String,
    pub template: Template,
}

/// Rules that may fire in the open folder, grouped by matched field.
///
/// Built fresh for every pass and dropped with it.
#[derive(Debug, Default, Clone)]
pub struct ActiveRuleIndex {
    fields: HashMap<String, Vec<IndexEntry>>,
}

impl ActiveRuleIndex {
    /// Keep only rules whose source is `open_folder`, whose destination
    /// differs, and whose folders both exist.
    ///
    /// A repeated (field, search) pair overwrites the earlier entry in place.
    pub fn build<F>(rules: &[Rule], open_folder: &str, mut folder_exists: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        let mut index = ActiveRuleIndex::default();
        let mut known: HashMap<String, bool> = HashMap::new();
        let mut exists = |folder: &str| -> bool {
            if let Some(&hit) = known.get(folder) {
                return hit;
            }
            let hit = folder_exists(folder);
            known.insert(folder.to_string(), hit);
            hit
        };

        for (i, rule) in rules.iter().enumerate() {
            if rule.source != open_folder || rule.dest == rule.source {
                debug!("Rule {} does not apply to '{}'", i, open_folder);
                continue;
            }
            if !exists(&rule.dest) || !exists(&rule.source) {
                debug!("Rule {} skipped; '{}' or '{}' is missing", i, rule.source, rule.dest);
                continue;
            }
            index.insert(&rule.field, &rule.search, Template::from(rule));
        }

        debug!("Built rule index with {} active entries for '{}'", index.len(), open_folder);
        index
    }

    fn insert(&mut self, field: &MatchField, search: &str, template: Template) {
        let entries = self.fields.entry(field.key()).or_default();
        match entries.iter_mut().find(|e| e.search == search) {
            Some(existing) => existing.template = template,
            None => entries.push(IndexEntry {
                search: search.to_string(),
                template,
            }),
        }
    }

    /// Entries for `field`, in insertion order.
    pub fn entries(&self, field: &MatchField) -> &[IndexEntry] {
        self.fields.get(&field.key()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
