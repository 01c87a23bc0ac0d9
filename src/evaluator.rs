// src/evaluator.rs

use log::debug;

use crate::cfg::rule::{MarkAction, MatchField};
use crate::index::{ActiveRuleIndex, Template};
use crate::matcher::HeaderMatcher;
use crate::message::Message;

/// The action computed for one message in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub dest: String,
    pub mark: MarkAction,
}

/// Matches messages against an [`ActiveRuleIndex`].
pub struct FilterEvaluator<'a> {
    index: &'a ActiveRuleIndex,
    matcher: HeaderMatcher,
    open_folder: &'a str,
    candidates: Vec<MatchField>,
}

impl<'a> FilterEvaluator<'a> {
    /// `extra_headers` are searched after from, to, cc and subject, in order.
    pub fn new(
        index: &'a ActiveRuleIndex,
        matcher: HeaderMatcher,
        open_folder: &'a str,
        extra_headers: &[String],
    ) -> Self {
        let mut candidates = vec![MatchField::From, MatchField::To, MatchField::Cc, MatchField::Subject];
        candidates.extend(extra_headers.iter().map(|h| MatchField::new(h)));
        FilterEvaluator {
            index,
            matcher,
            open_folder,
            candidates,
        }
    }

    /// Walk fields in precedence order; the first match wins unless a
    /// priority rule matches, which wins outright and ends the scan.
    fn winner(&self, msg: &Message) -> Option<&'a Template> {
        let index: &'a ActiveRuleIndex = self.index;
        let mut winner: Option<&'a Template> = None;

        for field in &self.candidates {
            let entries = index.entries(field);
            if entries.is_empty() {
                continue;
            }
            let value = msg.field_value(field);
            for entry in entries {
                if entry.template.dest == self.open_folder || !self.matcher.matches(value, &entry.search) {
                    continue;
                }
                debug!(
                    "UID {} matched {} contains \"{}\" -> {}",
                    msg.uid, field, entry.search, entry.template.dest
                );
                if entry.template.priority {
                    return Some(&entry.template);
                }
                if winner.is_none() {
                    winner = Some(&entry.template);
                }
            }
        }
        winner
    }

    /// Disposition for `msg`, or `None` when nothing applies.
    pub fn evaluate(&self, msg: &Message) -> Option<Disposition> {
        let template = self.winner(msg)?;
        if !template.scope.admits(msg.seen) {
            debug!(
                "UID {} matched but scope '{}' excludes seen={}",
                msg.uid, template.scope, msg.seen
            );
            return None;
        }
        Some(Disposition {
            dest: template.dest.clone(),
            mark: template.mark,
        })
    }
}
