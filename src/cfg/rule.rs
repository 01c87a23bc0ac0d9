// src/cfg/rule.rs

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, TriageError};

/// Header a rule searches.
///
/// The four first-class fields are recognised case-insensitively; anything
/// else names a custom header (e.g. `X-Spam-Flag`) and keeps its spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchField {
    From,
    To,
    Cc,
    Subject,
    Header(String),
}

impl MatchField {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "from" => MatchField::From,
            "to" => MatchField::To,
            "cc" => MatchField::Cc,
            "subject" => MatchField::Subject,
            _ => MatchField::Header(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MatchField::From => "from",
            MatchField::To => "to",
            MatchField::Cc => "cc",
            MatchField::Subject => "subject",
            MatchField::Header(name) => name,
        }
    }

    /// Lookup key; header names compare without regard to ASCII case.
    pub fn key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    pub fn label(&self) -> &str {
        match self {
            MatchField::From => "From",
            MatchField::To => "To",
            MatchField::Cc => "Cc",
            MatchField::Subject => "Subject",
            MatchField::Header(name) => name,
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchField {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(TriageError::Validation("match field must not be empty".into()));
        }
        Ok(MatchField::new(s))
    }
}

impl Serialize for MatchField {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchField {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(MatchField::new(&raw))
    }
}

/// Which messages a rule may act on, by current seen-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageScope {
    #[default]
    All,
    Unread,
    #[serde(alias = "isread")]
    Read,
}

serde_plain::derive_fromstr_from_deserialize!(MessageScope);
serde_plain::derive_display_from_serialize!(MessageScope);

impl MessageScope {
    /// True when a message with the given seen-state may be acted on.
    pub fn admits(&self, seen: bool) -> bool {
        match self {
            MessageScope::All => true,
            MessageScope::Unread => !seen,
            MessageScope::Read => seen,
        }
    }
}

/// Read-state change applied to a matched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkAction {
    #[default]
    None,
    MarkRead,
    MarkUnread,
}

serde_plain::derive_fromstr_from_deserialize!(MarkAction);
serde_plain::derive_display_from_serialize!(MarkAction);

/// A stored filter rule. Identified only by its position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(alias = "whatfilter")]
    pub field: MatchField,

    /// Kept raw; any escaping belongs to the serializer.
    #[serde(alias = "searchstring")]
    pub search: String,

    #[serde(alias = "srcfolder")]
    pub source: String,

    #[serde(alias = "destfolder")]
    pub dest: String,

    #[serde(default, alias = "messages")]
    pub scope: MessageScope,

    #[serde(default, alias = "markread", deserialize_with = "deserialize_mark")]
    pub mark: MarkAction,

    #[serde(default, alias = "filterpriority", deserialize_with = "deserialize_priority")]
    pub priority: bool,
}

impl Rule {
    pub fn new(field: MatchField, search: &str, source: &str, dest: &str) -> Self {
        Rule {
            field,
            search: search.to_string(),
            source: source.to_string(),
            dest: dest.to_string(),
            scope: MessageScope::All,
            mark: MarkAction::None,
            priority: false,
        }
    }

    pub fn with_scope(mut self, scope: MessageScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_mark(mut self, mark: MarkAction) -> Self {
        self.mark = mark;
        self
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Trim user input and reject what can never match.
    pub fn normalized(mut self) -> Result<Self> {
        self.search = self.search.trim().to_string();
        self.source = self.source.trim().to_string();
        self.dest = self.dest.trim().to_string();
        self.field = MatchField::new(self.field.as_str());

        if self.search.is_empty() {
            return Err(TriageError::Validation("search text must not be empty".into()));
        }
        if self.field.as_str().is_empty() {
            return Err(TriageError::Validation("match field must not be empty".into()));
        }
        if self.source.is_empty() || self.dest.is_empty() {
            return Err(TriageError::Validation("source and destination folders are required".into()));
        }
        Ok(self)
    }

    /// One-line human-readable description.
    pub fn describe(&self) -> String {
        format!(
            "If {} contains \"{}\" move from {} to {} (messages: {}, mark: {})",
            self.field.label(),
            self.search,
            self.source,
            self.dest,
            self.scope,
            self.mark,
        )
    }
}

/// Older blobs stored an empty string for "no mark".
fn deserialize_mark<'de, D>(deserializer: D) -> std::result::Result<MarkAction, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer).map_err(de::Error::custom)?;
    match v {
        Value::Null => Ok(MarkAction::None),
        Value::String(s) if s.trim().is_empty() => Ok(MarkAction::None),
        Value::String(s) => serde_plain::from_str(s.trim()).map_err(de::Error::custom),
        _ => Err(de::Error::custom("Invalid `mark` value")),
    }
}

/// Accepts booleans as well as the checkbox forms `"on"`, `"1"` and `""`.
fn deserialize_priority<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer).map_err(de::Error::custom)?;
    match v {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().map(|i| i != 0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "off" | "false" => Ok(false),
            "1" | "on" | "true" => Ok(true),
            other => Err(de::Error::custom(format!("Invalid `priority` value '{}'", other))),
        },
        _ => Err(de::Error::custom("Invalid `priority` value")),
    }
}
