// src/message.rs

use log::debug;
use mailparse::parse_headers;
use std::collections::HashMap;

use crate::cfg::rule::MatchField;

/// One listed message. Header values are kept raw (undecoded).
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub uid: u32,
    pub seen: bool,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub subject: String,
    /// Every header, keyed by lower-cased name.
    pub others: HashMap<String, String>,
}

impl Message {
    /// Build from a fetched RFC 2822 header block and the message's flags.
    pub fn new(uid: u32, raw_headers: &[u8], flags: &[String]) -> Self {
        let seen = flags.iter().any(|f| f.trim_start_matches('\\').eq_ignore_ascii_case("seen"));
        let mut msg = Message {
            uid,
            seen,
            ..Default::default()
        };

        match parse_headers(raw_headers) {
            Ok((headers, _)) => {
                for h in headers {
                    let value = String::from_utf8_lossy(h.get_value_raw()).trim().to_string();
                    msg = msg.with_header(&h.get_key(), &value);
                }
            }
            Err(e) => debug!("Unparseable header block for UID {}: {}", uid, e),
        }
        msg
    }

    pub fn with_seen(mut self, seen: bool) -> Self {
        self.seen = seen;
        self
    }

    /// Set a header; the first occurrence of a name wins.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let key = name.trim().to_ascii_lowercase();
        if self.others.contains_key(&key) {
            return self;
        }
        match MatchField::new(&key) {
            MatchField::From => self.from = value.to_string(),
            MatchField::To => self.to = value.to_string(),
            MatchField::Cc => self.cc = value.to_string(),
            MatchField::Subject => self.subject = value.to_string(),
            MatchField::Header(_) => {}
        }
        self.others.insert(key, value.to_string());
        self
    }

    /// Raw value of `field`, or "" when the message lacks it.
    pub fn field_value(&self, field: &MatchField) -> &str {
        match field {
            MatchField::From => &self.from,
            MatchField::To => &self.to,
            MatchField::Cc => &self.cc,
            MatchField::Subject => &self.subject,
            MatchField::Header(_) => self.others.get(&field.key()).map(String::as_str).unwrap_or(""),
        }
    }
}
