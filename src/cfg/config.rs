// src/cfg/config.rs

use eyre::{eyre, Result};
use log::{debug, error};
use secure_string::SecureString;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::matcher::HeaderMatcher;

pub const DEFAULT_SPAM_HEADER: &str = "X-Spam-Flag";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "imap-domain")]
    pub imap_domain: Option<String>,

    #[serde(alias = "imap-username")]
    pub imap_username: Option<String>,

    #[serde(alias = "imap-password", deserialize_with = "deserialize_opt_secure")]
    pub imap_password: Option<SecureString>,

    /// Install the spam-forwarding rule pair at login.
    #[serde(alias = "auto-add-spam-filter-rule")]
    pub auto_add_spam_filter_rule: bool,

    #[serde(alias = "spam-subject")]
    pub spam_subject: String,

    #[serde(alias = "case-insensitive-search")]
    pub case_insensitive_search: bool,

    /// Retry a failed match against the base64-decoded header value.
    #[serde(alias = "decode-base64-msg")]
    pub decode_base64_msg: bool,

    /// Extra headers rules may match on, evaluated after from/to/cc/subject.
    #[serde(alias = "spam-headers", deserialize_with = "deserialize_header_names")]
    pub spam_headers: Vec<String>,

    #[serde(alias = "spam-flag-header")]
    pub spam_flag_header: String,

    #[serde(alias = "junk-folder")]
    pub junk_folder: Option<String>,

    #[serde(alias = "rules-path")]
    pub rules_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            imap_domain: None,
            imap_username: None,
            imap_password: None,
            auto_add_spam_filter_rule: true,
            spam_subject: "[SPAM]".to_string(),
            case_insensitive_search: true,
            decode_base64_msg: false,
            spam_headers: vec![DEFAULT_SPAM_HEADER.to_string()],
            spam_flag_header: DEFAULT_SPAM_HEADER.to_string(),
            junk_folder: None,
            rules_path: None,
        }
    }
}

impl Config {
    pub fn matcher(&self) -> HeaderMatcher {
        HeaderMatcher::new(self.case_insensitive_search, self.decode_base64_msg)
    }

    /// Configured rule file, else `<data dir>/imap-triage/rules.json`.
    pub fn rules_path(&self) -> PathBuf {
        self.rules_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("imap-triage")
                .join("rules.json")
        })
    }

    /// Junk folder for the spam bootstrap; blank counts as unset.
    pub fn junk_folder(&self) -> Option<&str> {
        self.junk_folder.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    debug!("Loading configuration from {:?}", config_path);

    if !config_path.exists() {
        debug!("No config at {}; using defaults", config_path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        error!("Failed to read config file {}: {}", config_path.display(), e);
        eyre!("Failed to read config file {}: {}", config_path.display(), e)
    })?;

    let cfg: Config = serde_yaml::from_str(&content).map_err(|e| {
        error!("Failed to parse YAML: {}", e);
        eyre!("Failed to parse YAML: {}", e)
    })?;

    debug!("Successfully loaded configuration");
    Ok(cfg)
}

fn deserialize_opt_secure<'de, D>(deserializer: D) -> Result<Option<SecureString>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(SecureString::from))
}

/// `spam-headers: X-Spam-Flag` or `spam-headers: [X-Spam-Flag, X-Spam-Status]`.
fn deserialize_header_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer).map_err(de::Error::custom)?;
    match v {
        Value::Null => Ok(vec![]),
        Value::String(s) => Ok(vec![s.trim().to_string()]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|val| {
                if let Value::String(s) = val {
                    Ok(s.trim().to_string())
                } else {
                    Err(de::Error::custom("Invalid header name entry"))
                }
            })
            .collect(),
        _ => Err(de::Error::custom("Invalid `spam-headers` value")),
    }
}
