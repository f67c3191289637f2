//! Mount option values and the normalized per-request option set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Names that all mean "mount read-only".
pub const READ_ONLY_ALIASES: [&str; 2] = ["readonly", "ro"];

/// Option names whose values must never reach a log line or error message.
pub const CREDENTIAL_OPTIONS: [&str; 2] = ["username", "password"];

pub fn is_read_only_alias(name: &str) -> bool {
    READ_ONLY_ALIASES.contains(&name)
}

/// A single option value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(n) => *n != 0,
            OptionValue::Str(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1"
            }
        }
    }

    /// Interpret a static default from the rules list.
    ///
    /// Only `true`/`false` are typed; anything else stays a string so values
    /// such as `0777` keep their exact spelling.
    pub fn parse_default(raw: &str) -> Self {
        match raw {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            other => OptionValue::Str(other.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

/// Options exactly as the caller supplied them.
pub type RawOptions = BTreeMap<String, OptionValue>;

/// Options after the `readonly`/`ro` aliases are folded into one flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: BTreeMap<String, OptionValue>,
    read_only: bool,
    /// Which read-only aliases were present, for vocabulary checks.
    read_only_keys: BTreeSet<String>,
}

impl OptionSet {
    pub fn normalize(raw: &RawOptions) -> Self {
        let mut set = Self::default();
        for (name, value) in raw {
            set.insert(name, value.clone());
        }
        set
    }

    fn insert(&mut self, name: &str, value: OptionValue) {
        if is_read_only_alias(name) {
            self.read_only |= value.is_truthy();
            self.read_only_keys.insert(name.to_string());
        } else {
            self.entries.insert(name.to_string(), value);
        }
    }

    /// Add `value` under `name` unless the caller already supplied it.
    ///
    /// Either read-only alias counts as supplying both. Returns whether the
    /// default was applied.
    pub fn insert_default(&mut self, name: &str, value: &OptionValue) -> bool {
        if self.contains(name) {
            return false;
        }
        self.insert(name, value.clone());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        if is_read_only_alias(name) {
            !self.read_only_keys.is_empty()
        } else {
            self.entries.contains_key(name)
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    /// Value of `name` rendered as a command-line string.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Non-alias options in ascending name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every supplied name, aliases included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .chain(self.read_only_keys.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.read_only_keys.is_empty()
    }

    /// Credential values to scrub from anything logged or returned.
    pub fn credentials(&self) -> Vec<String> {
        CREDENTIAL_OPTIONS
            .iter()
            .filter_map(|name| self.get_string(name))
            .filter(|value| !value.is_empty())
            .collect()
    }
}
