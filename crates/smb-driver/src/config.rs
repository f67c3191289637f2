//! Option rules: which names a deployment requires, allows and defaults.

use crate::options::{is_read_only_alias, OptionSet, OptionValue, RawOptions, READ_ONLY_ALIASES};
use smb_error::{ConfigError, DriverError, DriverResult};
use std::collections::{BTreeMap, BTreeSet};

/// Names supplied positionally that callers may not set through options.
pub const RESERVED_OPTIONS: &[&str] = &["source"];

/// Validation rules plus the options merged for one request.
///
/// Load the rules once at startup with [`MountConfig::read_conf`] and keep
/// that value as a template. Each request clones the template and calls
/// [`MountConfig::set_entries`] on the clone, so merged options never become
/// visible to another request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountConfig {
    required: BTreeSet<String>,
    allowed: BTreeSet<String>,
    defaults: BTreeMap<String, OptionValue>,
    options: OptionSet,
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_defaults(list: &str) -> Result<BTreeMap<String, OptionValue>, ConfigError> {
    let mut defaults = BTreeMap::new();
    for item in split_list(list) {
        let (name, value) = item
            .split_once(':')
            .or_else(|| item.split_once('='))
            .ok_or_else(|| ConfigError::MalformedDefault(item.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::MalformedDefault(item.to_string()));
        }
        defaults.insert(name.to_string(), OptionValue::parse_default(value.trim()));
    }
    Ok(defaults)
}

impl MountConfig {
    /// Build rules from three comma-separated lists.
    ///
    /// `defaults` holds `name:value` pairs (`name=value` is accepted too).
    /// A name may be both allowed and defaulted, but not both required and
    /// defaulted. [`RESERVED_OPTIONS`] may be neither required nor defaulted.
    pub fn read_conf(required: &str, allowed: &str, defaults: &str) -> Result<Self, ConfigError> {
        let required: BTreeSet<String> = split_list(required).map(String::from).collect();
        let allowed: BTreeSet<String> = split_list(allowed).map(String::from).collect();
        let defaults = parse_defaults(defaults)?;

        let reserved: BTreeSet<String> = required
            .iter()
            .chain(defaults.keys())
            .filter(|name| RESERVED_OPTIONS.contains(&name.as_str()))
            .cloned()
            .collect();
        if !reserved.is_empty() {
            return Err(ConfigError::ReservedInRules(reserved.into_iter().collect()));
        }

        let conflicting: Vec<String> = required
            .iter()
            .filter(|name| defaults.contains_key(*name))
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            return Err(ConfigError::RequiredHasDefault(conflicting));
        }

        log::debug!(
            "mount rules: required=[{}] allowed=[{}] defaulted=[{}]",
            required.iter().cloned().collect::<Vec<_>>().join(","),
            allowed.iter().cloned().collect::<Vec<_>>().join(","),
            defaults.keys().cloned().collect::<Vec<_>>().join(","),
        );

        Ok(Self {
            required,
            allowed,
            defaults,
            options: OptionSet::default(),
        })
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn allowed(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub fn defaults(&self) -> &BTreeMap<String, OptionValue> {
        &self.defaults
    }

    /// Options merged by the last successful [`MountConfig::set_entries`].
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    fn in_vocabulary(&self, name: &str) -> bool {
        self.required.contains(name) || self.allowed.contains(name) || self.defaults.contains_key(name)
    }

    fn permits(&self, name: &str) -> bool {
        if is_read_only_alias(name) {
            return READ_ONLY_ALIASES.iter().any(|alias| self.in_vocabulary(alias));
        }
        self.in_vocabulary(name)
    }

    /// Validate `raw` against the rules and merge in defaults.
    ///
    /// Order: reserved names, then defaults, then required names, then the
    /// vocabulary. Caller values always win over defaults.
    pub fn set_entries(&mut self, raw: &RawOptions, reserved: &[&str]) -> DriverResult<()> {
        let overridden: Vec<String> = raw
            .keys()
            .filter(|name| reserved.contains(&name.as_str()))
            .cloned()
            .collect();
        if !overridden.is_empty() {
            return Err(DriverError::ReservedOptionOverride(overridden));
        }

        let mut options = OptionSet::normalize(raw);
        for (name, value) in &self.defaults {
            if !reserved.contains(&name.as_str()) {
                options.insert_default(name, value);
            }
        }

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !options.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(DriverError::MissingOptions(missing));
        }

        let disallowed: BTreeSet<String> = options
            .names()
            .filter(|name| !self.permits(name))
            .map(String::from)
            .collect();
        if !disallowed.is_empty() {
            return Err(DriverError::DisallowedOptions(disallowed.into_iter().collect()));
        }

        self.options = options;
        Ok(())
    }
}
