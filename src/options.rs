//! The user JVM option store.
//!
//! Two mappings are kept apart:
//!
//! - the *default* mapping, read from the packaged application's config and
//!   never modified at runtime;
//! - the user's *overrides*, the entries whose value differs from the
//!   default (or that have no default at all).
//!
//! The *current* mapping is the defaults overlaid with the overrides. This is
//! what the launcher turns into JVM arguments, and what
//! [`OptionBridge::current_value`] and [`OptionBridge::current_keys`] report.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::config;
use crate::error::{Error, Result};

/// An ordered key/value map with unique keys.
///
/// Iteration follows first-insertion order; re-inserting an existing key
/// replaces its value in place. Two maps are equal only if they hold the
/// same entries in the same order.
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    entries: IndexMap<String, String>,
}

impl PartialEq for OptionMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for OptionMap {}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key` while keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Checks that `key` can be stored and written back to a config file.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("option key is empty".into()));
    }
    if key.trim() != key {
        return Err(Error::InvalidArgument(format!(
            "option key {key:?} has surrounding whitespace"
        )));
    }
    if key.contains(['=', '\r', '\n']) {
        return Err(Error::InvalidArgument(format!(
            "option key {key:?} contains '=' or a line break"
        )));
    }
    if key.starts_with(['[', '#', ';']) {
        return Err(Error::InvalidArgument(format!(
            "option key {key:?} starts with a config-file delimiter"
        )));
    }
    Ok(())
}

/// Checks that `value` fits on a single config line.
pub fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(Error::InvalidArgument(format!(
            "value for option {key:?} contains a line break"
        )));
    }
    Ok(())
}

/// The five operations the managed `LauncherUserJvmOptions` class calls.
///
/// Implementations must be `Send + Sync`: the JVM may call from any thread.
/// Reads return owned data so that no lock outlives a call.
pub trait OptionBridge: Send + Sync {
    /// Default value for `key`, or `None` if the key has no default.
    fn default_value(&self, key: &str) -> Option<String>;

    /// All keys with a default, in declaration order.
    fn default_keys(&self) -> Vec<String>;

    /// Current (possibly user-overridden) value for `key`.
    fn current_value(&self, key: &str) -> Option<String>;

    /// All keys of the current mapping.
    fn current_keys(&self) -> Vec<String>;

    /// Upserts each `(key, value)` pair into the current mapping.
    ///
    /// The batch is applied as one step: if any pair is rejected, or the
    /// change cannot be saved, nothing changes.
    fn set_options(&self, pairs: &[(String, String)]) -> Result<()>;

    /// Paired-array form of [`set_options`](Self::set_options): `keys[i]`
    /// gets `values[i]`. Sequences of different length are rejected.
    fn set_keys_and_values(&self, keys: &[String], values: &[String]) -> Result<()> {
        if keys.len() != values.len() {
            warn!("rejecting {} keys with {} values", keys.len(), values.len());
            return Err(Error::LengthMismatch { keys: keys.len(), values: values.len() });
        }
        let pairs: Vec<(String, String)> = keys.iter().cloned().zip(values.iter().cloned()).collect();
        self.set_options(&pairs)
    }
}

impl<T: OptionBridge + ?Sized> OptionBridge for Arc<T> {
    fn default_value(&self, key: &str) -> Option<String> {
        (**self).default_value(key)
    }

    fn default_keys(&self) -> Vec<String> {
        (**self).default_keys()
    }

    fn current_value(&self, key: &str) -> Option<String> {
        (**self).current_value(key)
    }

    fn current_keys(&self) -> Vec<String> {
        (**self).current_keys()
    }

    fn set_options(&self, pairs: &[(String, String)]) -> Result<()> {
        (**self).set_options(pairs)
    }

    fn set_keys_and_values(&self, keys: &[String], values: &[String]) -> Result<()> {
        (**self).set_keys_and_values(keys, values)
    }
}

/// Default options plus the user's overrides, optionally persisted to an
/// overrides file after every successful change.
#[derive(Debug)]
pub struct UserJvmOptions {
    defaults: OptionMap,
    overrides: RwLock<OptionMap>,
    overrides_file: Option<PathBuf>,
}

impl UserJvmOptions {
    /// A store with no overrides that only lives in memory.
    pub fn new(defaults: OptionMap) -> Self {
        Self::with_overrides(defaults, OptionMap::new())
    }

    /// A store starting from previously saved overrides. Overrides that
    /// match their default are dropped.
    pub fn with_overrides(defaults: OptionMap, overrides: OptionMap) -> Self {
        let overrides: OptionMap = overrides
            .iter()
            .filter(|(k, v)| defaults.get(k) != Some(*v))
            .collect();
        UserJvmOptions {
            defaults,
            overrides: RwLock::new(overrides),
            overrides_file: None,
        }
    }

    /// Saves the overrides to `path` after each change.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.overrides_file = Some(path.into());
        self
    }

    pub fn overrides_file(&self) -> Option<&Path> {
        self.overrides_file.as_deref()
    }

    pub fn defaults(&self) -> &OptionMap {
        &self.defaults
    }

    /// Snapshot of the entries that differ from the defaults.
    pub fn overrides(&self) -> OptionMap {
        self.read().clone()
    }

    /// Snapshot of the current mapping: default keys first, then keys only
    /// present as overrides.
    pub fn current(&self) -> OptionMap {
        let overrides = self.read();
        let mut current = self.defaults.clone();
        for (key, value) in overrides.iter() {
            current.insert(key, value);
        }
        current
    }

    /// The current mapping as JVM launch arguments, `key` immediately
    /// followed by `value` (`-Xmx` + `512m` gives `-Xmx512m`).
    ///
    /// Leading whitespace of a value is skipped here only, so a `.cfg` line
    /// such as `-Xss = 1m` still renders as `-Xss1m` while the stored value
    /// stays verbatim.
    pub fn jvm_args(&self) -> Vec<String> {
        self.current()
            .iter()
            .map(|(key, value)| format!("{key}{}", value.trim_start()))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, OptionMap> {
        self.overrides.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OptionMap> {
        self.overrides.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OptionBridge for UserJvmOptions {
    fn default_value(&self, key: &str) -> Option<String> {
        self.defaults.get(key).map(str::to_owned)
    }

    fn default_keys(&self) -> Vec<String> {
        self.defaults.keys().map(str::to_owned).collect()
    }

    fn current_value(&self, key: &str) -> Option<String> {
        if let Some(value) = self.read().get(key) {
            return Some(value.to_owned());
        }
        self.default_value(key)
    }

    fn current_keys(&self) -> Vec<String> {
        self.current().keys().map(str::to_owned).collect()
    }

    fn set_options(&self, pairs: &[(String, String)]) -> Result<()> {
        for (key, value) in pairs {
            validate_key(key)?;
            validate_value(key, value)?;
        }

        // Held across save and swap so concurrent batches serialize.
        let mut overrides = self.write();
        let mut next = overrides.clone();
        for (key, value) in pairs {
            if self.defaults.get(key) == Some(value.as_str()) {
                next.remove(key);
            } else {
                next.insert(key.as_str(), value.as_str());
            }
        }

        if next == *overrides {
            debug!("set of {} option(s) left overrides unchanged", pairs.len());
            return Ok(());
        }

        if let Some(path) = &self.overrides_file {
            config::save_overrides(path, &next)?;
            info!("saved {} user JVM override(s) to {}", next.len(), path.display());
        }
        *overrides = next;
        debug!("applied {} option(s)", pairs.len());
        Ok(())
    }
}
