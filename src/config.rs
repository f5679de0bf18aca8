//! Launcher configuration files.
//!
//! The packager writes an INI-style `.cfg` file next to the launcher:
//!
//! ```text
//! [Application]
//! app.name=Hello
//! app.identifier=com.example.hello
//!
//! [JVMUserOptions]
//! -Xmx=512m
//! -XX:+UseG1GC=
//! ```
//!
//! `[JVMUserOptions]` holds the default mapping. The user's changes are kept
//! in a separate file, `jvmuserargs.cfg`, under `[JVMUserOverrides]`.
//!
//! Entries split at the first `=`; the key is trimmed, the value is kept
//! verbatim. A line without `=` is a key with an empty value.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::{OptionMap, UserJvmOptions};

pub const APPLICATION_SECTION: &str = "Application";
pub const JVM_USER_OPTIONS_SECTION: &str = "JVMUserOptions";
pub const JVM_USER_OVERRIDES_SECTION: &str = "JVMUserOverrides";
pub const APP_IDENTIFIER_KEY: &str = "app.identifier";
pub const OVERRIDES_FILE_NAME: &str = "jvmuserargs.cfg";

/// Path of the packaged application's `.cfg` file.
pub const APP_CONFIG_ENV: &str = "USER_JVM_OPTIONS_APP_CONFIG";
/// Explicit path of the user overrides file.
pub const OVERRIDES_ENV: &str = "USER_JVM_OPTIONS_OVERRIDES";
/// `env_logger` filter for the native library.
pub const LOG_ENV: &str = "USER_JVM_OPTIONS_LOG";

/// A parsed INI-style config file. Sections and entries keep file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    sections: IndexMap<String, OptionMap>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses config text. Entries before the first header land in the
    /// unnamed section `""`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut config = ConfigFile::new();
        let mut current = String::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_start();
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| Error::Parse {
                        path: PathBuf::from("<input>"),
                        line: index + 1,
                        message: format!("malformed section header {trimmed:?}"),
                    })?;
                current = name.to_owned();
                config.sections.entry(current.clone()).or_default();
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value),
                None => (trimmed, ""),
            };
            if key.is_empty() {
                return Err(Error::Parse {
                    path: PathBuf::from("<input>"),
                    line: index + 1,
                    message: "entry has an empty key".into(),
                });
            }
            config
                .sections
                .entry(current.clone())
                .or_default()
                .insert(key, value);
        }

        Ok(config)
    }

    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_file(path, &text)
    }

    fn parse_file(path: &Path, text: &str) -> Result<Self> {
        Self::parse(text).map_err(|err| match err {
            Error::Parse { line, message, .. } => Error::Parse {
                path: path.to_path_buf(),
                line,
                message,
            },
            other => other,
        })
    }

    pub fn section(&self, name: &str) -> Option<&OptionMap> {
        self.sections.get(name)
    }

    pub fn set_section(&mut self, name: impl Into<String>, entries: OptionMap) {
        self.sections.insert(name.into(), entries);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The unnamed section has no header, so it must come first.
        let mut first = true;
        if let Some(entries) = self.sections.get("") {
            write_entries(f, entries)?;
            first = false;
        }
        for (name, entries) in self.sections.iter().filter(|(name, _)| !name.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "[{name}]")?;
            write_entries(f, entries)?;
        }
        Ok(())
    }
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &OptionMap) -> fmt::Result {
    for (key, value) in entries.iter() {
        writeln!(f, "{key}={value}")?;
    }
    Ok(())
}

/// Reads the overrides saved in `path`. A missing file means no overrides.
pub fn load_overrides(path: &Path) -> Result<OptionMap> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no overrides file at {}", path.display());
            return Ok(OptionMap::new());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let overrides = ConfigFile::parse_file(path, &text)?
        .section(JVM_USER_OVERRIDES_SECTION)
        .cloned()
        .unwrap_or_default();
    debug!("loaded {} override(s) from {}", overrides.len(), path.display());
    Ok(overrides)
}

/// Writes `overrides` to `path`, replacing the file in one rename.
pub fn save_overrides(path: &Path, overrides: &OptionMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = ConfigFile::new();
    file.set_section(JVM_USER_OVERRIDES_SECTION, overrides.clone());

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, file.to_string()).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::io(path, e)
    })
}

/// The per-user overrides location for an application:
/// `<config dir>/<app.identifier>/packager/jvmuserargs.cfg`.
///
/// Returns `None` when the application has no usable identifier or the
/// platform has no config directory.
pub fn default_overrides_path(app: &ConfigFile) -> Option<PathBuf> {
    let id = app.get(APPLICATION_SECTION, APP_IDENTIFIER_KEY)?.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        warn!("ignoring unusable {APP_IDENTIFIER_KEY} {id:?}");
        return None;
    }
    Some(dirs::config_dir()?.join(id).join("packager").join(OVERRIDES_FILE_NAME))
}

/// Where the launcher's option files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// The packaged application's `.cfg` file.
    pub app_config: PathBuf,
    /// Explicit overrides file. When `None`, [`default_overrides_path`] is used.
    pub overrides_file: Option<PathBuf>,
}

impl LauncherConfig {
    pub fn new(app_config: impl Into<PathBuf>) -> Self {
        LauncherConfig {
            app_config: app_config.into(),
            overrides_file: None,
        }
    }

    pub fn with_overrides_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.overrides_file = Some(path.into());
        self
    }

    /// Builds the configuration from `USER_JVM_OPTIONS_APP_CONFIG` and
    /// `USER_JVM_OPTIONS_OVERRIDES`.
    pub fn from_env() -> Result<Self> {
        let app_config = std::env::var_os(APP_CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{APP_CONFIG_ENV} is not set")))?;
        let mut config = LauncherConfig::new(app_config);
        if let Some(path) = std::env::var_os(OVERRIDES_ENV).filter(|v| !v.is_empty()) {
            config = config.with_overrides_file(path);
        }
        Ok(config)
    }

    /// Loads defaults and saved overrides into a store that persists later
    /// changes to the overrides file.
    pub fn load(&self) -> Result<UserJvmOptions> {
        let app = ConfigFile::load(&self.app_config)?;
        let defaults = app.section(JVM_USER_OPTIONS_SECTION).cloned().unwrap_or_default();

        let overrides_file = self
            .overrides_file
            .clone()
            .or_else(|| default_overrides_path(&app));

        let store = match overrides_file {
            Some(path) => {
                let overrides = load_overrides(&path)?;
                UserJvmOptions::with_overrides(defaults, overrides).persist_to(path)
            }
            None => {
                warn!("no overrides location for {}; changes stay in memory", self.app_config.display());
                UserJvmOptions::new(defaults)
            }
        };

        info!(
            "loaded {} default JVM user option(s) from {}",
            store.defaults().len(),
            self.app_config.display()
        );
        Ok(store)
    }
}
