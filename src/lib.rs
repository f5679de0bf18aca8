//! # user-jvm-options
//!
//! Native side of a packaged application's *user JVM options*: the JVM
//! flags a user may change without touching the launcher.
//!
//! The crate builds as a `cdylib` exporting the natives of
//! `jdk.packager.services.userjvmoptions.LauncherUserJvmOptions`, and as an
//! `rlib` exposing the same operations to Rust launchers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        LauncherUserJvmOptions (managed caller)           │
//! ├─────────────────────────────────────────────────────────┤
//! │                 JNI natives (bridge)                     │
//! │   Java_..._1getUserJvmOptionDefaultValue, ...            │
//! │   install_bridge, register_natives, JNI_OnLoad           │
//! ├─────────────────────────────────────────────────────────┤
//! │        Option store (options) + files (config)           │
//! │   OptionBridge trait, UserJvmOptions, LauncherConfig     │
//! ├─────────────────────────────────────────────────────────┤
//! │        JNI wrapper (env) and raw bindings (sys)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`options`] | Default/override mappings and the [`OptionBridge`] operations |
//! | [`config`] | `.cfg` parsing, overrides file, [`LauncherConfig`] |
//! | [`bridge`] | Exported JNI natives and marshaling |
//! | [`env`] | Safe [`env::JniEnv`] wrapper |
//! | [`mutf8`] | JNI modified UTF-8 codec |
//! | [`sys::jni`] | Raw JNI types and function table |
//!
//! ## Using the store from Rust
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use user_jvm_options::prelude::*;
//!
//! let store = Arc::new(LauncherConfig::new("app/Hello.cfg").load()?);
//! install_bridge(Box::new(store.clone()))?;
//!
//! // ... create the JVM, then:
//! let args = store.jvm_args(); // e.g. ["-Xmx512m", "-XX:+UseG1GC"]
//! ```
//!
//! ## Loading from the JVM
//!
//! When the managed class loads the library itself, nothing needs to be
//! installed up front. The first native call loads the store from
//! `USER_JVM_OPTIONS_APP_CONFIG` (and optionally `USER_JVM_OPTIONS_OVERRIDES`).
//! `USER_JVM_OPTIONS_LOG` sets the log filter (default `warn`).

pub mod sys;
pub mod env;
pub mod error;
pub mod mutf8;
pub mod options;
pub mod config;
pub mod bridge;
pub mod prelude;

// Implementation module (use `env` module for the public API)
#[doc(hidden)]
pub mod jni_wrapper;

pub use crate::bridge::{install_bridge, register_natives};
pub use crate::config::LauncherConfig;
pub use crate::error::{Error, Result};
pub use crate::options::{OptionBridge, OptionMap, UserJvmOptions};

/// Installs `env_logger` writing to stderr, filtered by
/// `USER_JVM_OPTIONS_LOG` (default `warn`).
///
/// Does nothing if the host process already installed a logger.
pub fn init_logging() {
    let env = env_logger::Env::default().filter_or(config::LOG_ENV, "warn");
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init();
}
