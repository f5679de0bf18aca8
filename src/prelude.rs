//! Common imports for launchers using the option store.
//!
//! This prelude is intentionally small. It covers the types and helpers most
//! launchers use while avoiding over-broad re-exports.

pub use crate::bridge::{install_bridge, register_natives};
pub use crate::config::{ConfigFile, LauncherConfig};
pub use crate::env::{JniEnv, LocalRef};
pub use crate::error::{Error, Result};
pub use crate::options::{OptionBridge, OptionMap, UserJvmOptions};
pub use crate::sys::jni;
