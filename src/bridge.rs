//! JNI natives for `jdk.packager.services.userjvmoptions.LauncherUserJvmOptions`.
//!
//! The managed class declares:
//!
//! ```text
//! private static native String   _getUserJvmOptionDefaultValue(String key);
//! private static native String[] _getUserJvmOptionDefaultKeys();
//! private static native String   _getUserJvmOptionValue(String key);
//! private static native void     _setUserJvmKeysAndValues(String[] keys, String[] values);
//! private static native String[] _getUserJvmOptionKeys();
//! ```
//!
//! Each exported symbol marshals its arguments, calls the process-wide
//! [`OptionBridge`], and marshals the result back. Failures are raised as Java
//! exceptions: argument errors as `IllegalArgumentException`, everything else
//! as `IllegalStateException`. An unknown key yields Java `null`.
//!
//! The marshaling half of each native is public and takes the bridge
//! explicitly, so it can be driven with any `JniEnv` and store.

#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use log::{debug, error, warn};

use crate::config::LauncherConfig;
use crate::env::JniEnv;
use crate::error::{Error, Result};
use crate::options::OptionBridge;
use crate::sys::jni;

/// Binary name of the managed class whose natives live here.
pub const CLASS_NAME: &str = "jdk/packager/services/userjvmoptions/LauncherUserJvmOptions";

static BRIDGE: OnceLock<Box<dyn OptionBridge>> = OnceLock::new();

/// Installs the store every native call goes through.
///
/// Must happen before the managed class first calls in; otherwise the
/// store is loaded from the environment (see [`LauncherConfig::from_env`]).
pub fn install_bridge(bridge: Box<dyn OptionBridge>) -> Result<()> {
    BRIDGE.set(bridge).map_err(|_| Error::AlreadyInstalled)
}

/// Returns the installed store, loading one from the environment on first use.
pub fn global_bridge() -> Result<&'static dyn OptionBridge> {
    if let Some(bridge) = BRIDGE.get() {
        return Ok(bridge.as_ref());
    }
    let store = LauncherConfig::from_env()?.load()?;
    // Losing a race to another loader (or to install_bridge) is fine.
    let _ = BRIDGE.set(Box::new(store));
    BRIDGE
        .get()
        .map(|bridge| bridge.as_ref())
        .ok_or_else(|| Error::Config("option bridge unavailable".into()))
}

// =============================================================================
// Marshaling
// =============================================================================

fn read_key(env: &JniEnv, key: jni::jstring) -> Result<String> {
    env.get_string_utf(key)?
        .ok_or_else(|| Error::InvalidArgument("option key is null".into()))
}

fn optional_string(env: &JniEnv, value: Option<String>) -> Result<jni::jstring> {
    match value {
        Some(value) => env.new_string_utf(&value),
        None => Ok(ptr::null_mut()),
    }
}

/// `_getUserJvmOptionDefaultValue`: default value or null.
pub fn get_default_value(env: &JniEnv, bridge: &dyn OptionBridge, key: jni::jstring) -> Result<jni::jstring> {
    let key = read_key(env, key)?;
    optional_string(env, bridge.default_value(&key))
}

/// `_getUserJvmOptionDefaultKeys`.
pub fn get_default_keys(env: &JniEnv, bridge: &dyn OptionBridge) -> Result<jni::jobjectArray> {
    env.new_string_array(&bridge.default_keys())
}

/// `_getUserJvmOptionValue`: current value or null.
pub fn get_current_value(env: &JniEnv, bridge: &dyn OptionBridge, key: jni::jstring) -> Result<jni::jstring> {
    let key = read_key(env, key)?;
    optional_string(env, bridge.current_value(&key))
}

/// `_setUserJvmKeysAndValues`.
///
/// Null arrays and null keys are rejected; a null value is stored as the
/// empty string.
pub fn set_keys_and_values(
    env: &JniEnv,
    bridge: &dyn OptionBridge,
    keys: jni::jobjectArray,
    values: jni::jobjectArray,
) -> Result<()> {
    let keys = env.get_string_array(keys)?;
    let values = env.get_string_array(values)?;
    if keys.len() != values.len() {
        return Err(Error::LengthMismatch { keys: keys.len(), values: values.len() });
    }

    let keys = keys
        .into_iter()
        .enumerate()
        .map(|(i, key)| key.ok_or_else(|| Error::InvalidArgument(format!("option key at index {i} is null"))))
        .collect::<Result<Vec<_>>>()?;
    let values: Vec<String> = values.into_iter().map(Option::unwrap_or_default).collect();

    bridge.set_keys_and_values(&keys, &values)
}

/// `_getUserJvmOptionKeys`.
pub fn get_current_keys(env: &JniEnv, bridge: &dyn OptionBridge) -> Result<jni::jobjectArray> {
    env.new_string_array(&bridge.current_keys())
}

/// Runs one native against the global store, converting errors and panics
/// into a pending Java exception plus `fallback`.
unsafe fn run<T>(
    raw: *mut jni::JNIEnv,
    name: &str,
    fallback: T,
    op: impl FnOnce(&JniEnv, &dyn OptionBridge) -> Result<T>,
) -> T {
    let env = JniEnv::from_raw(raw);
    debug!("{name}");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        global_bridge().and_then(|bridge| op(&env, bridge))
    }))
    .unwrap_or_else(|_| Err(Error::Config(format!("{name} panicked"))));

    match outcome {
        Ok(value) => value,
        Err(err) => {
            if err.is_invalid_argument() {
                warn!("{name}: {err}");
            } else {
                error!("{name}: {err}");
            }
            env.throw_error(&err);
            fallback
        }
    }
}

// =============================================================================
// Exported natives
// =============================================================================

#[no_mangle]
pub unsafe extern "system" fn Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultValue(
    env: *mut jni::JNIEnv,
    _class: jni::jclass,
    key: jni::jstring,
) -> jni::jstring {
    run(env, "_getUserJvmOptionDefaultValue", ptr::null_mut(), |env, bridge| {
        get_default_value(env, bridge, key)
    })
}

#[no_mangle]
pub unsafe extern "system" fn Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultKeys(
    env: *mut jni::JNIEnv,
    _class: jni::jclass,
) -> jni::jobjectArray {
    run(env, "_getUserJvmOptionDefaultKeys", ptr::null_mut(), get_default_keys)
}

#[no_mangle]
pub unsafe extern "system" fn Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionValue(
    env: *mut jni::JNIEnv,
    _class: jni::jclass,
    key: jni::jstring,
) -> jni::jstring {
    run(env, "_getUserJvmOptionValue", ptr::null_mut(), |env, bridge| {
        get_current_value(env, bridge, key)
    })
}

#[no_mangle]
pub unsafe extern "system" fn Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1setUserJvmKeysAndValues(
    env: *mut jni::JNIEnv,
    _class: jni::jclass,
    keys: jni::jobjectArray,
    values: jni::jobjectArray,
) {
    run(env, "_setUserJvmKeysAndValues", (), |env, bridge| {
        set_keys_and_values(env, bridge, keys, values)
    })
}

#[no_mangle]
pub unsafe extern "system" fn Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionKeys(
    env: *mut jni::JNIEnv,
    _class: jni::jclass,
) -> jni::jobjectArray {
    run(env, "_getUserJvmOptionKeys", ptr::null_mut(), get_current_keys)
}

/// Called by the JVM when this library is loaded with `System.loadLibrary`.
#[no_mangle]
pub unsafe extern "system" fn JNI_OnLoad(_vm: *mut jni::JavaVM, _reserved: *mut c_void) -> jni::jint {
    crate::init_logging();
    debug!("user JVM options library loaded");
    jni::JNI_VERSION_1_8
}

/// Binds the five natives to [`CLASS_NAME`] explicitly.
///
/// Needed when the crate is linked into a launcher executable, where the JVM
/// does not look up `Java_...` symbols on its own.
pub fn register_natives(env: &JniEnv) -> Result<()> {
    let cls = env
        .find_class(CLASS_NAME)
        .ok_or_else(|| Error::Config(format!("class {CLASS_NAME} not found")))?;
    let cls = crate::env::LocalRef::new(env, cls);

    let methods = [
        native(
            b"_getUserJvmOptionDefaultValue\0",
            b"(Ljava/lang/String;)Ljava/lang/String;\0",
            Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultValue as *mut c_void,
        ),
        native(
            b"_getUserJvmOptionDefaultKeys\0",
            b"()[Ljava/lang/String;\0",
            Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultKeys as *mut c_void,
        ),
        native(
            b"_getUserJvmOptionValue\0",
            b"(Ljava/lang/String;)Ljava/lang/String;\0",
            Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionValue as *mut c_void,
        ),
        native(
            b"_setUserJvmKeysAndValues\0",
            b"([Ljava/lang/String;[Ljava/lang/String;)V\0",
            Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1setUserJvmKeysAndValues as *mut c_void,
        ),
        native(
            b"_getUserJvmOptionKeys\0",
            b"()[Ljava/lang/String;\0",
            Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionKeys as *mut c_void,
        ),
    ];

    env.register_natives(cls.get(), &methods)
        .map_err(|code| Error::Config(format!("RegisterNatives failed with {code}")))
}

fn native(name: &'static [u8], signature: &'static [u8], fn_ptr: *mut c_void) -> jni::JNINativeMethod {
    jni::JNINativeMethod {
        name: name.as_ptr() as *const c_char,
        signature: signature.as_ptr() as *const c_char,
        fnPtr: fn_ptr,
    }
}
