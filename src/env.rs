//! High-level environment wrapper for JNI.
//!
//! The [`JniEnv`] struct wraps the raw `JNIEnv` pointer and provides:
//!
//! - **Classes**: Find classes, register natives
//! - **Strings**: Convert between Java strings and Rust strings (modified UTF-8)
//! - **Arrays**: Create and read `String[]`
//! - **Exceptions**: Check for and throw exceptions
//! - **References**: [`LocalRef`] deletes a local reference when dropped
//!
//! ```rust,ignore
//! use user_jvm_options::env::{JniEnv, LocalRef};
//!
//! fn key(env: &JniEnv, keys: jni::jobjectArray) -> user_jvm_options::Result<Option<String>> {
//!     // LocalRef automatically cleans up when it goes out of scope
//!     let first = LocalRef::new(env, env.get_object_array_element(keys, 0));
//!     env.get_string_utf(first.get())
//! }
//! ```

// Re-export the JNI wrapper
mod jni_impl {
    pub use crate::jni_wrapper::{JniEnv, LocalRef};
}

pub use jni_impl::{JniEnv, LocalRef};
