//! Raw FFI bindings.
//!
//! Only the JNI surface is needed here; nothing in this crate talks JVMTI.

pub mod jni;
