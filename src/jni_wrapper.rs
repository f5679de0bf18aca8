//! Safe wrapper around the JNI environment.
//!
//! This module covers the JNI operations the option natives need: class
//! lookup, exceptions, modified-UTF-8 strings, `String[]` arrays, local
//! references and native registration.
//!
//! # Example
//!
//! ```rust,ignore
//! use user_jvm_options::env::JniEnv;
//!
//! fn echo(env: *mut jni::JNIEnv, s: jni::jstring) -> jni::jstring {
//!     let env = unsafe { JniEnv::from_raw(env) };
//!
//!     let text = env.get_string_utf(s).ok().flatten().unwrap_or_default();
//!     env.new_string_utf(&text).unwrap_or(std::ptr::null_mut())
//! }
//! ```

use crate::error::{Error, Result};
use crate::mutf8;
use crate::sys::jni;
use std::ffi::{CStr, CString};
use std::ptr;

pub const STRING_CLASS: &str = "java/lang/String";
pub const ILLEGAL_ARGUMENT_EXCEPTION: &str = "java/lang/IllegalArgumentException";
pub const ILLEGAL_STATE_EXCEPTION: &str = "java/lang/IllegalStateException";

/// Safe wrapper around a JNI environment pointer.
///
/// # Thread Safety
///
/// A `JniEnv` is tied to a specific thread and cannot be sent across threads.
/// Each JVM thread has its own JNI environment.
pub struct JniEnv {
    env: *mut jni::JNIEnv,
}

impl JniEnv {
    /// Creates a JniEnv wrapper from a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure the pointer is valid and comes from the current thread.
    pub unsafe fn from_raw(env: *mut jni::JNIEnv) -> Self {
        JniEnv { env }
    }

    // =========================================================================
    // Class Operations
    // =========================================================================

    /// Finds a class by its fully qualified name.
    ///
    /// The name should use '/' as package separator (e.g., "java/lang/String").
    pub fn find_class(&self, name: &str) -> Option<jni::jclass> {
        let c_name = CString::new(name).ok()?;
        unsafe {
            let vtable = *self.env;
            let cls = ((*vtable).FindClass)(self.env, c_name.as_ptr());
            if cls.is_null() { None } else { Some(cls) }
        }
    }

    // =========================================================================
    // Exception Handling
    // =========================================================================

    /// Checks if an exception is pending.
    pub fn exception_check(&self) -> bool {
        unsafe {
            let vtable = *self.env;
            ((*vtable).ExceptionCheck)(self.env) != 0
        }
    }

    /// Throws a new exception of the specified class with the given message.
    pub fn throw_new(&self, cls: jni::jclass, msg: &str) -> std::result::Result<(), jni::jint> {
        let c_msg = CString::new(mutf8::encode(msg)).map_err(|_| jni::JNI_ERR)?;
        unsafe {
            let vtable = *self.env;
            let result = ((*vtable).ThrowNew)(self.env, cls, c_msg.as_ptr());
            if result == 0 { Ok(()) } else { Err(result) }
        }
    }

    /// Raises `err` as a Java exception unless one is already pending.
    ///
    /// Argument errors become `IllegalArgumentException`, everything else
    /// `IllegalStateException`.
    pub fn throw_error(&self, err: &Error) {
        if self.exception_check() {
            return;
        }
        let class_name = if err.is_invalid_argument() {
            ILLEGAL_ARGUMENT_EXCEPTION
        } else {
            ILLEGAL_STATE_EXCEPTION
        };
        match self.find_class(class_name) {
            Some(cls) => {
                let cls = LocalRef::new(self, cls);
                if self.throw_new(cls.get(), &err.to_string()).is_err() {
                    log::error!("ThrowNew failed for {class_name}: {err}");
                }
            }
            None => log::error!("cannot resolve {class_name} to report: {err}"),
        }
    }

    // =========================================================================
    // String Operations
    // =========================================================================

    /// Creates a new Java string from a Rust string.
    pub fn new_string_utf(&self, s: &str) -> Result<jni::jstring> {
        let c_str = CString::new(mutf8::encode(s))
            .map_err(|_| Error::Marshal("encoded string contains NUL".into()))?;
        unsafe {
            let vtable = *self.env;
            let jstr = ((*vtable).NewStringUTF)(self.env, c_str.as_ptr());
            if jstr.is_null() {
                Err(Error::Marshal(format!("NewStringUTF failed for {s:?}")))
            } else {
                Ok(jstr)
            }
        }
    }

    /// Gets a Rust string from a Java string.
    ///
    /// Returns `Ok(None)` for a null reference.
    pub fn get_string_utf(&self, s: jni::jstring) -> Result<Option<String>> {
        if s.is_null() {
            return Ok(None);
        }
        unsafe {
            let vtable = *self.env;
            let chars = ((*vtable).GetStringUTFChars)(self.env, s, ptr::null_mut());
            if chars.is_null() {
                return Err(Error::Marshal("GetStringUTFChars failed".into()));
            }
            let result = mutf8::decode(CStr::from_ptr(chars).to_bytes());
            ((*vtable).ReleaseStringUTFChars)(self.env, s, chars);
            result.map(Some)
        }
    }

    // =========================================================================
    // Reference Management
    // =========================================================================

    /// Deletes a local reference.
    pub fn delete_local_ref(&self, obj: jni::jobject) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).DeleteLocalRef)(self.env, obj);
        }
    }

    // =========================================================================
    // Array Operations
    // =========================================================================

    /// Gets the length of an array.
    pub fn get_array_length(&self, array: jni::jarray) -> jni::jsize {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetArrayLength)(self.env, array)
        }
    }

    /// Creates a new object array.
    pub fn new_object_array(&self, length: jni::jsize, cls: jni::jclass, init: jni::jobject) -> Option<jni::jobjectArray> {
        unsafe {
            let vtable = *self.env;
            let arr = ((*vtable).NewObjectArray)(self.env, length, cls, init);
            if arr.is_null() { None } else { Some(arr) }
        }
    }

    /// Gets an element from an object array.
    pub fn get_object_array_element(&self, array: jni::jobjectArray, index: jni::jsize) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetObjectArrayElement)(self.env, array, index)
        }
    }

    /// Sets an element in an object array.
    pub fn set_object_array_element(&self, array: jni::jobjectArray, index: jni::jsize, value: jni::jobject) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetObjectArrayElement)(self.env, array, index, value);
        }
    }

    /// Reads a `String[]` into Rust strings. Null elements come back as `None`.
    ///
    /// A null array is an argument error.
    pub fn get_string_array(&self, array: jni::jobjectArray) -> Result<Vec<Option<String>>> {
        if array.is_null() {
            return Err(Error::InvalidArgument("array is null".into()));
        }
        let len = self.get_array_length(array);
        let mut out = Vec::with_capacity(len.max(0) as usize);
        for i in 0..len {
            let element = LocalRef::new(self, self.get_object_array_element(array, i));
            if self.exception_check() {
                return Err(Error::Marshal(format!("reading array element {i} failed")));
            }
            out.push(self.get_string_utf(element.get())?);
        }
        Ok(out)
    }

    /// Builds a `String[]` from Rust strings, preserving order.
    pub fn new_string_array<S: AsRef<str>>(&self, items: &[S]) -> Result<jni::jobjectArray> {
        let len = jni::jsize::try_from(items.len())
            .map_err(|_| Error::Marshal(format!("{} elements do not fit a Java array", items.len())))?;
        let cls = self
            .find_class(STRING_CLASS)
            .ok_or_else(|| Error::Marshal(format!("class {STRING_CLASS} not found")))?;
        let cls = LocalRef::new(self, cls);

        let array = self
            .new_object_array(len, cls.get(), ptr::null_mut())
            .ok_or_else(|| Error::Marshal(format!("NewObjectArray({len}) failed")))?;
        for (i, item) in items.iter().enumerate() {
            let s = LocalRef::new(self, self.new_string_utf(item.as_ref())?);
            self.set_object_array_element(array, i as jni::jsize, s.get());
        }
        Ok(array)
    }

    // =========================================================================
    // Native Registration
    // =========================================================================

    /// Registers native method implementations for a class.
    pub fn register_natives(&self, cls: jni::jclass, methods: &[jni::JNINativeMethod]) -> std::result::Result<(), jni::jint> {
        unsafe {
            let vtable = *self.env;
            let result = ((*vtable).RegisterNatives)(self.env, cls, methods.as_ptr(), methods.len() as jni::jint);
            if result == 0 { Ok(()) } else { Err(result) }
        }
    }
}

// =========================================================================
// Reference Guards (RAII wrappers)
// =========================================================================

/// A guard that automatically deletes a local reference when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let class = LocalRef::new(&env, env.find_class("java/lang/String").unwrap());
/// // class is automatically deleted when it goes out of scope
/// ```
pub struct LocalRef<'a> {
    env: &'a JniEnv,
    obj: jni::jobject,
}

impl<'a> LocalRef<'a> {
    /// Creates a new LocalRef guard.
    pub fn new(env: &'a JniEnv, obj: jni::jobject) -> Self {
        LocalRef { env, obj }
    }

    /// Returns the underlying jobject.
    pub fn get(&self) -> jni::jobject {
        self.obj
    }
}

impl<'a> Drop for LocalRef<'a> {
    fn drop(&mut self) {
        if !self.obj.is_null() {
            self.env.delete_local_ref(self.obj);
        }
    }
}
