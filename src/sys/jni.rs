// user-jvm-options/src/sys/jni.rs
//
// JNI (Java Native Interface) types and the subset of the function table
// this crate calls.
//
// The function table is declared slot-for-slot up to ExceptionCheck (index
// 228). Slots the crate never calls are reserved padding so that every called
// slot sits at its jni.h index. Those indices have been fixed since JDK 1.2.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_char;

// =============================================================================
// Primitive Types
// =============================================================================

pub type jint = i32;
pub type jboolean = u8;
pub type jsize = jint;

// =============================================================================
// Reference Types (opaque pointers)
// =============================================================================

pub type jobject = *mut c_void;
pub type jclass = jobject;
pub type jstring = jobject;
pub type jarray = jobject;
pub type jobjectArray = jarray;

// =============================================================================
// Constants
// =============================================================================

pub const JNI_OK: jint = 0;
pub const JNI_ERR: jint = -1;

pub const JNI_TRUE: jboolean = 1;
pub const JNI_FALSE: jboolean = 0;

pub const JNI_VERSION_1_8: jint = 0x00010008;

// =============================================================================
// JNINativeMethod for RegisterNatives
// =============================================================================

#[repr(C)]
pub struct JNINativeMethod {
    pub name: *const c_char,
    pub signature: *const c_char,
    pub fnPtr: *mut c_void,
}

// =============================================================================
// JNINativeInterface_ - The JNI function table (vtable)
// =============================================================================
//
// JNIEnv is a pointer to a pointer to this struct. Order must match jni.h.

#[repr(C)]
pub struct JNINativeInterface_ {
    // 0-3: reserved by the JVM
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,
    pub reserved3: *mut c_void,

    // 4-5: GetVersion, DefineClass
    pub _slots_4_5: [*mut c_void; 2],

    // 6
    pub FindClass: unsafe extern "system" fn(env: *mut JNIEnv, name: *const c_char) -> jclass,

    // 7-13: reflection, class hierarchy, Throw
    pub _slots_7_13: [*mut c_void; 7],

    // 14
    pub ThrowNew:
        unsafe extern "system" fn(env: *mut JNIEnv, clazz: jclass, msg: *const c_char) -> jint,

    // 15-22: ExceptionOccurred, ExceptionDescribe, ExceptionClear, FatalError,
    // local frames, global refs
    pub _slots_15_22: [*mut c_void; 8],

    // 23
    pub DeleteLocalRef: unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject),

    // 24-166: object, method, field and UTF-16 string operations
    pub _slots_24_166: [*mut c_void; 143],

    // 167
    pub NewStringUTF: unsafe extern "system" fn(env: *mut JNIEnv, utf: *const c_char) -> jstring,

    // 168: GetStringUTFLength
    pub _slot_168: *mut c_void,

    // 169-170: modified UTF-8 access
    pub GetStringUTFChars: unsafe extern "system" fn(
        env: *mut JNIEnv,
        str: jstring,
        isCopy: *mut jboolean,
    ) -> *const c_char,
    pub ReleaseStringUTFChars:
        unsafe extern "system" fn(env: *mut JNIEnv, str: jstring, chars: *const c_char),

    // 171-174: arrays
    pub GetArrayLength: unsafe extern "system" fn(env: *mut JNIEnv, array: jarray) -> jsize,
    pub NewObjectArray: unsafe extern "system" fn(
        env: *mut JNIEnv,
        len: jsize,
        clazz: jclass,
        init: jobject,
    ) -> jobjectArray,
    pub GetObjectArrayElement:
        unsafe extern "system" fn(env: *mut JNIEnv, array: jobjectArray, index: jsize) -> jobject,
    pub SetObjectArrayElement: unsafe extern "system" fn(
        env: *mut JNIEnv,
        array: jobjectArray,
        index: jsize,
        val: jobject,
    ),

    // 175-214: primitive arrays
    pub _slots_175_214: [*mut c_void; 40],

    // 215
    pub RegisterNatives: unsafe extern "system" fn(
        env: *mut JNIEnv,
        clazz: jclass,
        methods: *const JNINativeMethod,
        nMethods: jint,
    ) -> jint,

    // 216-227: UnregisterNatives, monitors, GetJavaVM, regions, critical access
    pub _slots_216_227: [*mut c_void; 12],

    // 228
    pub ExceptionCheck: unsafe extern "system" fn(env: *mut JNIEnv) -> jboolean,
    // Slots past 228 are never read through this declaration.
}

const _: () = assert!(
    std::mem::size_of::<JNINativeInterface_>() == 229 * std::mem::size_of::<*mut c_void>()
);

/// JNIEnv is directly the vtable pointer (C ABI definition)
pub type JNIEnv = *const JNINativeInterface_;

// =============================================================================
// JavaVM - only passed through JNI_OnLoad, never called
// =============================================================================

#[repr(C)]
pub struct JNIInvokeInterface_ {
    _opaque: [u8; 0],
}

/// JavaVM is directly the vtable pointer (C ABI definition)
pub type JavaVM = *const JNIInvokeInterface_;
