//! A JVM-less `JNIEnv` for driving the natives in tests.
//!
//! Only the function-table slots the crate calls are implemented. Objects
//! live in a thread-local heap and handles are `index + 1`, so every test
//! thread gets its own isolated "VM".

#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use user_jvm_options::env::JniEnv;
use user_jvm_options::mutf8;
use user_jvm_options::sys::jni::{self, JNIEnv, JNINativeInterface_, JNINativeMethod};

enum Object {
    Class(String),
    Str(CString),
    Array(Vec<jni::jobject>),
}

#[derive(Default)]
struct Heap {
    objects: Vec<Object>,
    pending: Option<(String, String)>,
    registered: Vec<(String, String)>,
    deleted_locals: usize,
}

thread_local! {
    static HEAP: RefCell<Heap> = RefCell::new(Heap::default());
}

fn alloc(obj: Object) -> jni::jobject {
    HEAP.with(|heap| {
        let mut heap = heap.borrow_mut();
        heap.objects.push(obj);
        heap.objects.len() as *mut c_void
    })
}

fn with_object<R>(handle: jni::jobject, f: impl FnOnce(Option<&mut Object>) -> R) -> R {
    HEAP.with(|heap| {
        let mut heap = heap.borrow_mut();
        let index = (handle as usize).wrapping_sub(1);
        f(heap.objects.get_mut(index))
    })
}

fn raise(class: &str, msg: &str) {
    HEAP.with(|heap| heap.borrow_mut().pending = Some((class.to_owned(), msg.to_owned())));
}

unsafe extern "system" fn find_class(_env: *mut JNIEnv, name: *const c_char) -> jni::jclass {
    let name = CStr::from_ptr(name).to_string_lossy().into_owned();
    alloc(Object::Class(name))
}

unsafe extern "system" fn throw_new(_env: *mut JNIEnv, clazz: jni::jclass, msg: *const c_char) -> jni::jint {
    let class = with_object(clazz, |obj| match obj {
        Some(Object::Class(name)) => name.clone(),
        _ => String::from("<not a class>"),
    });
    let msg = mutf8::decode(CStr::from_ptr(msg).to_bytes()).unwrap_or_default();
    raise(&class, &msg);
    jni::JNI_OK
}

unsafe extern "system" fn delete_local_ref(_env: *mut JNIEnv, _obj: jni::jobject) {
    // Handles stay valid: arrays in the fake heap share element handles.
    HEAP.with(|heap| heap.borrow_mut().deleted_locals += 1);
}

unsafe extern "system" fn new_string_utf(_env: *mut JNIEnv, utf: *const c_char) -> jni::jstring {
    alloc(Object::Str(CStr::from_ptr(utf).to_owned()))
}

unsafe extern "system" fn get_string_utf_chars(
    _env: *mut JNIEnv,
    s: jni::jstring,
    _is_copy: *mut jni::jboolean,
) -> *const c_char {
    with_object(s, |obj| match obj {
        Some(Object::Str(chars)) => chars.as_ptr(),
        _ => ptr::null(),
    })
}

unsafe extern "system" fn release_string_utf_chars(_env: *mut JNIEnv, _s: jni::jstring, _chars: *const c_char) {}

unsafe extern "system" fn get_array_length(_env: *mut JNIEnv, array: jni::jarray) -> jni::jsize {
    with_object(array, |obj| match obj {
        Some(Object::Array(items)) => items.len() as jni::jsize,
        _ => 0,
    })
}

unsafe extern "system" fn new_object_array(
    _env: *mut JNIEnv,
    len: jni::jsize,
    _clazz: jni::jclass,
    init: jni::jobject,
) -> jni::jobjectArray {
    alloc(Object::Array(vec![init; len as usize]))
}

unsafe extern "system" fn get_object_array_element(
    _env: *mut JNIEnv,
    array: jni::jobjectArray,
    index: jni::jsize,
) -> jni::jobject {
    let element = with_object(array, |obj| match obj {
        Some(Object::Array(items)) => items.get(index as usize).copied(),
        _ => None,
    });
    element.unwrap_or_else(|| {
        raise("java/lang/ArrayIndexOutOfBoundsException", &index.to_string());
        ptr::null_mut()
    })
}

unsafe extern "system" fn set_object_array_element(
    _env: *mut JNIEnv,
    array: jni::jobjectArray,
    index: jni::jsize,
    val: jni::jobject,
) {
    let stored = with_object(array, |obj| match obj {
        Some(Object::Array(items)) if (index as usize) < items.len() => {
            items[index as usize] = val;
            true
        }
        _ => false,
    });
    if !stored {
        raise("java/lang/ArrayIndexOutOfBoundsException", &index.to_string());
    }
}

unsafe extern "system" fn register_natives(
    _env: *mut JNIEnv,
    _clazz: jni::jclass,
    methods: *const JNINativeMethod,
    n_methods: jni::jint,
) -> jni::jint {
    let methods = std::slice::from_raw_parts(methods, n_methods as usize);
    HEAP.with(|heap| {
        let mut heap = heap.borrow_mut();
        for method in methods {
            assert!(!method.fnPtr.is_null());
            let name = CStr::from_ptr(method.name).to_string_lossy().into_owned();
            let sig = CStr::from_ptr(method.signature).to_string_lossy().into_owned();
            heap.registered.push((name, sig));
        }
    });
    jni::JNI_OK
}

unsafe extern "system" fn exception_check(_env: *mut JNIEnv) -> jni::jboolean {
    HEAP.with(|heap| if heap.borrow().pending.is_some() { jni::JNI_TRUE } else { jni::JNI_FALSE })
}

pub struct FakeJvm {
    _table: Box<JNINativeInterface_>,
    env: Box<JNIEnv>,
}

impl FakeJvm {
    pub fn new() -> Self {
        HEAP.with(|heap| *heap.borrow_mut() = Heap::default());

        let table = Box::new(JNINativeInterface_ {
            reserved0: ptr::null_mut(),
            reserved1: ptr::null_mut(),
            reserved2: ptr::null_mut(),
            reserved3: ptr::null_mut(),
            _slots_4_5: [ptr::null_mut(); 2],
            FindClass: find_class,
            _slots_7_13: [ptr::null_mut(); 7],
            ThrowNew: throw_new,
            _slots_15_22: [ptr::null_mut(); 8],
            DeleteLocalRef: delete_local_ref,
            _slots_24_166: [ptr::null_mut(); 143],
            NewStringUTF: new_string_utf,
            _slot_168: ptr::null_mut(),
            GetStringUTFChars: get_string_utf_chars,
            ReleaseStringUTFChars: release_string_utf_chars,
            GetArrayLength: get_array_length,
            NewObjectArray: new_object_array,
            GetObjectArrayElement: get_object_array_element,
            SetObjectArrayElement: set_object_array_element,
            _slots_175_214: [ptr::null_mut(); 40],
            RegisterNatives: register_natives,
            _slots_216_227: [ptr::null_mut(); 12],
            ExceptionCheck: exception_check,
        });
        let env = Box::new(&*table as *const JNINativeInterface_);
        FakeJvm { _table: table, env }
    }

    pub fn raw(&self) -> *mut JNIEnv {
        &*self.env as *const JNIEnv as *mut JNIEnv
    }

    pub fn env(&self) -> JniEnv {
        unsafe { JniEnv::from_raw(self.raw()) }
    }

    pub fn string(&self, s: &str) -> jni::jstring {
        alloc(Object::Str(CString::new(mutf8::encode(s)).unwrap()))
    }

    /// A string whose modified-UTF-8 bytes are given verbatim.
    pub fn raw_string(&self, bytes: &[u8]) -> jni::jstring {
        alloc(Object::Str(CString::new(bytes).unwrap()))
    }

    pub fn string_array(&self, items: &[Option<&str>]) -> jni::jobjectArray {
        let handles = items
            .iter()
            .map(|item| item.map_or(ptr::null_mut(), |s| self.string(s)))
            .collect();
        alloc(Object::Array(handles))
    }

    pub fn read_string(&self, handle: jni::jstring) -> Option<String> {
        if handle.is_null() {
            return None;
        }
        with_object(handle, |obj| match obj {
            Some(Object::Str(chars)) => Some(mutf8::decode(chars.as_bytes()).unwrap()),
            _ => panic!("handle {handle:?} is not a string"),
        })
    }

    pub fn read_string_array(&self, handle: jni::jobjectArray) -> Vec<Option<String>> {
        let handles = with_object(handle, |obj| match obj {
            Some(Object::Array(items)) => items.clone(),
            _ => panic!("handle {handle:?} is not an array"),
        });
        handles.into_iter().map(|h| self.read_string(h)).collect()
    }

    /// Takes the pending exception as `(class, message)`.
    pub fn take_exception(&self) -> Option<(String, String)> {
        HEAP.with(|heap| heap.borrow_mut().pending.take())
    }

    pub fn registered(&self) -> Vec<(String, String)> {
        HEAP.with(|heap| heap.borrow().registered.clone())
    }

    pub fn deleted_locals(&self) -> usize {
        HEAP.with(|heap| heap.borrow().deleted_locals)
    }
}
