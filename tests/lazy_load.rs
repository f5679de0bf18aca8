//! The first native call loads the store from the environment when nothing
//! was installed. Kept in its own binary so the process-wide store starts
//! empty, and as a single test because it changes environment variables.

mod support;

use std::fs;
use std::ptr;

use support::FakeJvm;
use user_jvm_options::bridge::*;
use user_jvm_options::config::{APP_CONFIG_ENV, OVERRIDES_ENV};
use user_jvm_options::{install_bridge, Error, OptionMap, UserJvmOptions};

#[test]
fn store_loads_from_environment_on_first_call() {
    std::env::remove_var(APP_CONFIG_ENV);
    std::env::remove_var(OVERRIDES_ENV);
    let jvm = FakeJvm::new();

    let value = unsafe {
        Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultValue(
            jvm.raw(),
            ptr::null_mut(),
            jvm.string("-Xmx"),
        )
    };
    assert!(value.is_null());
    let (class, message) = jvm.take_exception().expect("exception pending");
    assert_eq!(class, "java/lang/IllegalStateException");
    assert!(message.contains(APP_CONFIG_ENV));

    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("Hello.cfg");
    let overrides = dir.path().join("user").join("jvmuserargs.cfg");
    fs::write(
        &app,
        "[Application]\napp.identifier=com.example.lazy\n\n[JVMUserOptions]\n-Xmx=512m\n",
    )
    .unwrap();
    std::env::set_var(APP_CONFIG_ENV, &app);
    std::env::set_var(OVERRIDES_ENV, &overrides);

    unsafe {
        let value = Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionDefaultValue(
            jvm.raw(),
            ptr::null_mut(),
            jvm.string("-Xmx"),
        );
        assert!(jvm.take_exception().is_none());
        assert_eq!(jvm.read_string(value).as_deref(), Some("512m"));

        Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1setUserJvmKeysAndValues(
            jvm.raw(),
            ptr::null_mut(),
            jvm.string_array(&[Some("-Xmx")]),
            jvm.string_array(&[Some("1g")]),
        );
        assert!(jvm.take_exception().is_none());

        let value = Java_jdk_packager_services_userjvmoptions_LauncherUserJvmOptions__1getUserJvmOptionValue(
            jvm.raw(),
            ptr::null_mut(),
            jvm.string("-Xmx"),
        );
        assert_eq!(jvm.read_string(value).as_deref(), Some("1g"));
    }

    assert_eq!(fs::read_to_string(&overrides).unwrap(), "[JVMUserOverrides]\n-Xmx=1g\n");

    // The loaded store now owns the slot.
    let late = UserJvmOptions::new(OptionMap::new());
    assert!(matches!(install_bridge(Box::new(late)), Err(Error::AlreadyInstalled)));

    std::env::remove_var(APP_CONFIG_ENV);
    std::env::remove_var(OVERRIDES_ENV);
}
