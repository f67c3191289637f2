use smb_driver::{
    DriverError, MountConfig, OptionValue, Platform, RawOptions, ScriptRenderer, SmbMounter,
};
use smb_hal::{DirEntryInfo, Env, FakeFailure, FakeHal, Operation};
use std::path::{Path, PathBuf};

const SCRIPTS: &str = "/var/vcap/jobs/smbdriver/scripts";

fn mounter(hal: &FakeHal, required: &str, allowed: &str) -> SmbMounter<FakeHal> {
    let config = MountConfig::read_conf(required, allowed, "").expect("rules");
    SmbMounter::new(hal.clone(), Box::new(ScriptRenderer::new(SCRIPTS)), config)
}

fn credentials() -> RawOptions {
    [
        ("username".to_string(), OptionValue::from("fakeusername")),
        ("password".to_string(), OptionValue::from("fakepassword")),
    ]
    .into_iter()
    .collect()
}

#[test]
fn mount_calls_mounter_script_then_links() {
    let hal = FakeHal::new();
    let subject = mounter(&hal, "", "username,password");

    subject
        .mount(&Env::default(), "source", Path::new("target"), &credentials())
        .expect("mount");

    let commands = hal.commands();
    assert_eq!(commands.len(), 2);

    let (program, args) = &commands[0];
    assert_eq!(program, "powershell.exe");
    assert_eq!(args[0], "-file");
    assert_eq!(args[1], "/var/vcap/jobs/smbdriver/scripts/mounter.ps1");
    assert_eq!(args[2], "-username");
    assert_eq!(args[3], "fakeusername");
    assert_eq!(args[4], "-password");
    assert_eq!(args[5], "fakepassword");
    assert_eq!(args[6], "-remotePath");
    assert_eq!(args[7], "source");

    let (program, args) = &commands[1];
    assert_eq!(program, "cmd");
    let joined = args.join(" ");
    for token in ["/c", "mklink", "/d", "target", "source"] {
        assert!(joined.contains(token), "{token}");
    }
}

#[test]
fn mount_failure_skips_link_creation() {
    let hal = FakeHal::new();
    hal.fail_command(
        "powershell.exe",
        FakeFailure::Exit {
            code: 1,
            stderr: "New-SmbMapping: access denied (fakepassword)".to_string(),
        },
    );
    let subject = mounter(&hal, "", "username,password");

    let err = subject
        .mount(&Env::default(), "source", Path::new("target"), &credentials())
        .unwrap_err();

    assert!(matches!(err, DriverError::Safe(_)));
    assert!(!err.to_string().contains("fakepassword"));
    assert_eq!(hal.command_count(), 1);
}

#[test]
fn link_failure_is_a_safe_error() {
    let hal = FakeHal::new();
    hal.fail_command(
        "cmd",
        FakeFailure::Exit {
            code: 1,
            stderr: "Cannot create a file when that file already exists.".to_string(),
        },
    );
    let subject = mounter(&hal, "", "username,password");

    let err = subject
        .mount(&Env::default(), "source", Path::new("target"), &credentials())
        .unwrap_err();

    assert!(matches!(err, DriverError::Safe(_)));
    assert!(err.to_string().starts_with("cmd failed"));
    assert_eq!(hal.command_count(), 2);
}

#[test]
fn missing_and_disallowed_options() {
    let hal = FakeHal::new();
    let subject = mounter(&hal, "username", "password");

    let err = subject
        .mount(&Env::default(), "source", Path::new("target"), &RawOptions::new())
        .unwrap_err();
    assert!(err.to_string().contains("Missing mandatory options"));

    let raw: RawOptions = [
        ("username".to_string(), OptionValue::from("fake-username")),
        ("uid".to_string(), OptionValue::from("uid")),
    ]
    .into_iter()
    .collect();
    let err = subject
        .mount(&Env::default(), "source", Path::new("target"), &raw)
        .unwrap_err();
    assert!(err.to_string().contains("Not allowed options"));

    assert_eq!(hal.command_count(), 0);
}

#[test]
fn script_needs_password_even_when_rules_allow_its_absence() {
    let hal = FakeHal::new();
    let subject = mounter(&hal, "username", "password");

    let raw: RawOptions = [("username".to_string(), OptionValue::from("u"))]
        .into_iter()
        .collect();
    let err = subject
        .mount(&Env::default(), "source", Path::new("target"), &raw)
        .unwrap_err();

    assert!(matches!(err, DriverError::MissingOptions(ref names) if names == &["password"]));
    assert_eq!(hal.command_count(), 0);
}

#[test]
fn unmount_resolves_link_and_removes_it() {
    let hal = FakeHal::new();
    hal.set_link("/mnt/x", "//host/share");
    let subject = mounter(&hal, "", "username,password");

    subject
        .unmount(&Env::default(), Path::new("/mnt/x"))
        .expect("unmount");

    let (program, args) = &hal.commands()[0];
    assert_eq!(program, "powershell.exe");
    assert_eq!(
        args,
        &vec![
            "-file".to_string(),
            "/var/vcap/jobs/smbdriver/scripts/unmounter.ps1".to_string(),
            "-remotePath".to_string(),
            "//host/share".to_string(),
        ]
    );
    assert!(!hal.has_link(Path::new("/mnt/x")));
    assert_eq!(hal.removed_paths(), vec![PathBuf::from("/mnt/x")]);
}

#[test]
fn unmount_without_link_fails_before_invoking() {
    let hal = FakeHal::new();
    let subject = mounter(&hal, "", "username,password");

    let err = subject
        .unmount(&Env::default(), Path::new("/mnt/x"))
        .unwrap_err();

    assert!(matches!(err, DriverError::Safe(_)));
    assert_eq!(hal.command_count(), 0);
}

#[test]
fn unmount_script_failure_keeps_link() {
    let hal = FakeHal::new();
    hal.set_link("target", "source");
    hal.fail_command(
        "powershell.exe",
        FakeFailure::Exit {
            code: 1,
            stderr: "error".to_string(),
        },
    );
    let subject = mounter(&hal, "", "username,password");

    let err = subject
        .unmount(&Env::default(), Path::new("target"))
        .unwrap_err();

    assert!(matches!(err, DriverError::Safe(_)));
    assert!(hal.has_link(Path::new("target")));
}

#[test]
fn check_calls_check_script_with_deadline() {
    let hal = FakeHal::new();
    let subject = mounter(&hal, "", "username,password");

    assert!(subject.check(&Env::default(), "target", "source"));

    assert!(hal.has_operation(|op| matches!(
        op,
        Operation::Command { program, args, deadline: Some(d) }
            if program == "powershell.exe"
                && args.last().map(String::as_str) == Some("source")
                && *d <= smb_driver::CHECK_TIMEOUT
    )));
}

#[test]
fn check_failure_reports_unmounted() {
    let hal = FakeHal::new();
    hal.fail_command("powershell.exe", FakeFailure::Timeout);
    let subject = mounter(&hal, "", "username,password");

    assert!(!subject.check(&Env::default(), "target", "source"));
}

#[test]
fn purge_removes_directory_trees_only() {
    let root = PathBuf::from("var").join("vcap").join("data").join("some").join("path");
    let hal = FakeHal::new();
    hal.set_dir(
        &root,
        vec![
            DirEntryInfo::dir("guidy-guid-guid"),
            DirEntryInfo::file("not-a-dir"),
        ],
    );
    let subject = mounter(&hal, "", "username,password");

    subject.purge(&Env::default(), &root);

    assert_eq!(hal.command_count(), 0);
    assert!(hal.has_operation(
        |op| matches!(op, Operation::RemoveAll { path } if *path == root.join("guidy-guid-guid"))
    ));
    assert_eq!(hal.removed_paths().len(), 1);
}

#[test]
fn platform_selection_builds_script_renderer() {
    let hal = FakeHal::new();
    hal.set_link("/mnt/x", "//host/share");
    let config = MountConfig::read_conf("", "username,password", "").expect("rules");
    let subject = SmbMounter::new(
        hal.clone(),
        Platform::Script.renderer(Some(SCRIPTS)),
        config,
    );

    subject
        .unmount(&Env::default(), Path::new("/mnt/x"))
        .expect("unmount");

    assert_eq!(hal.commands()[0].1[3], "//host/share");
}
