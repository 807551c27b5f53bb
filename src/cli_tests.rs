use crate::{build_cli, exit_code_for, run_cli_with_output};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn make_dir(root: &Path, name: &str, mtime: u64) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(mtime);
    fs::File::open(&dir).unwrap().set_modified(time).unwrap();
    dir
}

/// bazel-out 下：A(100) B(200) other-C(300)，外加一个空配置文件保证不读到环境中的配置
fn setup() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("bazel-out");
    fs::create_dir_all(&root).unwrap();
    make_dir(&root, "applebin_ios-ios_armv7-A", 100);
    make_dir(&root, "applebin_ios-ios_armv7-B", 200);
    make_dir(&root, "other-C", 300);

    let config = temp_dir.path().join("artloc.toml");
    fs::write(&config, "").unwrap();
    (temp_dir, root, config)
}

fn run(root: &Path, config: &Path, args: &[&str]) -> anyhow::Result<Option<String>> {
    let mut argv = vec![
        "artloc".to_string(),
        "--root".to_string(),
        root.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    argv.extend(args.iter().map(|s| s.to_string()));
    run_cli_with_output(argv)
}

#[test]
fn test_cli_definition_is_valid() {
    build_cli().debug_assert();
}

#[test]
fn test_dsym_command() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["dsym"]).unwrap().unwrap();
    let expected = root.join("applebin_ios-ios_armv7-B").join("bin").join("Telegram");
    assert_eq!(output, expected.display().to_string());
    // 与原脚本一致：没有结尾换行
    assert!(!output.ends_with('\n'));
}

#[test]
fn test_ipa_command() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["ipa"]).unwrap().unwrap();
    let expected = root.join("applebin_ios-ios_armv7-B/bin/Telegram/Telegram.ipa");
    assert_eq!(output, expected.display().to_string());
}

#[test]
fn test_repeated_invocations_are_identical() {
    let (_temp_dir, root, config) = setup();
    let first = run(&root, &config, &["ipa"]).unwrap();
    let second = run(&root, &config, &["ipa"]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_match_exits_with_selection_code() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("bazel-out");
    fs::create_dir_all(root.join("darwin_arm64-fastbuild")).unwrap();
    let config = temp_dir.path().join("artloc.toml");
    fs::write(&config, "").unwrap();

    let err = run(&root, &config, &["dsym"]).unwrap_err();
    assert_eq!(exit_code_for(&err), 2);
}

#[test]
fn test_missing_root_exits_with_access_code() {
    let (temp_dir, _root, config) = setup();
    let missing = temp_dir.path().join("missing-out");
    let err = run(&missing, &config, &["ipa"]).unwrap_err();
    assert_eq!(exit_code_for(&err), 1);
}

#[test]
fn test_verify_flag() {
    let (_temp_dir, root, config) = setup();
    let err = run(&root, &config, &["ipa", "--verify"]).unwrap_err();
    assert_eq!(exit_code_for(&err), 3);
}

#[test]
fn test_get_preset_from_config() {
    let (temp_dir, root, _config) = setup();
    make_dir(&root, "applebin_watchos-watchos_armv7k-X", 50);
    let config = temp_dir.path().join("custom.toml");
    fs::write(
        &config,
        r#"
[presets.watch]
prefix = "applebin_watchos"
artifact = ["bin", "Watch"]
"#,
    )
    .unwrap();

    let output = run(&root, &config, &["get", "watch"]).unwrap().unwrap();
    let expected = root.join("applebin_watchos-watchos_armv7k-X").join("bin").join("Watch");
    assert_eq!(output, expected.display().to_string());

    let err = run(&root, &config, &["get", "nope"]).unwrap_err();
    assert!(err.to_string().contains("nope"));
    assert_eq!(exit_code_for(&err), 1);
}

#[test]
fn test_locate_with_custom_prefix_and_segments() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["locate", "--prefix", "other", "a", "b.txt"])
        .unwrap()
        .unwrap();
    assert_eq!(output, root.join("other-C/a/b.txt").display().to_string());

    // 默认前缀，无路径段时输出目录本身
    let output = run(&root, &config, &["locate"]).unwrap().unwrap();
    assert_eq!(output, root.join("applebin_ios-ios_armv7-B").display().to_string());
}

#[test]
fn test_locate_with_pattern() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["locate", "--pattern", "armv7-A$", "bin"])
        .unwrap()
        .unwrap();
    assert_eq!(output, root.join("applebin_ios-ios_armv7-A/bin").display().to_string());

    let err = run(&root, &config, &["locate", "--pattern", "(", "bin"]).unwrap_err();
    assert_eq!(exit_code_for(&err), 64);
}

#[test]
fn test_locate_rejects_escaping_segments() {
    let (_temp_dir, root, config) = setup();
    for args in [&["locate", "..", "x"][..], &["locate", "bin", "/etc/passwd"][..]] {
        let err = run(&root, &config, args).unwrap_err();
        assert_eq!(exit_code_for(&err), 64, "{args:?}");
    }
}

#[test]
fn test_prefix_and_pattern_conflict() {
    let (_temp_dir, root, config) = setup();
    let err = run(&root, &config, &["locate", "--prefix", "a", "--pattern", "b"]).unwrap_err();
    assert!(err.downcast_ref::<clap::Error>().is_some());
    assert_eq!(exit_code_for(&err), 2);
}

#[test]
fn test_list_json() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["list", "--json"]).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["applebin_ios-ios_armv7-B", "applebin_ios-ios_armv7-A"]);
}

#[test]
fn test_list_table_with_no_match_is_empty() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["list", "--prefix", "nothing"]).unwrap();
    assert!(output.is_none());
}

#[test]
fn test_config_show() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["config"]).unwrap().unwrap();
    assert!(output.contains("[presets.dsym]"));
    assert!(output.contains("[presets.ipa]"));
    assert!(output.contains(&root.display().to_string()));
}

#[test]
fn test_completion_script() {
    let (_temp_dir, root, config) = setup();
    let output = run(&root, &config, &["completion", "bash"]).unwrap().unwrap();
    assert!(output.contains("artloc"));
}

#[test]
fn test_completion_requires_shell() {
    let (_temp_dir, root, config) = setup();
    let err = run(&root, &config, &["completion"]).unwrap_err();
    assert!(err.downcast_ref::<clap::Error>().is_some());
    assert_eq!(exit_code_for(&err), 2);

    let output = run(&root, &config, &["completion", "zsh"]).unwrap().unwrap();
    assert!(output.contains("#compdef artloc"));
}

#[test]
fn test_help_and_version_are_not_errors() {
    let output = run_cli_with_output(vec!["artloc".into(), "--version".into()])
        .unwrap()
        .unwrap();
    assert!(output.contains(env!("CARGO_PKG_VERSION")));

    let output = run_cli_with_output(vec!["artloc".into(), "dsym".into(), "--help".into()])
        .unwrap()
        .unwrap();
    assert!(output.contains("--verify"));
}
