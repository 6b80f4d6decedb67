//! Tests for error handling, exit codes and suggestions.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn stencil(dir: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("stencil");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("STENCIL_DEFAULTS__MODULE_PREFIX")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_missing_module_is_a_user_error() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["new", "helm3"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ModulePath"));

    assert!(!temp.path().join("helm3").exists());
}

#[test]
fn test_invalid_plugin_name() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["new", "3d", "-m", "github.com/acme/3d"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("PluginName"));
}

#[test]
fn test_existing_file_suggests_force() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("helm3");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join(".gitignore"), "mine").unwrap();

    stencil(temp.path())
        .args(["new", "helm3", "-m", "get.porter.sh/mixin/helm3"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"))
        .stderr(predicate::str::contains("before the failure"));

    assert_eq!(fs::read_to_string(root.join(".gitignore")).unwrap(), "mine");
}

#[test]
fn test_unresolved_token_names_entry() {
    let temp = TempDir::new().unwrap();
    let tpl = temp.path().join("tpl");
    fs::create_dir_all(&tpl).unwrap();
    fs::write(tpl.join("contact.txt.tmpl"), "{{ AuthorEmail }}\n").unwrap();

    stencil(temp.path())
        .args([
            "new",
            "mysample",
            "-m",
            "github.com/acme/mysample",
            "--template-dir",
            tpl.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("contact.txt.tmpl"))
        .stderr(predicate::str::contains("AuthorEmail"));
}

#[test]
fn test_missing_template_dir_is_not_found() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["list", "--template-dir", "does-not-exist"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("template directory not found"));
}

#[test]
fn test_broken_config_file_exits_four() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[templates]\nconflict = \"merge\"\n").unwrap();

    stencil(temp.path())
        .args(["-c", config.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unknown_config_key() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["config", "get", "defaults.lang"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"))
        .stderr(predicate::str::contains("defaults.module_prefix"));
}

#[test]
fn test_bad_arguments_exit_two() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["new", "x", "--force", "--skip-existing"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_verbose_shows_cause_chain() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["-v", "new", "helm3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Caused by"))
        .stderr(predicate::str::contains("--verbose").not());
}
