//! Integration tests for stencil-cli.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

/// `stencil` running inside `dir`, with HOME and the XDG config dir pointed at
/// it so no user configuration leaks in.
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
fn test_help_flag() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stencil renders"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_new_command_help() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .args(["new", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--module"))
        .stdout(predicate::str::contains("--skip-existing"))
        .stdout(predicate::str::contains("--template-dir"));
}

#[test]
fn test_new_plugin_success() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args([
            "new",
            "helm3",
            "--module",
            "get.porter.sh/mixin/helm3",
            "--author-email",
            "sec@example.com",
        ])
        .assert()
        .success();

    let root = temp.path().join("helm3");
    let security = fs::read_to_string(root.join("pkg/helm3/security.txt")).unwrap();
    assert!(security.contains("Contact: mailto:sec@example.com"));

    let go_mod = fs::read_to_string(root.join("go.mod")).unwrap();
    assert!(go_mod.starts_with("module get.porter.sh/mixin/helm3"));

    assert!(root.join("cmd/helm3/main.go").is_file());
    assert!(root.join(".github/workflows/helm3.yml").is_file());
    assert!(!root.join("pkg/helm3/template").exists());
}

#[test]
fn test_new_respects_output_dir() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["new", "mysample", "-m", "github.com/acme/mysample", "-o", "work/out"])
        .assert()
        .success();

    assert!(temp.path().join("work/out/pkg/mysample/mysample.go").is_file());
    assert!(!temp.path().join("mysample").exists());
}

#[test]
fn test_new_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .args(["new", "helm3", "-m", "get.porter.sh/mixin/helm3", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkg/helm3/security.txt"));

    assert!(!temp.path().join("helm3").exists());
}

#[test]
fn test_new_dry_run_json() {
    let temp = TempDir::new().unwrap();

    let out = stencil(temp.path())
        .args([
            "--output-format",
            "json",
            "new",
            "helm3",
            "-m",
            "get.porter.sh/mixin/helm3",
            "--dry-run",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 16);
    assert!(rows.iter().any(|r| r["path"] == "go.mod" && r["source"] == "go.mod.tmpl"));
}

#[test]
fn test_new_json_manifest() {
    let temp = TempDir::new().unwrap();

    let out = stencil(temp.path())
        .args([
            "--output-format",
            "json",
            "new",
            "helm3",
            "-m",
            "get.porter.sh/mixin/helm3",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let manifest: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let files = manifest["files"].as_array().unwrap();
    assert_eq!(files.len(), 16);
    assert!(files.iter().all(|f| f["outcome"] == "created"));
}

#[test]
fn test_module_prefix_from_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("stencil.toml");
    fs::write(&config, "[defaults]\nmodule_prefix = \"github.com/acme\"\n").unwrap();

    stencil(temp.path())
        .args(["-c", config.to_str().unwrap(), "new", "widget"])
        .assert()
        .success();

    let go_mod = fs::read_to_string(temp.path().join("widget/go.mod")).unwrap();
    assert!(go_mod.starts_with("module github.com/acme/widget"));
}

#[test]
fn test_module_prefix_from_environment() {
    let temp = TempDir::new().unwrap();

    stencil(temp.path())
        .env("STENCIL_DEFAULTS__MODULE_PREFIX", "example.org/plugins")
        .args(["new", "widget"])
        .assert()
        .success();

    let go_mod = fs::read_to_string(temp.path().join("widget/go.mod")).unwrap();
    assert!(go_mod.starts_with("module example.org/plugins/widget"));
}

#[test]
fn test_new_from_template_dir() {
    let temp = TempDir::new().unwrap();
    let tpl = temp.path().join("tpl");
    fs::create_dir_all(tpl.join("pkg/template")).unwrap();
    fs::write(
        tpl.join("pkg/template/security.txt.tmpl"),
        "Contact: mailto:{{ AuthorEmail | default \"security@example.com\" }}\n",
    )
    .unwrap();
    fs::write(tpl.join("NOTES"), "{{ not rendered }}").unwrap();

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
        .success();

    let root = temp.path().join("mysample");
    assert_eq!(
        fs::read_to_string(root.join("pkg/security.txt")).unwrap(),
        "Contact: mailto:security@example.com\n"
    );
    assert_eq!(fs::read_to_string(root.join("NOTES")).unwrap(), "{{ not rendered }}");
}

#[test]
fn test_skip_existing_keeps_user_edits() {
    let temp = TempDir::new().unwrap();
    let args = ["new", "helm3", "-m", "get.porter.sh/mixin/helm3"];

    stencil(temp.path()).args(args).assert().success();
    let readme = temp.path().join("helm3/README.md");
    fs::write(&readme, "edited").unwrap();

    stencil(temp.path())
        .args(args)
        .arg("--skip-existing")
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&readme).unwrap(), "edited");

    stencil(temp.path()).args(args).arg("--force").assert().success();
    assert_ne!(fs::read_to_string(&readme).unwrap(), "edited");
}

// ── list ──────────────────────────────────────────────────────────────────────

#[test]
fn test_list_table() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Template 'plugin' (16 entries)"))
        .stdout(predicate::str::contains("scripts/install.sh.tmpl"));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let out = stencil(temp.path())
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 16);
    let install = entries
        .iter()
        .find(|e| e["source"] == "scripts/install.sh.tmpl")
        .unwrap();
    assert_eq!(install["output"], "scripts/install.sh");
    assert_eq!(install["parameterized"], true);
}

#[test]
fn test_list_csv_has_header() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "source,output,parameterized,mode,bytes,fields\n",
        ));
}

// ── completions ───────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_stencil"));
}

// ── init / config ─────────────────────────────────────────────────────────────

#[test]
fn test_init_local_creates_file() {
    let temp = TempDir::new().unwrap();
    stencil(temp.path())
        .args(["init", "--local"])
        .assert()
        .success();

    let text = fs::read_to_string(temp.path().join(".stencil.toml")).unwrap();
    assert!(text.contains("[templates]"));
    assert!(text.contains("conflict = \"fail\""));
}

#[test]
fn test_init_local_keeps_existing_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".stencil.toml");
    fs::write(&path, "# mine\n").unwrap();

    stencil(temp.path())
        .args(["init", "--local"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

    stencil(temp.path())
        .args(["init", "--local", "--force"])
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&path).unwrap(), "# mine\n");
}

#[test]
fn test_config_set_then_get() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("cfg.toml");
    let config = config.to_str().unwrap();

    stencil(temp.path())
        .args(["-c", config, "config", "set", "defaults.author_name", "Ada"])
        .assert()
        .failure()
        .code(4);

    // `-c` needs an existing file; create it first.
    fs::write(config, "").unwrap();
    stencil(temp.path())
        .args(["-c", config, "config", "set", "defaults.author_name", "Ada"])
        .assert()
        .success();

    stencil(temp.path())
        .args(["-c", config, "config", "get", "defaults.author_name"])
        .assert()
        .success()
        .stdout("Ada\n");
}

#[test]
fn test_config_path_prefers_explicit_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("cfg.toml");
    fs::write(&config, "").unwrap();

    stencil(temp.path())
        .args(["-c", config.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfg.toml"));
}
