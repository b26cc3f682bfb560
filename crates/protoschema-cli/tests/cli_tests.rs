//! Integration tests for the protoschema CLI
//!
//! These tests invoke the actual protoschema-cli binary and verify:
//! - Exit codes (0 = success, 1 = incompatible / invalid / different, 2 = error)
//! - stdout/stderr output
//! - JSON output format
//! - Configuration file and flag precedence

use std::path::PathBuf;
use std::process::Command;

// ── Helpers ───────────────────────────────────────────────

fn protoschema_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_protoschema-cli"))
}

fn fixture(path: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(path)
        .to_str()
        .unwrap()
        .to_string()
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(protoschema_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute protoschema-cli")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let out = stdout(&output);
    assert!(out.contains("protoschema"), "should contain 'protoschema'");
    assert!(out.contains(env!("CARGO_PKG_VERSION")), "should contain version");
    assert!(
        out.contains(&format!("protoschema-core {}", protoschema_core::VERSION)),
        "should report the library version"
    );
}

#[test]
fn test_version_flag() {
    let output = run(&["--version"]);
    assert!(output.status.success(), "--version should exit 0");
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ── Compatibility check ───────────────────────────────────

#[test]
fn test_check_message_added_is_compatible() {
    let output = run(&[
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-added.proto"),
    ]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("is compatible"));
    assert!(out.contains("message_added"));
}

#[test]
fn test_check_message_removed_is_breaking() {
    let output = run(&[
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-removed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("1 violation(s)"));
    assert!(out.contains("message_removed: message LineItem"));
}

#[test]
fn test_check_enum_value_renamed_is_breaking() {
    let output = run(&[
        &fixture("compat/before.proto"),
        &fixture("compat/after-enum-value-renamed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("enum_value_name_changed in OrderStatus"));
}

#[test]
fn test_check_reformatted_is_compatible() {
    let output = run(&[
        &fixture("compat/before.proto"),
        &fixture("compat/after-reformatted.proto"),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("0 allowed change(s)"));
}

#[test]
fn test_check_subcommand_matches_positional_form() {
    let before = fixture("compat/before.proto");
    let after = fixture("compat/after-message-removed.proto");
    let positional = run(&[&before, &after]);
    let subcommand = run(&["check", &before, &after]);
    assert_eq!(positional.status.code(), subcommand.status.code());
    assert_eq!(stdout(&positional), stdout(&subcommand));
}

#[test]
fn test_check_strict_rejects_additions() {
    let output = run(&[
        "--strict",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-added.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_check_allow_flag_widens_allow_list() {
    let output = run(&[
        "--allow",
        "message_removed",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-removed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
}

#[test]
fn test_check_unknown_allow_kind_is_usage_error() {
    let output = run(&[
        "--allow",
        "message_renamed",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-removed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_check_json_output() {
    let output = run(&[
        "--json",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-removed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    assert_eq!(value["compatible"], false);
    assert_eq!(value["allowed_kinds"], serde_json::json!(["message_added"]));
    assert_eq!(value["violations"][0]["kind"], "message_removed");
    assert_eq!(value["violations"][0]["before"]["name"], "LineItem");
    assert!(value["violations"][0]["after"].is_null());
}

#[test]
fn test_check_quiet_prints_nothing() {
    let output = run(&[
        "--quiet",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-removed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty(), "quiet mode should produce no stdout");
}

#[test]
fn test_check_parse_error_exits_2() {
    let output = run(&[
        &fixture("compat/before.proto"),
        &fixture("invalid/unterminated-string.proto"),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("error"), "should mention error");
    assert!(err.contains("unterminated-string.proto"), "should name the file");
}

#[test]
fn test_check_missing_after_exits_2() {
    let output = run(&[&fixture("compat/before.proto")]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_check_nonexistent_file_exits_2() {
    let output = run(&[&fixture("compat/before.proto"), "nonexistent.proto"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("failed to read"));
}

// ── Configuration ─────────────────────────────────────────

#[test]
fn test_config_file_strict() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("gate.toml");
    std::fs::write(&config, "[compatibility]\nstrict = true\n").expect("write config");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-added.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_file_allowed_kinds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("gate.toml");
    std::fs::write(
        &config,
        "[compatibility]\nallowed = [\"message_added\", \"enum_value_name_changed\"]\n",
    )
    .expect("write config");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        &fixture("compat/before.proto"),
        &fixture("compat/after-enum-value-renamed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_config_from_working_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("protoschema.toml"), "[compatibility]\nstrict = true\n")
        .expect("write config");

    let output = Command::new(protoschema_bin())
        .args([
            &fixture("compat/before.proto"),
            &fixture("compat/after-message-added.proto"),
        ])
        .current_dir(dir.path())
        .output()
        .expect("failed to execute protoschema-cli");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_missing_file_exits_2() {
    let output = run(&[
        "--config",
        "/nonexistent/gate.toml",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-added.proto"),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("configuration"));
}

// ── Validate ──────────────────────────────────────────────

#[test]
fn test_validate_valid_schema() {
    let output = run(&["validate", &fixture("valid/minimal.proto")]);
    assert!(output.status.success(), "valid schema should exit 0");
    assert!(stdout(&output).contains("valid"), "should mention valid");
}

#[test]
fn test_validate_invalid_schema() {
    let output = run(&["validate", &fixture("invalid/bad-range.proto")]);
    assert_eq!(output.status.code(), Some(1), "invalid schema should exit 1");
    assert!(stderr(&output).contains("error"), "should mention error");
}

#[test]
fn test_validate_nonexistent_file() {
    let output = run(&["validate", "nonexistent.proto"]);
    assert_eq!(output.status.code(), Some(2), "missing file should exit 2");
}

#[test]
fn test_validate_json_output() {
    let output = run(&["validate", "--json", &fixture("valid/everything.proto")]);
    assert!(output.status.success());
    let value = json(&output);
    assert_eq!(value["valid"], true);
    assert_eq!(
        value["imports"],
        serde_json::json!(["foo.proto", "bar/baz.proto", "bat.proto"])
    );
    assert_eq!(value["declarations"], 4);
}

#[test]
fn test_validate_json_invalid() {
    let output = run(&["validate", "--json", &fixture("invalid/unterminated-string.proto")]);
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    assert_eq!(value["valid"], false);
    assert_eq!(value["line"], 3);
}

#[test]
fn test_deeply_nested_schema_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let deep = dir.path().join("deep.proto");
    let depth = 3000;
    std::fs::write(
        &deep,
        format!(
            "syntax = \"proto3\";\n{}{}",
            "message a {".repeat(depth),
            "}".repeat(depth)
        ),
    )
    .expect("write schema");
    let deep = deep.to_str().unwrap();

    let output = run(&["validate", deep]);
    assert_eq!(output.status.code(), Some(1), "too deep should be invalid, not a crash");
    assert!(stderr(&output).contains("Nesting deeper than"));

    let output = run(&[deep, deep]);
    assert_eq!(output.status.code(), Some(2), "gate should report a parse error");
}

#[test]
fn test_validate_quiet_valid() {
    let output = run(&["validate", "--quiet", &fixture("valid/minimal.proto")]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty(), "quiet mode should produce no stdout");
}

#[test]
fn test_all_valid_fixtures_validate() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/valid");
    for entry in std::fs::read_dir(&dir).expect("read dir") {
        let path = entry.expect("entry").path();
        if path.extension().is_some_and(|e| e == "proto") {
            let output = run(&["validate", path.to_str().unwrap()]);
            assert!(output.status.success(), "fixture {:?} should validate", path.file_name());
        }
    }
}

#[test]
fn test_all_invalid_fixtures_fail() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/invalid");
    for entry in std::fs::read_dir(&dir).expect("read dir") {
        let path = entry.expect("entry").path();
        if path.extension().is_some_and(|e| e == "proto") {
            let output = run(&["validate", path.to_str().unwrap()]);
            assert_eq!(
                output.status.code(),
                Some(1),
                "fixture {:?} should fail validation",
                path.file_name()
            );
        }
    }
}

// ── Fmt ───────────────────────────────────────────────────

#[test]
fn test_fmt_outputs_to_stdout() {
    let output = run(&["fmt", &fixture("valid/minimal.proto")]);
    assert!(output.status.success(), "fmt should exit 0");
    assert_eq!(
        stdout(&output),
        "syntax = \"proto3\";\n\nmessage Ping {\n  string id = 1;\n}\n"
    );
}

#[test]
fn test_fmt_keeps_comments() {
    let output = run(&["fmt", &fixture("compat/before.proto")]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("// Lifecycle of an order"));
}

#[test]
fn test_fmt_write_flag() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("messy.proto");
    std::fs::write(&path, "syntax='proto3';message   Ping{string id=1;}").expect("write temp");

    let output = run(&["fmt", "--write", path.to_str().unwrap()]);
    assert!(output.status.success(), "fmt --write should exit 0");

    let formatted = std::fs::read_to_string(&path).expect("read formatted");
    assert_eq!(
        formatted,
        "syntax = 'proto3';\n\nmessage Ping {\n  string id = 1;\n}\n"
    );
}

// ── Normalize ─────────────────────────────────────────────

#[test]
fn test_normalize_drops_comments() {
    let output = run(&["normalize", &fixture("compat/before.proto")]);
    assert!(output.status.success(), "normalize should exit 0");
    let out = stdout(&output);
    assert!(out.contains("enum OrderStatus {"));
    assert!(!out.contains("Lifecycle"), "comments should be dropped");
}

#[test]
fn test_normalize_invalid_schema() {
    let output = run(&["normalize", &fixture("invalid/missing-syntax.proto")]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_normalize_idempotent() {
    let first = run(&["normalize", &fixture("valid/everything.proto")]);
    assert!(first.status.success());
    let canonical = stdout(&first);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("canonical.proto");
    std::fs::write(&path, &canonical).expect("write temp");

    let second = run(&["normalize", path.to_str().unwrap()]);
    assert!(second.status.success());
    assert_eq!(canonical, stdout(&second), "normalize must be idempotent");
}

// ── Hash ──────────────────────────────────────────────────

#[test]
fn test_hash_valid_schema() {
    let output = run(&["hash", &fixture("valid/minimal.proto")]);
    assert!(output.status.success(), "hash should exit 0");
    let hash = stdout(&output).trim().to_string();
    assert_eq!(hash.len(), 64, "SHA-256 hash should be 64 hex chars");
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_ignores_cosmetic_changes() {
    let before = run(&["hash", &fixture("compat/before.proto")]);
    let reformatted = run(&["hash", &fixture("compat/after-reformatted.proto")]);
    let added = run(&["hash", &fixture("compat/after-message-added.proto")]);
    assert_eq!(stdout(&before), stdout(&reformatted));
    assert_ne!(stdout(&before), stdout(&added));
}

// ── Diff ──────────────────────────────────────────────────

#[test]
fn test_diff_identical_files() {
    let path = fixture("compat/before.proto");
    let output = run(&["diff", &path, &path]);
    assert!(output.status.success(), "diff of same file should exit 0");
    assert!(stdout(&output).contains("identical"));
}

#[test]
fn test_diff_different_files() {
    let output = run(&[
        "diff",
        &fixture("compat/before.proto"),
        &fixture("compat/after-enum-value-renamed.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1), "different files should exit 1");
    let out = stdout(&output);
    assert!(out.contains("---"), "should contain diff markers");
    assert!(out.contains("+++"), "should contain diff markers");
    assert!(out.contains(
        "enum_value_name_changed in OrderStatus: enum value ORDER_STATUS_SHIPPED = 2 -> enum value ORDER_STATUS_DISPATCHED = 2"
    ));
}

#[test]
fn test_diff_json_output() {
    let output = run(&[
        "diff",
        "--json",
        &fixture("compat/before.proto"),
        &fixture("compat/after-message-added.proto"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    assert_eq!(value["identical"], false);
    assert_eq!(value["diffs"].as_array().unwrap().len(), 1);
    assert_eq!(value["diffs"][0]["kind"], "message_added");
    assert_eq!(value["diffs"][0]["scope"], "");
}

// ── Determinism: CLI output ───────────────────────────────

#[test]
fn test_cli_check_determinism_100_iterations() {
    let before = fixture("compat/before.proto");
    let after = fixture("compat/after-enum-value-renamed.proto");

    let first = stdout(&run(&["--json", &before, &after]));
    for i in 0..100 {
        let output = stdout(&run(&["--json", &before, &after]));
        assert_eq!(first, output, "check --json determinism failure at iteration {}", i);
    }
}
