use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argweave-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn argweave() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argweave"))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

fn init_project(dir: &Path) {
    let out = argweave()
        .arg("init")
        .arg(dir)
        .arg("--name")
        .arg("tool")
        .output()
        .expect("failed to run argweave init");
    assert_success(&out, "argweave init");
}

fn parse_json(dir: &Path, extra: &[&str], tokens: &[&str]) -> (Output, serde_json::Value) {
    let out = argweave()
        .current_dir(dir)
        .arg("parse")
        .arg("--json")
        .args(extra)
        .arg("--")
        .args(tokens)
        .output()
        .expect("failed to run argweave parse");
    let json = if out.status.success() {
        serde_json::from_slice(&out.stdout).expect("parse --json printed invalid JSON")
    } else {
        serde_json::Value::Null
    };
    (out, json)
}

#[test]
fn help_works() {
    let out = argweave()
        .arg("--help")
        .output()
        .expect("failed to run argweave --help");
    assert_success(&out, "argweave --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("argweave") && stdout.contains("init") && stdout.contains("parse"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn init_writes_schema_once() {
    let dir = make_temp_dir("init-schema");
    init_project(&dir);

    let schema_path = dir.join("argweave.json");
    assert!(schema_path.is_file(), "argweave.json not created");
    let schema: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&schema_path).expect("failed to read schema"))
            .expect("schema is not JSON");
    assert_eq!(schema["schemaVersion"], 1);
    assert_eq!(schema["command"]["name"], "tool");

    let again = argweave()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run argweave init");
    assert!(!again.status.success(), "second init should fail");
    assert!(
        String::from_utf8_lossy(&again.stderr).contains("already exists"),
        "unexpected stderr:\n{}",
        String::from_utf8_lossy(&again.stderr)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_dispatches_to_subcommand_with_literals() {
    let dir = make_temp_dir("parse-dispatch");
    init_project(&dir);

    let (out, json) = parse_json(&dir, &[], &["-v", "rot", "in.txt", "-rot=0x10", "-extra=[a", "b]"]);
    assert_success(&out, "argweave parse");

    let commands = json["commands"].as_array().expect("commands array");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0]["values"]["command"], "rot");
    assert_eq!(commands[0]["values"]["verbose"], true);
    assert_eq!(commands[1]["command"], "rot");
    assert_eq!(commands[1]["values"]["ifile"], "in.txt");
    assert_eq!(commands[1]["values"]["rot"], 16);
    assert_eq!(
        json["leftover"],
        serde_json::json!(["-extra=", "[", "a", "b", "]"])
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_reports_defaults_and_checks_required() {
    let dir = make_temp_dir("parse-required");
    init_project(&dir);

    let (out, json) = parse_json(&dir, &[], &["rot"]);
    assert_success(&out, "argweave parse");
    assert_eq!(json["commands"][1]["values"]["rot"], 13);
    assert_eq!(json["commands"][1]["defaulted"], serde_json::json!(["rot"]));
    assert_eq!(json["commands"][1]["missing"], serde_json::json!(["ifile"]));

    let (out, _) = parse_json(&dir, &["--check-required"], &["rot"]);
    assert!(!out.status.success(), "--check-required should fail");
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("rot: ifile"),
        "unexpected stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_surfaces_literal_syntax_errors() {
    let dir = make_temp_dir("parse-syntax");
    init_project(&dir);

    let (out, _) = parse_json(&dir, &[], &["rot", "{", "abc", "}"]);
    assert!(!out.status.success(), "malformed mapping should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("abc"), "unexpected stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn strict_flag_rejects_unknown_keywords() {
    let dir = make_temp_dir("parse-strict");
    init_project(&dir);

    let (out, _) = parse_json(&dir, &["--strict"], &["rot", "in.txt", "-nope"]);
    assert!(!out.status.success(), "strict parse should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("nope"), "unexpected stderr:\n{stderr}");

    let (out, json) = parse_json(&dir, &[], &["rot", "in.txt", "-nope"]);
    assert_success(&out, "argweave parse");
    assert_eq!(json["leftover"], serde_json::json!(["-nope"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn schema_command_validates_and_normalizes() {
    let dir = make_temp_dir("schema-normalize");
    let schema_path = dir.join("custom.json");
    fs::write(
        &schema_path,
        r#"{ "command": { "name": "x", "args": [ { "name": "n", "type": "int" } ] } }"#,
    )
    .expect("failed to write schema");

    let out = argweave()
        .arg("schema")
        .arg("--schema")
        .arg(&schema_path)
        .output()
        .expect("failed to run argweave schema");
    assert_success(&out, "argweave schema");
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("invalid JSON");
    assert_eq!(json["command"]["args"][0]["kind"], "positional-or-keyword");
    assert_eq!(json["command"]["parser"]["flagPrefix"], "-");

    fs::write(
        &schema_path,
        r#"{ "command": { "name": "x", "args": [ { "name": "n" }, { "name": "n" } ] } }"#,
    )
    .expect("failed to write schema");
    let out = argweave()
        .arg("schema")
        .arg("-s")
        .arg(&schema_path)
        .output()
        .expect("failed to run argweave schema");
    assert!(!out.status.success(), "duplicate args should be rejected");

    let _ = fs::remove_dir_all(&dir);
}
