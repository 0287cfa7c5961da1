use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::path::PathBuf;
use tempfile::TempDir;

const ANIMALS: &str = r#"
[[family]]
[family.root]
name = "Animal"
[[family.root.methods]]
name = "speak"
returns = "str"

[[family.variants]]
name = "Dog"
[[family.variants.methods]]
name = "speak"
returns = "str"
"#;

const CAT: &str = r#"
[[family.variants]]
name = "Cat"
[[family.variants.methods]]
name = "speak"
returns = "str"
params = [{ name = "volume" }]
"#;

fn cmd() -> Command {
    Command::cargo_bin("metamorph").unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn clean_manifest_passes() {
    let dir = TempDir::new().unwrap();
    let manifest = write(&dir, "animals.toml", ANIMALS);
    cmd()
        .arg("check")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(contains("Dog").and(contains("Animal")));
}

#[test]
fn rejected_variant_fails_the_check() {
    let dir = TempDir::new().unwrap();
    let manifest = write(&dir, "animals.toml", &format!("{ANIMALS}{CAT}"));
    cmd()
        .arg("check")
        .arg(&manifest)
        .assert()
        .failure()
        .stdout(contains("Cat").and(contains("does not match the signature")))
        .stderr(contains("1 of 3 classes rejected"));
}

#[test]
fn json_output_lists_every_class() {
    let dir = TempDir::new().unwrap();
    let manifest = write(&dir, "animals.toml", &format!("{ANIMALS}{CAT}"));
    cmd()
        .args(["--output", "json", "check"])
        .arg(&manifest)
        .assert()
        .failure()
        .stdout(contains(r#""rejected": 1"#).and(contains(r#""class": "Cat""#)));
}

#[test]
fn policy_override_is_applied() {
    let dir = TempDir::new().unwrap();
    let manifest = write(
        &dir,
        "typed.toml",
        r#"
[[family]]
[family.root]
name = "Base"
[[family.root.methods]]
name = "run"
params = [{ name = "a" }]

[[family.variants]]
name = "Typed"
[[family.variants.methods]]
name = "run"
params = [{ name = "a", type = "str" }]
"#,
    );
    cmd().arg("check").arg(&manifest).assert().failure();

    let policy = write(&dir, "policy.toml", "allow_mixed_typing = true\n");
    cmd()
        .arg("check")
        .arg(&manifest)
        .arg("--policy")
        .arg(&policy)
        .assert()
        .success();
}

#[test]
fn missing_manifest_is_an_error() {
    cmd()
        .args(["check", "/nonexistent/families.toml"])
        .assert()
        .failure()
        .stderr(contains("Configuration error"));
}

#[test]
fn demo_runs() {
    cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(contains("Woof").and(contains("a dog called Rex")));
}
