//! `storygen run` integration tests: exit codes, stderr messages and the
//! rendered document on stdout.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A storygen command with an isolated HOME (no user config) running in `cwd`.
fn storygen(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("storygen").expect("storygen binary");
    cmd.env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("STORYGEN_TEMPLATES")
        .current_dir(cwd);
    cmd
}

struct Fixture {
    home: TempDir,
    project: TempDir,
    templates: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("home dir"),
            project: TempDir::new().expect("project dir"),
            templates: TempDir::new().expect("templates dir"),
        }
    }

    fn project_file(&self, rel: &str, content: &str) {
        let path = self.project.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write project file");
    }

    fn template(&self, name: &str, content: &str) {
        fs::write(self.templates.path().join(format!("{name}.md")), content)
            .expect("write template");
    }

    fn cmd(&self) -> Command {
        let mut cmd = storygen(self.home.path(), self.project.path());
        cmd.arg("run").arg("--templates").arg(self.templates.path());
        cmd
    }
}

#[test]
fn missing_template_name_prints_usage() {
    let fx = Fixture::new();

    let assert = fx.cmd().assert().code(1).stdout(predicate::str::is_empty());

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.lines().count(), 2, "stderr was: {stderr}");
    assert!(stderr.starts_with("Usage: storygen run <template-name>"));
}

#[test]
fn missing_project_context_is_fatal_and_silent_on_stdout() {
    let fx = Fixture::new();
    fx.template("scene", "---\ntitle: Scene\n---\nWrite.\n");

    fx.cmd()
        .args(["scene", "a", "prompt"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Project context not found"))
        .stderr(predicate::str::contains("You must have inc/main.md"));
}

#[test]
fn missing_template_is_fatal() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "MAIN\n");

    fx.cmd()
        .arg("ghost")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn renders_document_to_stdout() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "---\nincludes:\n  - lore/world.md\n---\nMAIN\n");
    fx.project_file("lore/world.md", "WORLD\n");
    fx.project_file(
        "inc/steg.md",
        "---\naliases:\n  - execon\nrelated_concepts:\n  - heist\n---\nSTEG\n",
    );
    fx.project_file("inc/heist.md", "HEIST\n");
    fx.template(
        "scene",
        "---\nincludes:\n  - inc/main.md\n---\nWrite the scene.\n",
    );

    fx.cmd()
        .args(["scene", "Tell", "me", "about", "execon."])
        .assert()
        .success()
        .stdout(
            "WORLD\n\n\nMAIN\n\n\nSTEG\n\n\nHEIST\n\n\nWrite the scene.\n\
             \n\n## User Request\n\nTell me about execon.\n\n",
        );

    let log = fs::read_to_string(fx.project.path().join("storygen.log")).expect("event log");
    assert!(log.lines().any(|l| l.contains(" start")));
    assert!(log.lines().any(|l| l.contains(" concept_matching matches=[\"inc/steg.md\"]")));
    assert!(log.lines().any(|l| l.contains(" output bytes=")));
}

#[test]
fn missing_include_warns_on_stderr_and_renders() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "MAIN\n");
    fx.template("scene", "---\nincludes:\n  - inc/ghost.md\n---\nBody\n");

    fx.cmd()
        .arg("scene")
        .assert()
        .success()
        .stdout("MAIN\n\n\nBody\n\n")
        .stderr(predicate::str::contains("Include file not found: inc/ghost.md"));
}

#[test]
fn prompt_words_may_look_like_flags() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "MAIN\n");
    fx.template("scene", "Body\n");

    fx.cmd()
        .args(["--no-event-log", "scene", "-v", "dragons"])
        .assert()
        .success()
        .stdout("MAIN\n\n\nBody\n\n\n## User Request\n\n-v dragons\n\n");

    fx.cmd()
        .args(["--no-event-log", "scene", "--help", "me"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("## User Request\n\n--help me\n\n"));
}

#[test]
fn usage_is_shown_before_config_is_read() {
    let fx = Fixture::new();
    let config_dir = fx.home.path().join(".storygen");
    fs::create_dir_all(&config_dir).expect("config dir");
    fs::write(config_dir.join("storygen.toml"), "[paths\nbroken = ").expect("write config");

    let assert = fx.cmd().assert().code(1);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.starts_with("Usage: storygen run <template-name>"), "stderr was: {stderr}");
}

#[test]
fn warnings_reach_stderr_whatever_the_log_filter() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "MAIN\n");
    fx.template("scene", "---\nincludes:\n  - inc/ghost.md\n---\nBody\n");

    fx.cmd()
        .env("RUST_LOG", "error")
        .arg("scene")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: Include file not found: inc/ghost.md"));

    let log = fs::read_to_string(fx.project.path().join("storygen.log")).expect("event log");
    assert!(log.lines().any(|l| l.contains(" warning message=Include file not found: inc/ghost.md")));
}

#[test]
fn no_event_log_flag_skips_log_file() {
    let fx = Fixture::new();
    fx.project_file("inc/main.md", "MAIN\n");
    fx.template("plain", "Plain.\n");

    fx.cmd()
        .args(["--no-event-log", "plain"])
        .assert()
        .success()
        .stdout("MAIN\n\n\nPlain.\n\n");

    assert!(!fx.project.path().join("storygen.log").exists());
}

#[test]
fn config_show_prints_defaults() {
    let fx = Fixture::new();

    storygen(fx.home.path(), fx.project.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("include_dir = \"inc\""))
        .stdout(predicate::str::contains("## User Request"));
}
