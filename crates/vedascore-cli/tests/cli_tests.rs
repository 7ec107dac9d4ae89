//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, run inside `dir` with no config or overrides leaking in.
fn vedascore(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("vedascore").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("VEDASCORE_BASE_URL")
        .env_remove("VEDASCORE_COOKIE");
    cmd
}

const SCENARIO: &str = "### Question 1\nWhat is 2+2?\na) 3\nb) 4\nCorrect Answer: b";

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("coding-education platform"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vedascore"));
}

#[test]
fn quiz_from_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("quiz.md"), SCENARIO).unwrap();

    vedascore(&dir)
        .arg("quiz")
        .arg("quiz.md")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<span class=\"quiz-option quiz-option-correct\">b) 4</span>",
        ))
        .stdout(predicate::str::contains("<span class=\"quiz-option\">a) 3</span>"))
        .stdout(predicate::str::contains("Correct Answer: B"));
}

#[test]
fn quiz_from_stdin() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .arg("quiz")
        .write_stdin("### Important Exam Questions\n- Define <recursion>\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<h3>Important Exam Questions</h3>"))
        .stdout(predicate::str::contains("quiz-options").not());
}

#[test]
fn quiz_missing_file() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .arg("quiz")
        .arg("nope.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to read quiz"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created vedascore.toml"));

    let written = std::fs::read_to_string(dir.path().join("vedascore.toml")).unwrap();
    assert!(written.contains("base_url = \"http://localhost:5000\""));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir).arg("init").assert().success();
    vedascore(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "base_url = \"ftp://example.com\"\n").unwrap();

    vedascore(&dir)
        .args(["--config", "bad.toml", "feed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url must start with http"));
}

#[test]
fn missing_config_rejected() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--config", "absent.toml", "--demo", "feed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn demo_feed() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "feed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Study group 3"))
        .stdout(predicate::str::contains("More posts").not());
}

#[test]
fn demo_submissions_and_leaderboard() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "submissions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ravi@example.edu"))
        .stdout(predicate::str::contains("Loops: 2 submissions"))
        .stdout(predicate::str::contains("Strings: 1 submission"));

    vedascore(&dir)
        .args(["--demo", "leaderboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ravi"))
        .stdout(predicate::str::contains("2025-03-01"));
}

#[test]
fn demo_delete_asks_first() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "delete", "101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from Asha for \"Loops\""))
        .stdout(predicate::str::contains("Re-run with --yes"));
    assert!(!dir.path().join(".vedascore").exists());
}

#[test]
fn demo_delete_confirmed() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "delete", "101", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submission deleted successfully"));

    let store =
        std::fs::read_to_string(dir.path().join(".vedascore/local-storage.json")).unwrap();
    assert!(store.contains("\"101\""));

    // The demo server forgets the delete, the local list does not.
    vedascore(&dir)
        .args(["--demo", "submissions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loops: 1 submission"));
}

#[test]
fn demo_delete_unknown_submission() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "delete", "999", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("submission 999 not found"));
}

#[test]
fn delete_reports_unreachable_server() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("vedascore.toml"),
        "base_url = \"http://127.0.0.1:9\"\ntimeout_secs = 5\n",
    )
    .unwrap();

    vedascore(&dir)
        .args(["delete", "5", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: failed to load submissions: network error",
        ))
        .stderr(predicate::str::contains("submission 5 not found").not());
}

#[test]
fn demo_plagiarism() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "plagiarism", "--submission", "102"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Potential Plagiarism Detected"))
        .stdout(predicate::str::contains("82.5%"))
        .stdout(predicate::str::contains("high"));

    vedascore(&dir)
        .args(["--demo", "plagiarism", "--assignment", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plagiarism Analysis for: Strings"))
        .stdout(predicate::str::contains("No Significant Plagiarism Detected!"));
}

#[test]
fn plagiarism_needs_a_target() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "plagiarism"])
        .assert()
        .failure();
}

#[test]
fn demo_student_and_analytics() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "student", "--feedback"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 assignments completed."))
        .stdout(predicate::str::contains("Good progress."));

    vedascore(&dir)
        .args(["--demo", "analytics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50%"))
        .stdout(predicate::str::contains("128ms"));

    vedascore(&dir)
        .args(["--demo", "analytics", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"polarArea\""));
}

#[test]
fn demo_assignments_split_by_due_date() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "assignments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Live assignments"))
        .stdout(predicate::str::contains("2099-01-01"))
        .stdout(predicate::str::contains("Past assignments"));
}

#[test]
fn demo_tool_convert() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hello.py"), "print('hi')\n").unwrap();

    vedascore(&dir)
        .args(["--demo", "tool", "convert", "hello.py", "--to", "Java"])
        .assert()
        .success()
        .stdout(predicate::str::contains("// Java"));

    vedascore(&dir)
        .args(["--demo", "tool", "convert", "hello.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a target language"));
}

#[test]
fn unknown_tool_rejected() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "tool", "lint", "hello.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tool 'lint'"));
}

#[test]
fn demo_page_instructor_with_actions() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args([
            "--demo",
            "page",
            "instructor",
            "--action",
            "instructor.check_plagiarism submission_id=102",
            "--output",
            "instructor.html",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote instructor.html"));

    let html = std::fs::read_to_string(dir.path().join("instructor.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<section id=\"leaderboard-body\">"));
    assert!(html.contains("82.5% similar"));
}

#[test]
fn demo_page_community_comment() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args([
            "--demo",
            "page",
            "community",
            "--action",
            "community.toggle_comments post_id=1",
            "--action",
            "community.comment post_id=1 content=Nice notes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote vedascore-community.html"));

    let html = std::fs::read_to_string(dir.path().join("vedascore-community.html")).unwrap();
    assert!(html.contains("Study group 1"));
    assert!(html.contains("Nice notes"));
}

#[test]
fn page_unknown_action_fails() {
    let dir = TempDir::new().unwrap();
    vedascore(&dir)
        .args(["--demo", "page", "editor", "--action", "editor.format"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action: editor.format"));
}
