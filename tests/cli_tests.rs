// CLI behavior of the piklisp binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn piklisp() -> Command {
    let mut cmd = Command::cargo_bin("piklisp").unwrap();
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn parse_prints_sexpr() {
    piklisp()
        .args(["parse", "tests/fixtures/srfi49/hello.pgo"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(func main () (fmt.Println \"Hello, world!\"))",
        ));
}

#[test]
fn parse_prints_json() {
    piklisp()
        .args(["parse", "--json", "tests/fixtures/classic/hello.pgo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"package\""));
}

#[test]
fn parse_failure_is_reported() {
    piklisp()
        .args(["parse", "tests/fixtures/malformed/unterminated_string.pgo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated_token"));
}

#[test]
fn check_passes_on_clean_suite() {
    piklisp()
        .args(["check", "--no-color", "tests/fixtures/classic", "tests/fixtures/srfi49"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 passed, 0 failed, 5 total"));
}

#[test]
fn check_fails_when_any_unit_fails() {
    piklisp()
        .args(["check", "--no-color"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("5 passed, 4 failed, 9 total"));
}
