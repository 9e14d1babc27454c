//! Command line behaviour of sgfplay
use assert_cmd::Command;

fn sgfplay() -> Command {
    Command::cargo_bin("sgfplay").unwrap()
}

fn stdout_of(args: &[&str]) -> String {
    let assert = sgfplay().args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn cli_prints_state_at_index() {
    let out = stdout_of(&["--size", "9", "--moves", "B:3,3 W:3,4 B:pass", "--index", "2"]);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "move 2: W:3,4");
    assert_eq!(lines[1], "captured: black 0 white 0");
    assert_eq!(lines[2], "bowls: black 0 white 0");
    assert_eq!(lines.len(), 5);
    assert!(lines[3].starts_with("B 3,3 "));
    assert!(lines[4].starts_with("W 3,4 "));
}

#[test]
fn cli_output_is_deterministic() {
    let args = ["--size", "9", "--setup", "B:2,2", "--moves", "B:3,3 W:3,4 B:4,4"];
    assert_eq!(stdout_of(&args), stdout_of(&args));
}

#[test]
fn cli_board_and_capture() {
    let out = stdout_of(&["--size", "5", "--moves", "B:0,1 W:0,0 B:1,0", "--board"]);
    assert!(out.contains("move 3: B:1,0"));
    assert!(out.contains("captured: black 0 white 1"));
    assert!(out.contains("bowls: black 0 white 1"));
    assert!(out.contains(".X...\nX....\n"));
}

#[test]
fn cli_all_reports_cache_totals() {
    let out = stdout_of(&["--size", "9", "--moves", "B:3,3 W:3,4 B:pass", "--index", "0", "--all"]);
    assert!(out.starts_with("move 0: start\n"));
    assert!(out.contains("cache: 1 games, 4 states"));
}

#[test]
fn cli_rejects_bad_input() {
    sgfplay().args(["--moves", "B:3"]).assert().code(2);
    sgfplay().args(["--size", "40"]).assert().code(2);
    sgfplay().args(["--size", "9", "--moves", "B:9,9"]).assert().code(2);
    sgfplay().args(["--moves", "B:3,3", "--index", "2"]).assert().code(2);
    sgfplay().args(["--eccentricity", "0"]).assert().code(2);
    sgfplay().args(["--radius=-1"]).assert().code(2);
}
