//! End-to-end behaviour of `Interpreter::execute` with real programs.

use bangsh::{History, Interpreter, Outcome};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Session {
    sh: Interpreter,
    history: History,
    dir: TempDir,
}

impl Session {
    /// A shell whose programs start in a fresh scratch directory.
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sh = Interpreter::default();
        sh.env_mut().current_dir = fs::canonicalize(dir.path()).unwrap();
        Self {
            sh,
            history: History::new(),
            dir,
        }
    }

    /// Submit a line the way the read loop does: record it, then run it.
    fn submit(&mut self, line: &str) -> Outcome {
        self.history.append(line);
        self.sh.execute(line, &self.history)
    }

    fn path(&self, name: &str) -> PathBuf {
        fs::canonicalize(self.dir.path()).unwrap().join(name)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap_or_default()
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn pipeline_carries_left_output_to_right_input() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));

    let outcome = s.submit(&format!("printf alpha\\nbeta\\n | tee {}", sink));

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(s.read("sink"), "alpha\nbeta\n");
}

#[test]
fn pipeline_without_spaces_around_pipe() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));

    s.submit(&format!("printf abc|tee {}", sink));

    assert_eq!(s.read("sink"), "abc");
}

#[test]
fn three_stage_pipeline() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));

    let outcome = s.submit(&format!("printf c\\na\\nb\\n | sort | tee {}", sink));

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(s.read("sink"), "a\nb\nc\n");
}

#[test]
fn failing_pipeline_still_continues() {
    let mut s = Session::new();
    assert_eq!(s.submit("false | true"), Outcome::Continue);
    assert_eq!(s.submit("no-such-program-for-bangsh | cat"), Outcome::Continue);
}

#[test]
fn builtin_output_flows_through_pipe() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));
    s.submit("echo one");
    s.submit("echo two");

    s.submit(&format!("history | tee {}", sink));

    let expected = format!(" 0: history | tee {}\n 1: echo two\n 2: echo one\n", sink);
    assert_eq!(s.read("sink"), expected);
}

#[test]
fn large_builtin_output_does_not_stall_pipeline() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));
    for i in 0..5000 {
        s.history.append(&format!("echo this is history line number {}", i));
    }

    assert_eq!(s.submit(&format!("history | tee {}", sink)), Outcome::Continue);

    assert_eq!(s.read("sink").lines().count(), 5001);
}

#[test]
fn lone_pipe_is_a_usage_error() {
    let mut s = Session::new();
    assert_eq!(s.submit("|"), Outcome::Error(2));
    assert_eq!(s.submit("| cat"), Outcome::Error(2));
    assert_eq!(s.submit("true | | cat"), Outcome::Error(2));
}

#[test]
fn exit_spawns_nothing() {
    let mut s = Session::new();
    assert_eq!(s.submit("exit"), Outcome::Exit);
}

#[test]
fn bang_zero_reruns_first_command() {
    let mut s = Session::new();
    let a = display(&s.path("a"));
    let b = display(&s.path("b"));
    s.submit(&format!("touch {}", a));
    s.submit(&format!("touch {}", b));
    fs::remove_file(&a).unwrap();
    fs::remove_file(&b).unwrap();

    assert_eq!(s.submit("!0"), Outcome::Continue);

    assert!(Path::new(&a).exists());
    assert!(!Path::new(&b).exists());
}

#[test]
fn recall_output_can_feed_a_pipeline() {
    let mut s = Session::new();
    let sink = display(&s.path("sink"));
    s.submit("echo a");
    s.submit("echo b");

    s.submit(&format!("!0 | tee {}", sink));

    assert_eq!(s.read("sink"), "a\n");
}

#[test]
fn double_bang_twice_recalls_same_command() {
    let mut s = Session::new();
    let marker = display(&s.path("marker"));
    s.submit(&format!("touch {}", marker));

    for _ in 0..2 {
        fs::remove_file(&marker).unwrap();
        assert_eq!(s.submit("!!"), Outcome::Continue);
        assert!(Path::new(&marker).exists());
    }
}

#[test]
fn recall_with_empty_history_continues() {
    let mut s = Session::new();
    assert_eq!(s.submit("!!"), Outcome::Continue);
    assert_eq!(s.submit("!7"), Outcome::Continue);
}

#[test]
fn recalled_exit_does_not_end_the_shell() {
    let mut s = Session::new();
    assert_eq!(s.submit("exit"), Outcome::Exit);

    assert_eq!(s.submit("!0"), Outcome::Continue);
    assert_eq!(s.submit("!!"), Outcome::Continue);
    assert!(!s.sh.env().should_exit);
}

#[test]
fn recalled_malformed_line_continues() {
    let mut s = Session::new();
    assert_eq!(s.submit("|"), Outcome::Error(2));

    assert_eq!(s.submit("!0"), Outcome::Continue);
}

#[test]
fn recalled_failing_command_continues() {
    let mut s = Session::new();
    s.submit("no-such-program-for-bangsh");
    s.submit("false");

    assert_eq!(s.submit("!0"), Outcome::Continue);
    assert_eq!(s.submit("!!"), Outcome::Continue);
}

#[test]
fn every_line_is_recorded() {
    let mut s = Session::new();
    s.submit("true");
    s.submit("no-such-program-for-bangsh");
    s.submit("!!");
    s.submit("history");

    let texts: Vec<_> = s.history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(
        texts,
        ["true", "no-such-program-for-bangsh", "!!", "history"]
    );
}

#[test]
#[serial]
fn cd_without_argument_goes_home() {
    let orig = std::env::current_dir().unwrap();
    let mut s = Session::new();
    let home = fs::canonicalize(s.dir.path()).unwrap();
    s.sh.env_mut().set_var("HOME", display(&home));

    assert_eq!(s.submit("cd"), Outcome::Continue);
    let now = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
    std::env::set_current_dir(&orig).unwrap();

    assert_eq!(now, home);
    assert_eq!(s.sh.env().current_dir, home);
}

#[test]
#[serial]
fn cd_without_home_stays_in_place() {
    let orig = std::env::current_dir().unwrap();
    let mut s = Session::new();
    let start = s.sh.env().current_dir.clone();
    s.sh.env_mut().remove_var("HOME");

    assert_eq!(s.submit("cd ~"), Outcome::Continue);
    std::env::set_current_dir(&orig).unwrap();

    assert_eq!(s.sh.env().current_dir, start);
}

#[test]
#[serial]
fn cd_to_missing_directory_changes_nothing() {
    let orig = std::env::current_dir().unwrap();
    let mut s = Session::new();
    let start = s.sh.env().current_dir.clone();

    assert_eq!(s.submit("cd definitely-missing-directory"), Outcome::Continue);

    assert_eq!(std::env::current_dir().unwrap(), orig);
    assert_eq!(s.sh.env().current_dir, start);
}

#[test]
#[serial]
fn cd_inside_pipeline_is_local_to_the_stage() {
    let orig = std::env::current_dir().unwrap();
    let mut s = Session::new();
    let start = s.sh.env().current_dir.clone();

    assert_eq!(s.submit("cd / | true"), Outcome::Continue);

    assert_eq!(std::env::current_dir().unwrap(), orig);
    assert_eq!(s.sh.env().current_dir, start);
}

#[test]
#[serial]
fn programs_start_in_the_shell_directory() {
    let orig = std::env::current_dir().unwrap();
    let mut s = Session::new();
    let sub = s.path("sub");
    fs::create_dir(&sub).unwrap();

    s.submit("cd sub");
    s.submit("touch created-here");
    std::env::set_current_dir(&orig).unwrap();

    assert!(sub.join("created-here").exists());
}
