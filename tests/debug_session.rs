//! End-to-end debug-session replay through the harness CLI.

mod common;

use common::{stdout_text, Sandbox};

#[test]
fn session_is_skipped_without_a_debug_program() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.run(true, &[]);

    let verify = sandbox.run(false, &[]);
    let stdout = stdout_text(&verify);
    assert!(verify.status.success(), "{stdout}");
    assert!(stdout.contains("debug session skipped"), "{stdout}");
}

#[test]
fn record_then_verify_replays_the_transcript() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.write_debug_fixture("debug.out", "compiled debug program\n");
    sandbox.write_debug_fixture("debug.in", "step\nregisters\nquit\n");

    let record = sandbox.run(true, &[]);
    assert!(record.status.success(), "{}", stdout_text(&record));
    let transcript = sandbox.debug_dir.join("debug.transcript");
    let recorded = std::fs::read_to_string(&transcript).expect("read transcript");
    assert!(recorded.contains("dbg> step"), "{recorded}");
    assert!(recorded.contains("dbg> quit"), "{recorded}");

    let verify = sandbox.run(false, &[]);
    let stdout = stdout_text(&verify);
    assert!(verify.status.success(), "{stdout}");
    assert!(stdout.contains("debug session passed"), "{stdout}");
}

#[test]
fn tampered_transcript_fails_the_run_despite_passing_examples() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.write_debug_fixture("debug.out", "compiled debug program\n");
    sandbox.write_debug_fixture("debug.in", "step\nquit\n");
    assert!(sandbox.run(true, &[]).status.success());

    let transcript = sandbox.debug_dir.join("debug.transcript");
    let mut text = std::fs::read_to_string(&transcript).expect("read transcript");
    text = text.replacen("dbg> step", "dbg> stop", 1);
    std::fs::write(&transcript, text).expect("write transcript");

    let verify = sandbox.run(false, &[]);
    let stdout = stdout_text(&verify);
    assert!(!verify.status.success());
    assert!(stdout.contains("test add passed"), "{stdout}");
    assert!(stdout.contains("debug transcript drifted from golden"), "{stdout}");
    assert!(stdout.contains("debug session failed"), "{stdout}");
    assert!(stdout.contains("all 1 examples passed"), "{stdout}");
}

#[test]
fn missing_debug_input_aborts_the_run() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.write_debug_fixture("debug.out", "compiled debug program\n");

    let verify = sandbox.run(false, &[]);
    assert!(!verify.status.success());
    let stderr = common::stderr_text(&verify);
    assert!(stderr.contains("debug.in"), "{stderr}");
}

#[test]
fn missing_golden_transcript_aborts_a_verify_run() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.write_debug_fixture("debug.out", "compiled debug program\n");
    sandbox.write_debug_fixture("debug.in", "quit\n");

    let verify = sandbox.run(false, &[]);
    assert!(!verify.status.success());
    let stderr = common::stderr_text(&verify);
    assert!(stderr.contains("no golden debug transcript"), "{stderr}");
}

#[test]
fn json_summary_reflects_the_debug_outcome() {
    let sandbox = Sandbox::new();
    sandbox.write_example("add.txt", "push 1\n");
    sandbox.write_debug_fixture("debug.out", "compiled debug program\n");
    sandbox.write_debug_fixture("debug.in", "quit\n");
    assert!(sandbox.run(true, &[]).status.success());

    let verify = sandbox.run(false, &["--json"]);
    let stdout = stdout_text(&verify);
    let json_line = stdout.lines().last().expect("summary line");
    assert_eq!(
        json_line,
        r#"{"total":1,"failed":0,"debug":"passed"}"#,
        "{stdout}"
    );
}
