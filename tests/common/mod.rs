use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Spawn the hook binary with the given stdin payload and environment
/// overrides. `CLAUDE_TRANSCRIPT_PATH` is cleared first so ambient state
/// can't leak into a test.
pub fn run_cli(stdin_data: &str, envs: &[(&str, &str)]) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sessionscribe"));
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env_remove("CLAUDE_TRANSCRIPT_PATH")
        .env_remove("SESSIONSCRIBE_DIR");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin_data.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Session files (`*-session.tmp`) in a sessions directory, ignoring the
/// preferences file the binary drops alongside them.
pub fn session_files(dir: &std::path::Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("-session.tmp"))
        })
        .collect();
    files.sort();
    files
}

/// A transcript exercising both record shapes, noise filtering, and a
/// malformed line.
pub const SAMPLE_TRANSCRIPT: &str = concat!(
    r#"{"type":"message","message":{"role":"user","content":[{"type":"text","text":"Fix the parser crash"}]}}"#, "\n",
    r#"{"type":"message","message":{"role":"assistant","content":[{"type":"text","text":"On it."},{"type":"tool_use","name":"Read","input":{"file_path":"/src/parser.rs"}}]}}"#, "\n",
    r#"{"type":"message","message":{"role":"assistant","content":[{"type":"tool_use","name":"Edit","input":{"file_path":"/src/parser.rs"}}]}}"#, "\n",
    "this line is not json\n",
    r#"{"type":"message","message":{"role":"user","content":[{"type":"text","text":"<system-reminder>ignore this</system-reminder>"}]}}"#, "\n",
    r#"{"type":"user","content":"Also update the changelog"}"#, "\n",
);

pub fn hook_payload(session_id: &str, transcript_path: Option<&str>) -> String {
    match transcript_path {
        Some(path) => format!(
            r#"{{"hook_event_name":"SessionEnd","reason":"other","session_id":"{session_id}","transcript_path":"{path}"}}"#
        ),
        None => format!(
            r#"{{"hook_event_name":"SessionEnd","reason":"other","session_id":"{session_id}"}}"#
        ),
    }
}
