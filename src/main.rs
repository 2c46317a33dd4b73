mod preferences;
mod session_file;
mod summary;
mod transcript;
mod types;
mod util;

use anyhow::{Context, Result};
use preferences::Preferences;
use session_file::SessionFile;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use types::HookInput;

/// Hard cap on accumulated stdin; excess is drained and discarded.
const MAX_STDIN: u64 = 1024 * 1024;

/// Fallback for the transcript path when the stdin payload doesn't carry one.
const TRANSCRIPT_PATH_ENV: &str = "CLAUDE_TRANSCRIPT_PATH";

fn main() {
    // A failing hook must never block the host tool's lifecycle: every error
    // becomes a logged diagnostic and a successful exit.
    if let Err(err) = run() {
        util::log(format!("error: {err:#}"));
    }
    process::exit(0);
}

fn run() -> Result<()> {
    let raw = read_stdin_bounded()?;
    let input = parse_hook_input(&raw);

    let transcript_path = input
        .transcript_path
        .clone()
        .or_else(|| env::var(TRANSCRIPT_PATH_ENV).ok())
        .filter(|p| !p.is_empty());

    let cwd = input
        .cwd
        .as_deref()
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let dir = util::sessions_dir(&cwd);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let prefs = Preferences::load(&dir).unwrap_or_else(|err| {
        util::log(format!("failed to load preferences ({err:#}), using defaults"));
        Preferences::default()
    });

    // Lazy summary: no resolvable path, missing file, or zero qualifying
    // messages all collapse to "no summary" and the placeholder template.
    let summary = transcript_path
        .as_deref()
        .and_then(transcript::read_transcript)
        .and_then(|contents| transcript::extract_summary(&contents, &prefs));

    let file = SessionFile::new(
        &dir,
        &util::today_date_string(),
        &util::short_session_id(input.session_id.as_deref()),
    );
    file.persist(summary.as_ref(), &util::now_time_string())
}

/// Accumulate stdin up to `MAX_STDIN` bytes, then drain the rest to a sink
/// so the writer never sees a broken pipe.
fn read_stdin_bounded() -> Result<String> {
    let mut stdin = io::stdin().lock();
    let mut buffer = Vec::new();
    stdin
        .by_ref()
        .take(MAX_STDIN)
        .read_to_end(&mut buffer)
        .context("reading stdin")?;
    io::copy(&mut stdin, &mut io::sink()).context("draining stdin")?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Parse the stdin payload. A malformed payload degrades to an empty input;
/// the env-var fallback covers the transcript path.
fn parse_hook_input(raw: &str) -> HookInput {
    match serde_json::from_str(raw) {
        Ok(input) => input,
        Err(err) => {
            util::log(format!(
                "malformed stdin payload ({err}), falling back to environment"
            ));
            HookInput::default()
        }
    }
}
