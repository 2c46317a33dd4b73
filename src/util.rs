use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the sessions directory location.
const DIR_ENV: &str = "SESSIONSCRIBE_DIR";

/// Write a diagnostic line to stderr, prefixed with the binary name.
pub fn log(message: impl AsRef<str>) {
    eprintln!("sessionscribe: {}", message.as_ref());
}

/// Resolve the sessions directory: `SESSIONSCRIBE_DIR` if set and non-empty,
/// else `.sessions` under the given working directory.
pub fn sessions_dir(cwd: &Path) -> PathBuf {
    match env::var_os(DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cwd.join(".sessions"),
    }
}

pub fn today_date_string() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn now_time_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// First 8 chars of the hook-provided session id, or of a fresh v4 UUID when
/// the payload didn't carry one.
pub fn short_session_id(session_id: Option<&str>) -> String {
    let id = match session_id {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    };
    id.chars().take(8).collect()
}

/// Replace the first line whose content (after leading whitespace) begins
/// with `prefix`, preserving the line's original terminator. The rewrite
/// touches only the matched line. Returns whether a line matched.
pub fn replace_line_starting_with(path: &Path, prefix: &str, replacement: &str) -> Result<bool> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut out = String::with_capacity(content.len() + replacement.len());
    let mut replaced = false;
    for line in content.split_inclusive('\n') {
        if !replaced && line.trim_start().starts_with(prefix) {
            let body_len = line.trim_end_matches(['\r', '\n']).len();
            out.push_str(replacement);
            out.push_str(&line[body_len..]);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }
    if replaced {
        fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(replaced)
}
