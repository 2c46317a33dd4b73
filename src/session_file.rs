use crate::summary::{self, BLANK_BODY, PLACEHOLDER_SENTINEL};
use crate::transcript::SessionSummary;
use crate::util;
use anyhow::{Context, Result};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

const CURRENT_STATE_HEADING: &str = "## Current State";
const CONTEXT_TO_LOAD_HEADING: &str = "### Context to Load";
const LAST_UPDATED_PREFIX: &str = "**Last Updated:**";

/// The per-session Markdown artifact, keyed by calendar date and short
/// session id: `<dir>/<YYYY-MM-DD>-<short-id>-session.tmp`.
pub struct SessionFile {
    path: PathBuf,
    date: String,
}

impl SessionFile {
    pub fn new(dir: &Path, date: &str, short_id: &str) -> Self {
        Self {
            path: dir.join(format!("{date}-{short_id}-session.tmp")),
            date: date.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotent create-or-merge. New files get a fresh template; existing
    /// files get a timestamp refresh and, while still in placeholder state,
    /// a one-way promotion of the placeholder body to the rendered summary.
    /// A populated body is never overwritten by a later run.
    pub fn persist(&self, summary: Option<&SessionSummary>, now: &str) -> Result<()> {
        if self.path.exists() {
            self.update(summary, now)
        } else {
            self.create(summary, now)
        }
    }

    fn create(&self, summary: Option<&SessionSummary>, now: &str) -> Result<()> {
        let body = match summary {
            Some(s) => summary::render_summary(s),
            None => BLANK_BODY.to_string(),
        };
        let content = summary::render_session_file(&self.date, now, &body)?;
        fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        util::log(format!("created session file: {}", self.path.display()));
        Ok(())
    }

    fn update(&self, summary: Option<&SessionSummary>, now: &str) -> Result<()> {
        let refreshed = util::replace_line_starting_with(
            &self.path,
            LAST_UPDATED_PREFIX,
            &format!("{LAST_UPDATED_PREFIX} {now}"),
        )?;
        if !refreshed {
            util::log(format!(
                "failed to update timestamp in {}",
                self.path.display()
            ));
        }

        if let Some(s) = summary {
            let content = fs::read_to_string(&self.path)
                .with_context(|| format!("reading {}", self.path.display()))?;
            if content.contains(PLACEHOLDER_SENTINEL) {
                match placeholder_span(&content) {
                    Some(span) => {
                        let mut updated = content;
                        updated.replace_range(span, &summary::render_summary(s));
                        fs::write(&self.path, updated)
                            .with_context(|| format!("writing {}", self.path.display()))?;
                    }
                    None => util::log(format!(
                        "placeholder template drift in {}, leaving body unchanged",
                        self.path.display()
                    )),
                }
            }
        }

        util::log(format!("updated session file: {}", self.path.display()));
        Ok(())
    }
}

/// Locate the contiguous placeholder region: the `## Current State` heading,
/// the sentinel line, and everything through the closing code fence of the
/// `### Context to Load` block. Tolerates CRLF and incidental whitespace
/// between the anchors. Returns `None` on template drift.
fn placeholder_span(content: &str) -> Option<Range<usize>> {
    let start = content.find(CURRENT_STATE_HEADING)?;
    let mut cursor = start + CURRENT_STATE_HEADING.len();

    cursor = expect_after_whitespace(content, cursor, PLACEHOLDER_SENTINEL)?;
    cursor = content[cursor..].find(CONTEXT_TO_LOAD_HEADING)? + cursor
        + CONTEXT_TO_LOAD_HEADING.len();
    cursor = expect_after_whitespace(content, cursor, "```")?;
    cursor = expect_after_whitespace(content, cursor, "[relevant files]")?;
    cursor = expect_after_whitespace(content, cursor, "```")?;

    Some(start..cursor)
}

/// Skip whitespace from `from`, then require `needle` at that position;
/// returns the index just past it.
fn expect_after_whitespace(content: &str, from: usize, needle: &str) -> Option<usize> {
    let rest = &content[from..];
    let at = from + (rest.len() - rest.trim_start().len());
    content[at..].starts_with(needle).then(|| at + needle.len())
}
