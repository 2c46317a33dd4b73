use crate::transcript::SessionSummary;
use anyhow::{Context, Result};
use minijinja::{context, Environment};

/// Sentinel marking an unpopulated session-file body.
pub const PLACEHOLDER_SENTINEL: &str = "[Session context goes here]";

/// Blank body written when no summary could be extracted: the sentinel plus
/// four empty checklist sections for the user to fill in by hand.
pub const BLANK_BODY: &str = "## Current State\n\n[Session context goes here]\n\n### Completed\n- [ ]\n\n### In Progress\n- [ ]\n\n### Notes for Next Session\n-\n\n### Context to Load\n```\n[relevant files]\n```";

/// Whole-file template; `body` is either a rendered summary or `BLANK_BODY`.
const SESSION_TEMPLATE: &str = "\
# Session: {{ date }}
**Date:** {{ date }}
**Started:** {{ time }}
**Last Updated:** {{ time }}

---

{{ body }}
";

/// Render a complete new session file (both timestamps equal at creation).
pub fn render_session_file(date: &str, time: &str, body: &str) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    let tmpl = env
        .template_from_str(SESSION_TEMPLATE)
        .context("parsing session file template")?;
    tmpl.render(context! { date, time, body })
        .context("rendering session file template")
}

/// Render the `## Session Summary` body section.
///
/// Sections are emitted in fixed order; Files Modified and Tools Used are
/// omitted entirely when empty. Deterministic, no ordering ambiguity.
pub fn render_summary(summary: &SessionSummary) -> String {
    let mut section = String::from("## Session Summary\n\n### Tasks\n");
    for msg in &summary.user_messages {
        section.push_str("- ");
        section.push_str(&escape_bullet(msg));
        section.push('\n');
    }
    section.push('\n');

    if !summary.files_modified.is_empty() {
        section.push_str("### Files Modified\n");
        for path in &summary.files_modified {
            section.push_str(&format!("- {path}\n"));
        }
        section.push('\n');
    }

    if !summary.tools_used.is_empty() {
        section.push_str(&format!("### Tools Used\n{}\n\n", summary.tools_used.join(", ")));
    }

    section.push_str(&format!(
        "### Stats\n- Total user messages: {}\n",
        summary.total_messages
    ));
    section
}

/// Collapse embedded line breaks to single spaces and escape backticks so a
/// message can't break the surrounding Markdown list structure.
fn escape_bullet(msg: &str) -> String {
    msg.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('`', "\\`")
}
