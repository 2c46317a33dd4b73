use serde::Deserialize;

/// Why the session ended (mirrors the host tool's SessionEnd payload).
///
/// Unknown values fall through to `Other` so a newer host never breaks the
/// payload parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    Clear,
    Logout,
    PromptInputExit,
    BypassPermissionsDisabled,
    #[serde(other)]
    Other,
}

/// The SessionEnd hook payload delivered over stdin.
///
/// Every field is optional: the hook must keep working when the host sends a
/// partial payload, and a payload that fails to parse entirely falls back to
/// the `CLAUDE_TRANSCRIPT_PATH` environment variable.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub reason: Option<SessionEndReason>,
}
