use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

const FILENAME: &str = "sessionscribe.toml";

const DEFAULT_NOISE_PREFIXES: &[&str] = &[
    "<system-reminder>",
    "<system-notification>",
    "Error: Request was aborted",
    "Request interrupted",
    "Request cancelled",
];

const DEFAULT_MUTATING_TOOLS: &[&str] = &["Edit", "Write", "Create", "ApplyPatch"];

/// User-facing preferences stored in `<sessions-dir>/sessionscribe.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Preferences {
    /// Prefixes marking a user message as noise (system chatter, aborted
    /// requests) rather than a task.
    #[serde(default = "default_noise_prefixes")]
    pub noise_prefixes: Vec<String>,

    /// Tool names whose invocations count as modifying files; only their
    /// `file_path` inputs are collected into the summary.
    #[serde(default = "default_mutating_tools")]
    pub mutating_tools: Vec<String>,
}

fn default_noise_prefixes() -> Vec<String> {
    DEFAULT_NOISE_PREFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_mutating_tools() -> Vec<String> {
    DEFAULT_MUTATING_TOOLS.iter().map(|s| s.to_string()).collect()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            noise_prefixes: default_noise_prefixes(),
            mutating_tools: default_mutating_tools(),
        }
    }
}

impl Preferences {
    /// Load preferences from `<dir>/sessionscribe.toml`.
    ///
    /// If the file doesn't exist it is created with defaults. Missing keys
    /// in an existing file are filled in with defaults via serde.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(FILENAME);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let prefs: Preferences = toml::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let prefs = Preferences::default();
                let toml_str = toml::to_string_pretty(&prefs)
                    .context("serializing default preferences")?;
                fs::write(&path, &toml_str)
                    .with_context(|| format!("writing default {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn is_noise(&self, text: &str) -> bool {
        self.noise_prefixes.iter().any(|p| text.starts_with(p.as_str()))
    }

    pub fn is_mutating_tool(&self, name: &str) -> bool {
        self.mutating_tools.iter().any(|t| t == name)
    }
}
