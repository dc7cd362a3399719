use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HousekeeperResult;

pub const DEFAULT_DEDUP: bool = true;
pub const DEFAULT_GITHUB_SPLIT: bool = true;
pub const DEFAULT_GITHUB_SPLIT_DIFF: bool = false;
pub const DEFAULT_GITHUB_HOSTS: &[&str] = &["github.com"];

/// URL identity policy for duplicate detection. Only exact normalized-URL
/// equality exists today; the enum leaves room for looser modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Exact,
}

/// Persisted engine settings. Field names mirror the key-value store keys;
/// a partially populated store deserializes into full default behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_dedup")]
    pub dedup: bool,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default = "default_github_split")]
    pub github_split: bool,
    /// Reserved key carried in the store contract; the engine does not
    /// consume it yet.
    #[serde(default = "default_github_split_diff")]
    pub github_split_diff: bool,
    #[serde(default = "default_github_hosts")]
    pub github_hosts: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dedup: default_dedup(),
            match_mode: MatchMode::default(),
            github_split: default_github_split(),
            github_split_diff: default_github_split_diff(),
            github_hosts: default_github_hosts(),
        }
    }
}

fn default_dedup() -> bool {
    DEFAULT_DEDUP
}

fn default_github_split() -> bool {
    DEFAULT_GITHUB_SPLIT
}

fn default_github_split_diff() -> bool {
    DEFAULT_GITHUB_SPLIT_DIFF
}

fn default_github_hosts() -> Vec<String> {
    DEFAULT_GITHUB_HOSTS
        .iter()
        .map(|host| (*host).to_owned())
        .collect()
}

/// Partial settings update written by the settings UI. Absent fields leave
/// the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_split: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_split_diff: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_hosts: Option<Vec<String>>,
}

impl SettingsPatch {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(dedup) = self.dedup {
            settings.dedup = dedup;
        }
        if let Some(match_mode) = self.match_mode {
            settings.match_mode = match_mode;
        }
        if let Some(github_split) = self.github_split {
            settings.github_split = github_split;
        }
        if let Some(github_split_diff) = self.github_split_diff {
            settings.github_split_diff = github_split_diff;
        }
        if let Some(hosts) = &self.github_hosts {
            settings.github_hosts = sanitize_hosts(hosts);
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Trims host entries and drops the empty ones, preserving order.
pub fn sanitize_hosts(hosts: &[String]) -> Vec<String> {
    hosts
        .iter()
        .map(|host| host.trim())
        .filter(|host| !host.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Key-value settings collaborator. Reads always yield a complete
/// [`Settings`] with defaults merged in.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> HousekeeperResult<Settings>;
    async fn apply(&self, patch: SettingsPatch) -> HousekeeperResult<()>;
}

/// In-process reference store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> HousekeeperResult<Settings> {
        Ok(self
            .settings
            .read()
            .expect("settings store lock poisoned")
            .clone())
    }

    async fn apply(&self, patch: SettingsPatch) -> HousekeeperResult<()> {
        let mut settings = self
            .settings
            .write()
            .expect("settings store lock poisoned");
        patch.apply_to(&mut settings);
        Ok(())
    }
}
