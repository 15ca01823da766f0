//! Watchdog configuration.
//!
//! Every key is optional; a missing file yields [`WatchConfig::default`].
//!
//! ```toml
//! poll_interval_ms = 2000
//! read_budget_chars = 8000
//! host_executables = ["node.exe", "powershell.exe", "pwsh.exe", "cmd.exe"]
//!
//! [notification]
//! app_name = "Gemini CLI"
//! timeout_secs = 5
//!
//! [markers]
//! working_title = ["Working", "✦"]
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::console::DEFAULT_READ_BUDGET;
use crate::error::{Result, WatchError};
use crate::patterns::{self, Field, MarkerRule, MarkerTable};
use crate::types::TargetState;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_APP_NAME: &str = "Gemini CLI";
pub const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u32 = 5;

/// Executables that may host a Gemini CLI console (node itself, or the shell
/// wrapping it).
pub const DEFAULT_HOST_EXECUTABLES: &[&str] =
    &["node.exe", "powershell.exe", "pwsh.exe", "cmd.exe"];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_read_budget")]
    pub read_budget_chars: usize,
    #[serde(default = "default_host_executables")]
    pub host_executables: Vec<String>,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(WatchError::ConfigInvalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.read_budget_chars == 0 {
            return Err(WatchError::ConfigInvalid(
                "read_budget_chars must be greater than zero".to_string(),
            ));
        }
        if self.host_executables.iter().all(|name| name.trim().is_empty()) {
            return Err(WatchError::ConfigInvalid(
                "host_executables must name at least one executable".to_string(),
            ));
        }
        if self.notification.app_name.trim().is_empty() {
            return Err(WatchError::ConfigInvalid(
                "notification.app_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            read_budget_chars: DEFAULT_READ_BUDGET,
            host_executables: default_host_executables(),
            notification: NotificationConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NotificationConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_notification_timeout_secs")]
    pub timeout_secs: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            timeout_secs: DEFAULT_NOTIFICATION_TIMEOUT_SECS,
        }
    }
}

/// Marker overrides. Each list replaces the corresponding default wholesale.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MarkerConfig {
    #[serde(default = "default_discovery_title")]
    pub discovery_title: Vec<String>,
    #[serde(default)]
    pub discovery_screen: Vec<String>,
    #[serde(default = "default_focus_title")]
    pub focus_title: Vec<String>,
    #[serde(default = "default_awaiting_input")]
    pub awaiting_input: Vec<String>,
    #[serde(default = "default_high_demand_retry")]
    pub high_demand_retry: Vec<String>,
    #[serde(default = "default_high_demand_stop")]
    pub high_demand_stop: Vec<String>,
    #[serde(default = "default_working_title")]
    pub working_title: Vec<String>,
    #[serde(default = "default_ready_title")]
    pub ready_title: Vec<String>,
}

impl MarkerConfig {
    pub fn table(&self) -> MarkerTable {
        let rules = vec![
            MarkerRule::new(
                1,
                TargetState::AwaitingInput,
                Field::Screen,
                vec![self.awaiting_input.clone()],
            ),
            MarkerRule::new(
                2,
                TargetState::HighDemand,
                Field::Screen,
                vec![self.high_demand_retry.clone(), self.high_demand_stop.clone()],
            ),
            MarkerRule::new(
                3,
                TargetState::Working,
                Field::Title,
                vec![self.working_title.clone()],
            ),
            MarkerRule::new(
                4,
                TargetState::Ready,
                Field::Title,
                vec![self.ready_title.clone()],
            ),
        ];
        MarkerTable::new(
            self.discovery_title.clone(),
            self.discovery_screen.clone(),
            self.focus_title.clone(),
            rules,
        )
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            discovery_title: default_discovery_title(),
            discovery_screen: Vec::new(),
            focus_title: default_focus_title(),
            awaiting_input: default_awaiting_input(),
            high_demand_retry: default_high_demand_retry(),
            high_demand_stop: default_high_demand_stop(),
            working_title: default_working_title(),
            ready_title: default_ready_title(),
        }
    }
}

/// Loads and validates the config at `path`; a missing file yields defaults.
pub fn load_config(path: &Path) -> Result<WatchConfig> {
    if !path.exists() {
        return Ok(WatchConfig::default());
    }

    let content = fs_err::read_to_string(path).map_err(|source| WatchError::Io {
        context: format!("reading config {}", path.display()),
        source,
    })?;
    let config =
        toml::from_str::<WatchConfig>(&content).map_err(|err| WatchError::ConfigMalformed {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_read_budget() -> usize {
    DEFAULT_READ_BUDGET
}

fn default_host_executables() -> Vec<String> {
    patterns::owned(DEFAULT_HOST_EXECUTABLES)
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_notification_timeout_secs() -> u32 {
    DEFAULT_NOTIFICATION_TIMEOUT_SECS
}

fn default_discovery_title() -> Vec<String> {
    patterns::owned(patterns::DISCOVERY_TITLE_MARKERS)
}

fn default_focus_title() -> Vec<String> {
    patterns::owned(patterns::FOCUS_TITLE_MARKERS)
}

fn default_awaiting_input() -> Vec<String> {
    patterns::owned(patterns::AWAITING_INPUT_MARKERS)
}

fn default_high_demand_retry() -> Vec<String> {
    patterns::owned(patterns::HIGH_DEMAND_RETRY_MARKERS)
}

fn default_high_demand_stop() -> Vec<String> {
    patterns::owned(patterns::HIGH_DEMAND_STOP_MARKERS)
}

fn default_working_title() -> Vec<String> {
    patterns::owned(patterns::WORKING_TITLE_MARKERS)
}

fn default_ready_title() -> Vec<String> {
    patterns::owned(patterns::READY_TITLE_MARKERS)
}
