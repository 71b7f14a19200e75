use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::SettingsError;

pub const DEFAULT_CONFIG_FILE: &str = "order_form.toml";
pub const DEFAULT_ACCEPTED_SUCCESS_MESSAGE: &str = "Workflow was started";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(50_000);
pub const DEFAULT_SUCCESS_RESET_DELAY: Duration = Duration::from_millis(2_000);
pub const DEFAULT_ERROR_RESET_DELAY: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    pub endpoint_url: String,
    /// Exact `message` value the workflow returns when it accepted the record.
    pub accepted_success_message: String,
    pub request_timeout: Duration,
    pub success_reset_delay: Duration,
    pub error_reset_delay: Duration,
    /// Emit the focus-first-field signal after an error reset as well.
    pub focus_after_error: bool,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            accepted_success_message: DEFAULT_ACCEPTED_SUCCESS_MESSAGE.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            success_reset_delay: DEFAULT_SUCCESS_RESET_DELAY,
            error_reset_delay: DEFAULT_ERROR_RESET_DELAY,
            focus_after_error: false,
        }
    }
}

impl SubmissionSettings {
    pub fn with_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self.endpoint_url.trim();
        if raw.is_empty() {
            return Err(SettingsError::MissingEndpoint);
        }
        let url = Url::parse(raw).map_err(|source| SettingsError::InvalidEndpoint {
            url: raw.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SettingsError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.endpoint()?;
        if self.accepted_success_message.is_empty() {
            return Err(SettingsError::EmptyAcceptedMessage);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint_url: Option<String>,
    accepted_success_message: Option<String>,
    request_timeout_ms: Option<u64>,
    success_reset_ms: Option<u64>,
    error_reset_ms: Option<u64>,
    focus_after_error: Option<bool>,
}

/// Defaults, then the given TOML file (usually `order_form.toml`), then environment.
pub fn load_settings_from(config_path: &Path) -> SubmissionSettings {
    let mut settings = SubmissionSettings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file_overrides(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file_overrides(settings: &mut SubmissionSettings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("ignoring unreadable submission config file: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.endpoint_url {
        settings.endpoint_url = v;
    }
    if let Some(v) = file_cfg.accepted_success_message {
        settings.accepted_success_message = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.success_reset_ms {
        settings.success_reset_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.error_reset_ms {
        settings.error_reset_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.focus_after_error {
        settings.focus_after_error = v;
    }
}

pub(crate) fn apply_env_overrides(
    settings: &mut SubmissionSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("ORDER_FORM_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = lookup("APP__ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = lookup("APP__ACCEPTED_SUCCESS_MESSAGE") {
        settings.accepted_success_message = v;
    }

    if let Some(ms) = parse_millis(&lookup, "APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout = ms;
    }
    if let Some(ms) = parse_millis(&lookup, "APP__SUCCESS_RESET_MS") {
        settings.success_reset_delay = ms;
    }
    if let Some(ms) = parse_millis(&lookup, "APP__ERROR_RESET_MS") {
        settings.error_reset_delay = ms;
    }

    if let Some(v) = lookup("APP__FOCUS_AFTER_ERROR") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.focus_after_error = true,
            "0" | "false" | "no" => settings.focus_after_error = false,
            other => warn!("ignoring APP__FOCUS_AFTER_ERROR={other}: expected true or false"),
        }
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!("ignoring {key}={raw}: {err}");
            None
        }
    }
}
