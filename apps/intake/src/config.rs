use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use chrono::FixedOffset;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "intake.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// `UTC` or a fixed offset such as `+02:00`.
    pub locale_timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 30,
            locale_timezone: "UTC".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    locale_timezone: Option<String>,
}

impl Settings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api base url '{url}' must use http or https");
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn timezone(&self) -> anyhow::Result<FixedOffset> {
        parse_utc_offset(&self.locale_timezone)
            .with_context(|| format!("invalid locale timezone '{}'", self.locale_timezone))
    }
}

/// Defaults, then the config file, then the environment.
///
/// An explicitly given `path` must exist; the default `intake.toml` is
/// optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file_cfg = match path {
        Some(path) => Some(read_file_settings(path)?),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                Some(read_file_settings(&default_path)?)
            } else {
                None
            }
        }
    };
    if let Some(file_cfg) = file_cfg {
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.locale_timezone {
            settings.locale_timezone = v;
        }
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS must be whole seconds, got '{v}'"))?;
    }
    if let Some(v) = env("APP__LOCALE_TIMEZONE") {
        settings.locale_timezone = v;
    }

    if settings.request_timeout_secs == 0 {
        bail!("request_timeout_secs must be at least 1 second");
    }
    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings.base_url()?;
    settings.timezone()?;
    Ok(settings)
}

fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config file '{}'", path.display()))
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

fn parse_utc_offset(raw: &str) -> anyhow::Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
        return FixedOffset::east_opt(0).context("zero offset");
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => bail!("expected UTC or an offset like +02:00"),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().context("offset hours")?;
    let minutes: i32 = minutes.parse().context("offset minutes")?;
    if hours > 14 || minutes > 59 {
        bail!("offset out of range");
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).context("offset out of range")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
