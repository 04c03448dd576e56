use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::display::DisplayZone;
use serde::Deserialize;

use crate::ui::theme::ThemeConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    /// Fixed offset every date is shown in, e.g. `-03:00`.
    pub utc_offset: String,
    /// `0` disables the timeout.
    pub request_timeout_secs: u64,
    pub theme: ThemeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            utc_offset: "-03:00".into(),
            request_timeout_secs: 30,
            theme: ThemeConfig::default(),
        }
    }
}

impl Settings {
    pub fn display_zone(&self) -> anyhow::Result<DisplayZone> {
        self.utc_offset
            .parse()
            .with_context(|| format!("invalid utc_offset setting '{}'", self.utc_offset))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("barberia").join("dashboard.toml"))
}

/// Reads the settings file (an explicit path must exist, the default one may
/// be absent) and applies `APP__*` environment overrides on top.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit {
        Some(path) => read_settings_file(path)?,
        None => match default_settings_path() {
            Some(path) if path.exists() => read_settings_file(&path)?,
            _ => Settings::default(),
        },
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded dashboard settings");
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__UTC_OFFSET") {
        settings.utc_offset = v;
    }
    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;
    use crate::ui::theme::HexColor;

    fn temp_file(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("barberia_dashboard_test_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn defaults_point_at_local_api() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "http://localhost:3000");
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            settings.display_zone().expect("zone"),
            "-03:00".parse().expect("zone")
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_file(
            r##"
            api_url = "https://turnos.example.com/api"
            request_timeout_secs = 0

            [theme]
            primary = "#FF9800"
            "##,
        );

        let settings = read_settings_file(&path).expect("settings");
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings.api_url, "https://turnos.example.com/api");
        assert_eq!(settings.utc_offset, "-03:00");
        assert_eq!(settings.request_timeout(), None);
        assert_eq!(settings.theme.primary, HexColor::rgb(0xFF, 0x98, 0x00));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = env::temp_dir().join("barberia_dashboard_does_not_exist.toml");
        let err = load_settings(Some(&path)).expect_err("missing file");
        assert!(err.to_string().contains("failed to read settings file"));
    }

    #[test]
    fn environment_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("APP__API_URL", "http://10.0.0.2:3000"),
            ("APP__UTC_OFFSET", "+01:00"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.api_url, "http://10.0.0.2:3000");
        assert_eq!(settings.utc_offset, "+01:00");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn bad_offset_is_reported_with_context() {
        let settings = Settings {
            utc_offset: "Buenos Aires".into(),
            ..Settings::default()
        };
        let err = settings.display_zone().expect_err("bad offset");
        assert!(err.to_string().contains("utc_offset"));
    }
}
