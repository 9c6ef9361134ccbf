use chrono::Duration;
use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, SettingsError>;
    async fn set_settings(&self, settings: Settings) -> Result<(), SettingsError>;
}

/// A missing entry is reported as the default settings, not as an error.
#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, SettingsError>;
    async fn write_settings(&self, settings: Settings) -> Result<(), SettingsError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Read(String),
    #[error("failed to write settings: {0}")]
    Write(String),
}

/// Client configuration.
///
/// Fields missing in a stored entry take their default value, so entries written by older
/// versions stay readable.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_ms: u32,
    pub quota_max_age_secs: u32,
    pub analyses_max_age_secs: u32,
    pub analyses_page_size: u32,
    pub theme: Theme,
}

impl Settings {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::milliseconds(i64::from(self.request_timeout_ms))
    }

    #[must_use]
    pub fn quota_max_age(&self) -> Duration {
        Duration::seconds(i64::from(self.quota_max_age_secs))
    }

    #[must_use]
    pub fn analyses_max_age(&self) -> Duration {
        Duration::seconds(i64::from(self.analyses_max_age_secs))
    }

    /// Resolves `Theme::System` by the preferred color scheme of the browser.
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                let Some(window) = web_sys::window() else {
                    error!("failed to access window to determine preferred color scheme");
                    return Theme::Light;
                };
                match window.match_media("(prefers-color-scheme: dark)") {
                    Ok(Some(media_query_list)) if media_query_list.matches() => Theme::Dark,
                    Ok(Some(_)) => Theme::Light,
                    Ok(None) => {
                        error!("failed to determine preferred color scheme");
                        Theme::Light
                    }
                    Err(_) => {
                        error!("failed to match media to determine preferred color scheme");
                        Theme::Light
                    }
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:3000/api"),
            request_timeout_ms: 20_000,
            quota_max_age_secs: 300,
            analyses_max_age_secs: 300,
            analyses_page_size: 20,
            theme: Theme::System,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}
