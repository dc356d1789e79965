use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Spotify Web API settings.
    pub spotify: SpotifyConfig,
    /// Chart output settings.
    pub charts: ChartConfig,
}

/// Spotify Web API configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Playlist id, share URL or `spotify:playlist:` URI.
    pub playlist_id: String,
    /// Base URL of the Web API (no trailing slash).
    pub api_base: String,
    /// OAuth token endpoint for the client-credentials grant.
    pub token_url: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            playlist_id: crate::DEFAULT_PLAYLIST_ID.to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
        }
    }
}

impl SpotifyConfig {
    /// Environment variable overriding `client_id`.
    pub const CLIENT_ID_VAR: &'static str = "SPOTIFY_CLIENT_ID";
    /// Environment variable overriding `client_secret`.
    pub const CLIENT_SECRET_VAR: &'static str = "SPOTIFY_CLIENT_SECRET";

    /// Replace credentials with values from `lookup` (normally the process
    /// environment) when present and non-empty.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup(Self::CLIENT_ID_VAR).filter(|v| !v.is_empty()) {
            log::debug!("client_id taken from {}", Self::CLIENT_ID_VAR);
            self.client_id = id;
        }
        if let Some(secret) = lookup(Self::CLIENT_SECRET_VAR).filter(|v| !v.is_empty()) {
            log::debug!("client_secret taken from {}", Self::CLIENT_SECRET_VAR);
            self.client_secret = secret;
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Where rendered charts go and how they are shown.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Directory for SVG files. Defaults to the XDG cache directory.
    pub output_dir: Option<PathBuf>,
    /// Command used to open a rendered chart (e.g. `xdg-open`, `open`).
    /// The shell waits for it to exit before showing the menu again.
    pub viewer: Option<String>,
}

impl ChartConfig {
    /// Resolve the chart directory: config > XDG cache dir > `./charts`.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_chart_dir)
    }
}

impl AppConfig {
    /// Load config from `~/.config/hot100/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        let mut config = match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::from_toml(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.spotify.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Where the session's Track Records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Fetch the configured playlist from the Web API.
    Fetch,
    /// Load a previously exported CSV file.
    File(PathBuf),
}

/// Everything a session needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub spotify: SpotifyConfig,
    pub charts: ChartConfig,
    pub source: DataSource,
}

impl SessionConfig {
    /// Combine the config file with the `--path` flag. A path always wins
    /// over fetching.
    pub fn resolve(config: AppConfig, path: Option<PathBuf>) -> Self {
        let source = match path {
            Some(p) => DataSource::File(p),
            None => DataSource::Fetch,
        };
        Self {
            spotify: config.spotify,
            charts: config.charts,
            source,
        }
    }
}

/// Resolve the default chart directory using XDG cache directory.
pub fn default_chart_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        dirs.cache_dir().join("charts")
    } else {
        // Fallback: current directory
        PathBuf::from("charts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.spotify, SpotifyConfig::default());
        assert_eq!(config.spotify.playlist_id, crate::DEFAULT_PLAYLIST_ID);
        assert!(config.charts.viewer.is_none());
        assert!(!config.spotify.has_credentials());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml(
            r#"
            [spotify]
            client_id = "abc"
            client_secret = "xyz"

            [charts]
            output_dir = "/tmp/hot100-charts"
            viewer = "xdg-open"
            "#,
        )
        .unwrap();
        assert!(config.spotify.has_credentials());
        assert_eq!(config.spotify.api_base, "https://api.spotify.com/v1");
        assert_eq!(
            config.charts.resolve_output_dir(),
            PathBuf::from("/tmp/hot100-charts")
        );
        assert_eq!(config.charts.viewer.as_deref(), Some("xdg-open"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(AppConfig::from_toml("[spotify]\nclient_id = 42").is_err());
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut spotify = SpotifyConfig {
            client_id: "from-file".to_string(),
            ..SpotifyConfig::default()
        };
        spotify.apply_overrides(|key| match key {
            "SPOTIFY_CLIENT_SECRET" => Some("from-env".to_string()),
            "SPOTIFY_CLIENT_ID" => Some(String::new()),
            _ => None,
        });
        assert_eq!(spotify.client_id, "from-file");
        assert_eq!(spotify.client_secret, "from-env");
    }

    #[test]
    fn test_session_source() {
        let fetch = SessionConfig::resolve(AppConfig::default(), None);
        assert_eq!(fetch.source, DataSource::Fetch);

        let file = SessionConfig::resolve(AppConfig::default(), Some(PathBuf::from("hot100.csv")));
        assert_eq!(file.source, DataSource::File(PathBuf::from("hot100.csv")));
    }
}
