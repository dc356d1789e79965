pub mod analysis;
pub mod charts;
pub mod config;
pub mod fetch;
pub mod shell;
pub mod table;

/// Application name for XDG paths
pub const APP_NAME: &str = "hot100";

/// Spotify's "Billboard Hot 100" playlist.
pub const DEFAULT_PLAYLIST_ID: &str = "6UeSakyzhiEt4NB3UAd6NQ";

/// How many rows the top-N listings and the frequency summary report.
pub const TOP_N: usize = 10;
