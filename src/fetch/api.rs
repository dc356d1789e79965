//! Spotify Web API plumbing: token exchange, playlist paging and audio
//! feature lookups. Response types keep only the fields we read.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::FetchError;
use crate::config::SpotifyConfig;

/// Maximum ids accepted by `/audio-features`.
pub const AUDIO_FEATURES_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct Playlist {
    pub tracks: Page<PlaylistItem>,
}

/// A paging object. `next` is the absolute URL of the following page.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    /// Null for tracks that were removed from the catalog.
    pub track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
pub struct TrackObject {
    /// Null for local files added to the playlist.
    pub id: Option<String>,
    pub name: String,
    pub album: AlbumObject,
}

#[derive(Debug, Deserialize)]
pub struct AlbumObject {
    pub name: String,
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistObject {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    /// One entry per requested id, null when the service has no analysis.
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: u64,
    pub time_signature: i32,
}

/// An authenticated Web API session.
pub struct SpotifyClient {
    api_base: String,
    token: String,
}

impl SpotifyClient {
    /// Exchange client credentials for a bearer token.
    pub fn connect(config: &SpotifyConfig) -> Result<Self, FetchError> {
        if !config.has_credentials() {
            return Err(FetchError::MissingCredentials);
        }

        let basic = STANDARD.encode(format!("{}:{}", config.client_id, config.client_secret));
        log::debug!("Requesting token from {}", config.token_url);

        let token: TokenResponse = ureq::post(&config.token_url)
            .header("Authorization", &format!("Basic {basic}"))
            .send_form([("grant_type", "client_credentials")])
            .map_err(|source| FetchError::Http {
                url: config.token_url.clone(),
                source,
            })?
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::Malformed(format!("{}: {e}", config.token_url)))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.access_token,
        })
    }

    /// All items of a playlist, following `next` links in service order.
    pub fn playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, FetchError> {
        let url = format!("{}/playlists/{playlist_id}", self.api_base);
        let playlist: Playlist = self.get_json(&url, &[])?;

        let items = collect_pages(playlist.tracks, |next| self.get_json(next, &[]))?;
        log::info!("Playlist {playlist_id} has {} items", items.len());
        Ok(items)
    }

    /// Audio features for up to `AUDIO_FEATURES_BATCH` ids in one request.
    pub fn audio_features(&self, ids: &[&str]) -> Result<Vec<Option<AudioFeatures>>, FetchError> {
        let url = format!("{}/audio-features", self.api_base);
        let joined = ids.join(",");
        let resp: AudioFeaturesResponse = self.get_json(&url, &[("ids", joined.as_str())])?;
        Ok(resp.audio_features)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        log::debug!("GET {url}");
        let mut request = ureq::get(url).header("Authorization", &format!("Bearer {}", self.token));
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        request
            .call()
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::Malformed(format!("{url}: {e}")))
    }
}

/// Items of `first` followed by those of every page reached through `next`
/// links, until a page has none.
pub fn collect_pages<T, F>(first: Page<T>, mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(&str) -> Result<Page<T>, FetchError>,
{
    let mut items = first.items;
    let mut next = first.next;
    while let Some(url) = next {
        let page = fetch_page(&url)?;
        log::debug!("Fetched {} more items from {url}", page.items.len());
        items.extend(page.items);
        next = page.next;
    }
    Ok(items)
}
