pub mod api;

use std::collections::{HashMap, HashSet};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::config::SpotifyConfig;
use crate::table::models::TrackRecord;
use api::{AUDIO_FEATURES_BATCH, AudioFeatures, PlaylistItem, SpotifyClient};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Spotify credentials missing: set client_id/client_secret in the config file or SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET")]
    MissingCredentials,
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Fetch the configured playlist and flatten it into one row per track.
pub fn fetch_playlist(config: &SpotifyConfig) -> Result<Vec<TrackRecord>, FetchError> {
    let playlist_id = normalize_playlist_id(&config.playlist_id);
    let client = SpotifyClient::connect(config)?;

    println!("Fetching playlist {playlist_id}...");
    let items = client.playlist_items(&playlist_id)?;
    let tracks = collect_tracks(items)?;

    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "  [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} audio features"
        )
        .unwrap()
        .progress_chars("##-"),
    );

    let features = lookup_features(&tracks, |ids| client.audio_features(ids), &pb)?;
    pb.finish_and_clear();

    let rows = attach_features(tracks, &features)?;
    log::info!("Fetched {} tracks", rows.len());
    Ok(rows)
}

/// Catalog metadata of one playlist entry, before audio features.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMeta {
    pub artist: String,
    pub album: String,
    pub track_name: String,
    pub track_id: String,
}

/// Audio features for every track, requested in batches of
/// `AUDIO_FEATURES_BATCH` ids and keyed by track id. Null entries are left out.
pub fn lookup_features<F>(
    tracks: &[TrackMeta],
    mut fetch_batch: F,
    pb: &ProgressBar,
) -> Result<HashMap<String, AudioFeatures>, FetchError>
where
    F: FnMut(&[&str]) -> Result<Vec<Option<AudioFeatures>>, FetchError>,
{
    let mut features = HashMap::new();
    for batch in tracks.chunks(AUDIO_FEATURES_BATCH) {
        let ids: Vec<&str> = batch.iter().map(|t| t.track_id.as_str()).collect();
        for f in fetch_batch(&ids)?.into_iter().flatten() {
            features.insert(f.id.clone(), f);
        }
        pb.inc(batch.len() as u64);
    }
    Ok(features)
}

/// Extract artist (first album artist), album, name and id from each item,
/// in playlist order. Repeated track ids are skipped.
pub fn collect_tracks(items: Vec<PlaylistItem>) -> Result<Vec<TrackMeta>, FetchError> {
    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(items.len());

    for (i, item) in items.into_iter().enumerate() {
        let track = item
            .track
            .ok_or_else(|| FetchError::Malformed(format!("playlist item {i} has no track")))?;
        let track_id = track.id.ok_or_else(|| {
            FetchError::Malformed(format!("playlist item {i} ({}) has no track id", track.name))
        })?;
        let artist = track
            .album
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .ok_or_else(|| {
                FetchError::Malformed(format!("album of {} lists no artists", track.name))
            })?;

        if !seen.insert(track_id.clone()) {
            log::warn!("Skipping repeated track {} ({track_id})", track.name);
            continue;
        }

        tracks.push(TrackMeta {
            artist,
            album: track.album.name,
            track_name: track.name,
            track_id,
        });
    }

    Ok(tracks)
}

/// Join metadata with audio features by track id. Every track must have
/// features; there are no partial rows.
pub fn attach_features(
    tracks: Vec<TrackMeta>,
    features: &HashMap<String, AudioFeatures>,
) -> Result<Vec<TrackRecord>, FetchError> {
    tracks
        .into_iter()
        .map(|meta| {
            let f = features.get(&meta.track_id).ok_or_else(|| {
                FetchError::Malformed(format!(
                    "no audio features for {} ({})",
                    meta.track_name, meta.track_id
                ))
            })?;
            Ok(TrackRecord {
                artist: meta.artist,
                album: meta.album,
                track_name: meta.track_name,
                track_id: meta.track_id,
                danceability: f.danceability,
                energy: f.energy,
                key: f.key,
                loudness: f.loudness,
                mode: f.mode,
                speechiness: f.speechiness,
                instrumentalness: f.instrumentalness,
                liveness: f.liveness,
                valence: f.valence,
                tempo: f.tempo,
                duration_ms: f.duration_ms,
                time_signature: f.time_signature,
            })
        })
        .collect()
}

/// Reduce a playlist reference to its bare id. Accepts a bare id, an id with
/// a `?si=` share suffix, a `spotify:playlist:` URI or an open.spotify.com URL.
pub fn normalize_playlist_id(raw: &str) -> String {
    let s = raw.trim();
    let s = s.split(['?', '#']).next().unwrap_or(s);
    let s = s.trim_end_matches('/');
    if let Some(rest) = s.strip_prefix("spotify:playlist:") {
        return rest.to_string();
    }
    match s.rfind("/playlist/") {
        Some(pos) => s[pos + "/playlist/".len()..].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: Option<&str>, name: &str, album: &str, artists: &[&str]) -> serde_json::Value {
        let artists: Vec<serde_json::Value> = artists.iter().map(|a| json!({"name": a})).collect();
        json!({
            "track": {
                "id": id,
                "name": name,
                "album": {"name": album, "artists": artists},
                "artists": [{"name": "Track-level artist, not used"}]
            }
        })
    }

    fn items(values: Vec<serde_json::Value>) -> Vec<PlaylistItem> {
        serde_json::from_value(serde_json::Value::Array(values)).unwrap()
    }

    fn features_json(id: &str, danceability: f64) -> serde_json::Value {
        json!({
            "id": id, "danceability": danceability, "energy": 0.5, "key": 7,
            "loudness": -4.2, "mode": 0, "speechiness": 0.1, "instrumentalness": 0.0,
            "liveness": 0.2, "valence": 0.3, "tempo": 98.5, "duration_ms": 180000,
            "time_signature": 4
        })
    }

    fn features(id: &str, danceability: f64) -> AudioFeatures {
        serde_json::from_value(features_json(id, danceability)).unwrap()
    }

    #[test]
    fn test_collect_uses_first_album_artist_in_order() {
        let tracks = collect_tracks(items(vec![
            item(Some("t1"), "Señorita", "Señorita", &["Shawn Mendes", "Camila Cabello"]),
            item(Some("t2"), "Truth Hurts", "Cuz I Love You", &["Lizzo"]),
        ]))
        .unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist, "Shawn Mendes");
        assert_eq!(tracks[0].track_id, "t1");
        assert_eq!(tracks[1].album, "Cuz I Love You");
        assert_eq!(tracks[1].track_name, "Truth Hurts");
    }

    #[test]
    fn test_collect_skips_repeated_ids() {
        let tracks = collect_tracks(items(vec![
            item(Some("t1"), "A", "X", &["P"]),
            item(Some("t1"), "A", "X", &["P"]),
            item(Some("t2"), "B", "Y", &["Q"]),
        ]))
        .unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_collect_rejects_malformed_items() {
        let null_track = items(vec![json!({"track": null})]);
        assert!(matches!(collect_tracks(null_track), Err(FetchError::Malformed(_))));

        let local_file = items(vec![item(None, "demo.mp3", "", &["Me"])]);
        assert!(matches!(collect_tracks(local_file), Err(FetchError::Malformed(_))));

        let no_artist = items(vec![item(Some("t1"), "A", "X", &[])]);
        assert!(matches!(collect_tracks(no_artist), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_attach_features_keeps_playlist_order() {
        let tracks = collect_tracks(items(vec![
            item(Some("t2"), "Second", "Y", &["Q"]),
            item(Some("t1"), "First", "X", &["P"]),
        ]))
        .unwrap();
        let mut map = HashMap::new();
        map.insert("t1".to_string(), features("t1", 0.1));
        map.insert("t2".to_string(), features("t2", 0.2));

        let rows = attach_features(tracks, &map).unwrap();
        assert_eq!(rows[0].track_id, "t2");
        assert_eq!(rows[0].danceability, 0.2);
        assert_eq!(rows[1].track_name, "First");
        assert_eq!(rows[1].key, 7);
        assert_eq!(rows[1].duration_ms, 180_000);
    }

    #[test]
    fn test_attach_features_missing_is_error() {
        let tracks = collect_tracks(items(vec![item(Some("t1"), "A", "X", &["P"])])).unwrap();
        let err = attach_features(tracks, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("no audio features for A (t1)"));
    }

    #[test]
    fn test_lookup_features_batches_and_keeps_order() {
        let values: Vec<serde_json::Value> = (0..150)
            .map(|i| item(Some(format!("t{i}").as_str()), &format!("Song {i}"), "X", &["P"]))
            .collect();
        let tracks = collect_tracks(items(values)).unwrap();

        let mut batch_sizes = Vec::new();
        let map = lookup_features(
            &tracks,
            |ids| {
                batch_sizes.push(ids.len());
                // answer out of order to make sure rows are matched by id
                let mut answer: Vec<Option<AudioFeatures>> =
                    ids.iter().map(|id| Some(features(id, 0.5))).collect();
                answer.reverse();
                Ok(answer)
            },
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(batch_sizes, vec![100, 50]);
        assert_eq!(map.len(), 150);

        let rows = attach_features(tracks, &map).unwrap();
        let ids: Vec<String> = rows.iter().map(|r| r.track_id.clone()).collect();
        let expected: Vec<String> = (0..150).map(|i| format!("t{i}")).collect();
        assert_eq!(ids, expected);
        assert_eq!(rows[149].track_name, "Song 149");
    }

    #[test]
    fn test_lookup_features_skips_null_entries() {
        let tracks = collect_tracks(items(vec![
            item(Some("t1"), "A", "X", &["P"]),
            item(Some("t2"), "B", "Y", &["Q"]),
        ]))
        .unwrap();
        let map = lookup_features(
            &tracks,
            |_| {
                let resp: api::AudioFeaturesResponse = serde_json::from_value(json!({
                    "audio_features": [features_json("t1", 0.4), null]
                }))
                .unwrap();
                Ok(resp.audio_features)
            },
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert!(map.contains_key("t1"));
        assert!(!map.contains_key("t2"));
        assert!(attach_features(tracks, &map).is_err());
    }

    #[test]
    fn test_normalize_playlist_id() {
        let id = "6UeSakyzhiEt4NB3UAd6NQ";
        assert_eq!(normalize_playlist_id(id), id);
        assert_eq!(normalize_playlist_id("6UeSakyzhiEt4NB3UAd6NQ?si=1Rwmvg38SYy4Tg2RAaGEKQ"), id);
        assert_eq!(normalize_playlist_id("spotify:playlist:6UeSakyzhiEt4NB3UAd6NQ"), id);
        assert_eq!(
            normalize_playlist_id("https://open.spotify.com/playlist/6UeSakyzhiEt4NB3UAd6NQ?si=abc"),
            id
        );
        assert_eq!(normalize_playlist_id(" https://open.spotify.com/playlist/6UeSakyzhiEt4NB3UAd6NQ/ "), id);
    }
}
