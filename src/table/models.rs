use serde::Deserialize;

/// Column names of the export file, in order. `index` is written on export
/// and ignored on load.
pub const EXPORT_HEADER: [&str; 17] = [
    "index",
    "artist",
    "album",
    "track_name",
    "track_id",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
    "time_signature",
];

/// One playlist track: catalog metadata plus its audio features.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackRecord {
    pub artist: String,
    pub album: String,
    pub track_name: String,
    pub track_id: String,

    // Audio features
    pub danceability: f64,
    pub energy: f64,
    /// Pitch class, -1 when no key was detected.
    pub key: i32,
    pub loudness: f64,
    /// 1 = major, 0 = minor
    pub mode: i32,
    pub speechiness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: u64,
    pub time_signature: i32,
}

impl TrackRecord {
    /// CSV fields for this row, preceded by its index. Matches `EXPORT_HEADER`.
    pub fn to_export_fields(&self, index: usize) -> Vec<String> {
        vec![
            index.to_string(),
            self.artist.clone(),
            self.album.clone(),
            self.track_name.clone(),
            self.track_id.clone(),
            self.danceability.to_string(),
            self.energy.to_string(),
            self.key.to_string(),
            self.loudness.to_string(),
            self.mode.to_string(),
            self.speechiness.to_string(),
            self.instrumentalness.to_string(),
            self.liveness.to_string(),
            self.valence.to_string(),
            self.tempo.to_string(),
            self.duration_ms.to_string(),
            self.time_signature.to_string(),
        ]
    }
}
