//! Read-only reports over the session's table: top-N listings, artist
//! frequency and audio-metric distributions.

use crate::TOP_N;
use crate::table::TableStore;
use crate::table::models::TrackRecord;

/// First `n` track names in table order.
///
/// "Top" means "first as stored": no ranking is applied. The playlist is
/// already in chart order when fetched, but a loaded file is taken as-is.
pub fn top_songs(table: &TableStore, n: usize) -> Vec<&str> {
    table.rows().iter().take(n).map(|t| t.track_name.as_str()).collect()
}

/// First `n` artists in table order (same truncation as `top_songs`).
pub fn top_artists(table: &TableStore, n: usize) -> Vec<&str> {
    table.rows().iter().take(n).map(|t| t.artist.as_str()).collect()
}

pub fn top_10_songs(table: &TableStore) -> Vec<&str> {
    top_songs(table, TOP_N)
}

pub fn top_10_artists(table: &TableStore) -> Vec<&str> {
    top_artists(table, TOP_N)
}

/// How many rows list a given artist.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistCount {
    pub artist: String,
    pub count: usize,
}

/// Occurrences of every distinct artist across the whole table, in order of
/// first appearance.
pub fn artist_counts(table: &TableStore) -> Vec<ArtistCount> {
    let mut counts: Vec<ArtistCount> = Vec::new();
    for track in table.rows() {
        match counts.iter_mut().find(|c| c.artist == track.artist) {
            Some(c) => c.count += 1,
            None => counts.push(ArtistCount {
                artist: track.artist.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// The 10 most frequent artists, count descending. Ties keep first-appearance
/// order (stable sort).
pub fn frequency_summary(table: &TableStore) -> Vec<ArtistCount> {
    let mut counts = artist_counts(table);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

/// Audio features shown on the box plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMetric {
    Danceability,
    Energy,
    Speechiness,
}

impl AudioMetric {
    pub const ALL: [AudioMetric; 3] = [Self::Danceability, Self::Energy, Self::Speechiness];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Speechiness => "speechiness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Danceability => "how suitable a track is for dancing",
            Self::Energy => "intensity and activity",
            Self::Speechiness => "presence of spoken words",
        }
    }

    pub fn value(&self, track: &TrackRecord) -> f64 {
        match self {
            Self::Danceability => track.danceability,
            Self::Energy => track.energy,
            Self::Speechiness => track.speechiness,
        }
    }
}

/// Five-number summary plus Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value >= q1 - 1.5 * IQR.
    pub lower_whisker: f64,
    /// Largest value <= q3 + 1.5 * IQR.
    pub upper_whisker: f64,
    /// Values outside the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Returns `None` for an empty series. NaNs are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside = sorted.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// One column's values and their box statistics.
#[derive(Debug, Clone)]
pub struct MetricSummary {
    pub metric: AudioMetric,
    pub values: Vec<f64>,
    /// `None` when the table is empty.
    pub stats: Option<BoxStats>,
}

/// Danceability, energy and speechiness columns, in that order.
pub fn metric_distribution(table: &TableStore) -> Vec<MetricSummary> {
    AudioMetric::ALL
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = table.rows().iter().map(|t| metric.value(t)).collect();
            let stats = BoxStats::from_values(&values);
            MetricSummary { metric, values, stats }
        })
        .collect()
}
