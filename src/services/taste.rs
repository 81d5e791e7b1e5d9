/// Taste profile
///
/// Online accumulator of genre, decade, and mood affinities fed by user
/// interactions. Counters only grow; there is no decay or recency
/// weighting. `BTreeMap` keys keep every tie-break on ascending identifier,
/// so derived values are reproducible.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Mood, Movie, TasteSignal};
use crate::services::seeded::SeededRng;

/// Number of top genres used for similarity scoring
pub const TOP_GENRE_COUNT: usize = 3;

/// Years before this are treated as data noise and not counted
const DECADE_FLOOR: i32 = 1900;

#[derive(Debug, Default, Clone)]
pub struct TasteProfile {
    genre_counts: BTreeMap<u32, u32>,
    decade_counts: BTreeMap<i32, u32>,
    mood_counts: BTreeMap<Mood, u32>,
}

/// Serializable counter snapshot for optional cross-session persistence
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TasteSnapshot {
    pub genres: BTreeMap<u32, u32>,
    pub decades: BTreeMap<i32, u32>,
    pub moods: BTreeMap<Mood, u32>,
}

impl TasteProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: TasteSnapshot) -> Self {
        Self {
            genre_counts: snapshot.genres,
            decade_counts: snapshot.decades,
            mood_counts: snapshot.moods,
        }
    }

    pub fn snapshot(&self) -> TasteSnapshot {
        TasteSnapshot {
            genres: self.genre_counts.clone(),
            decades: self.decade_counts.clone(),
            moods: self.mood_counts.clone(),
        }
    }

    /// True once at least one genre affinity has been recorded
    pub fn has_signal(&self) -> bool {
        !self.genre_counts.is_empty()
    }

    /// Records genre occurrences with a repetition weight
    pub fn record_genres(&mut self, genre_ids: &[u32], weight: u32) {
        for &genre in genre_ids {
            *self.genre_counts.entry(genre).or_insert(0) += weight;
        }
    }

    /// Records the item's release decade with a repetition weight
    ///
    /// Items with a missing or unparseable release year, or a year before
    /// 1900, are ignored.
    pub fn record_decade(&mut self, movie: &Movie, weight: u32) {
        let Some(year) = movie.release_year() else {
            return;
        };
        if year < DECADE_FLOOR {
            return;
        }
        let decade = year - year.rem_euclid(10);
        *self.decade_counts.entry(decade).or_insert(0) += weight;
    }

    /// Records a mood selection; the neutral `Any` mood is never counted
    pub fn record_mood(&mut self, mood: Mood) {
        if mood == Mood::Any {
            return;
        }
        *self.mood_counts.entry(mood).or_insert(0) += 1;
    }

    /// Applies one user interaction to the genre and decade counters with
    /// the signal's weight
    pub fn record_interaction(&mut self, movie: &Movie, signal: TasteSignal) {
        let weight = signal.weight();
        self.record_genres(movie.genres(), weight);
        self.record_decade(movie, weight);
    }

    /// Top N genres by count, ties broken by ascending genre identifier
    pub fn top_genres(&self, n: usize) -> Vec<u32> {
        let mut entries: Vec<(u32, u32)> =
            self.genre_counts.iter().map(|(&g, &c)| (g, c)).collect();
        // BTreeMap iterates in ascending id order; the stable sort preserves
        // that order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().take(n).map(|(g, _)| g).collect()
    }

    /// Decade with the highest count, smallest decade on ties
    pub fn favorite_decade(&self) -> Option<i32> {
        self.decade_counts
            .iter()
            .max_by_key(|(&decade, &count)| (count, std::cmp::Reverse(decade)))
            .map(|(&decade, _)| decade)
    }

    /// Mood with the highest count
    pub fn favorite_mood(&self) -> Option<Mood> {
        self.mood_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&mood, _)| mood)
    }

    /// Similarity score: overlap between the item's genres and the top-3
    /// recorded genres
    pub fn score(&self, movie: &Movie) -> usize {
        let top = self.top_genres(TOP_GENRE_COUNT);
        movie.genres().iter().filter(|g| top.contains(g)).count()
    }

    /// Human-readable match percentage in [0, 99]
    ///
    /// Base 65, +12 per overlapping top genre, +8 for a rating of 7.5 or
    /// better, plus a small jitter, capped at 99. Without any recorded taste
    /// the value is drawn uniformly from [72, 89] so a cold start still
    /// feels populated.
    pub fn match_percentage(&self, movie: &Movie, rng: &mut SeededRng) -> u8 {
        if !self.has_signal() {
            return rng.gen_range(72, 89) as u8;
        }

        let overlap = self.score(movie) as u64;
        let mut pct = 65 + 12 * overlap;
        if movie.vote_average >= 7.5 {
            pct += 8;
        }
        pct += rng.gen_range(0, 5);

        pct.min(99) as u8
    }
}
