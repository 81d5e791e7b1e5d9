use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single catalog entry (movie) as returned by the gateway
///
/// Immutable once fetched; the assembler owns items transiently during one
/// assembly pass and hands ownership of the surviving ones to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date in "YYYY-MM-DD" form, when known
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Option<Vec<u32>>,
}

impl Movie {
    /// Release year extracted from the release date, if parseable
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }

    /// Decade of release (e.g. 1990 for a 1994 film)
    pub fn release_decade(&self) -> Option<i32> {
        self.release_year().map(|y| y - y.rem_euclid(10))
    }

    pub fn genres(&self) -> &[u32] {
        self.genre_ids.as_deref().unwrap_or(&[])
    }
}

/// One page of gateway results with the upstream paging envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Sort order for discover queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PopularityDesc,
    VoteAverageDesc,
    ReleaseDateDesc,
    RevenueDesc,
}

impl SortKey {
    /// Upstream query-parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::VoteAverageDesc => "vote_average.desc",
            SortKey::ReleaseDateDesc => "primary_release_date.desc",
            SortKey::RevenueDesc => "revenue.desc",
        }
    }
}

/// Caller-supplied filter for explicit discover requests
///
/// Genre identifiers carry OR semantics. Actor and director are free-form
/// names; the assembler resolves them to identifiers through the gateway
/// (`cast_id`/`crew_id`) before the filtered fetch, dropping the constraint
/// silently when resolution fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverCriteria {
    pub sort_by: Option<SortKey>,
    pub min_rating: Option<f64>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub genres: Vec<u32>,
    pub providers: Vec<u32>,
    pub watch_region: Option<String>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub actor: Option<String>,
    pub director: Option<String>,
    /// Resolved person identifiers; filled in by the assembler
    pub cast_id: Option<u64>,
    pub crew_id: Option<u64>,
}

impl DiscoverCriteria {
    /// True when at least one constraint is set by the caller
    pub fn is_active(&self) -> bool {
        *self != DiscoverCriteria::default()
    }
}

/// Which feed surface the caller is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Personalized/randomized mode with novelty tracking
    Discovery,
    Trending,
    Popular,
}

/// Post-processing ranking strategy applied to an assembled candidate feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFlavor {
    #[default]
    Plain,
    PopularityLean,
    CriticallyAcclaimed,
    TasteLed,
    Exploratory,
}

/// Mood categories for taste recording
///
/// `Any` is the neutral choice and is never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Any,
    Cozy,
    Funny,
    Intense,
    Mindbending,
    Romantic,
    Tearjerker,
}

/// User interaction kinds that feed the taste profile, with the repetition
/// weight each one applies to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasteSignal {
    DetailView,
    MarkedSeen,
    Favorited,
    /// Explicit "more like this" training signal
    MoreLikeThis,
}

impl TasteSignal {
    pub fn weight(&self) -> u32 {
        match self {
            TasteSignal::DetailView | TasteSignal::MarkedSeen => 1,
            TasteSignal::Favorited => 2,
            TasteSignal::MoreLikeThis => 3,
        }
    }
}

/// Role hint for person-identifier resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonRole {
    Actor,
    Director,
}
