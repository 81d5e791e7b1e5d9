/// Catalog gateway abstraction
///
/// The engine consumes the upstream catalog through this narrow interface.
/// Each call may fail with a transport error, a non-success status, or a
/// decode error; the assembler decides per call site whether the failure is
/// fatal or absorbed.
use crate::{
    error::FeedResult,
    models::{DiscoverCriteria, MoviePage, PersonRole, SortKey},
};

pub mod tmdb;

pub use tmdb::TmdbGateway;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch one page of the popular list
    async fn fetch_popular(&self, page: u32) -> FeedResult<MoviePage>;

    /// Fetch one page of the trending list
    async fn fetch_trending(&self, page: u32) -> FeedResult<MoviePage>;

    /// Fetch one page of the default discover surface with the given sort
    async fn fetch_discover(&self, page: u32, sort: SortKey) -> FeedResult<MoviePage>;

    /// Fetch one page of the discover surface constrained by explicit criteria
    async fn fetch_filtered(&self, page: u32, criteria: &DiscoverCriteria)
        -> FeedResult<MoviePage>;

    /// Free-text title search
    async fn search(&self, query: &str, page: u32) -> FeedResult<MoviePage>;

    /// Resolve a person name to an upstream identifier
    ///
    /// Returns `Ok(None)` when no plausible match exists.
    async fn resolve_person(&self, name: &str, role: PersonRole) -> FeedResult<Option<u64>>;
}
