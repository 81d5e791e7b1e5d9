//! reelfeed: a personalized movie-discovery feed engine.
//!
//! Given a paged, filterable catalog gateway, the engine assembles a
//! bounded, de-duplicated, novelty-preferring, optionally taste-ranked
//! feed, reproducibly from a seed. It is a library: the surrounding
//! application owns the UI, the credentials, and the choice of store.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{FeedError, FeedResult};
pub use gateway::{CatalogGateway, TmdbGateway};
pub use models::{
    DiscoverCriteria, FeedFlavor, FeedMode, Mood, Movie, MoviePage, PersonRole, SortKey,
    TasteSignal,
};
pub use services::feed::{FeedAssembler, FEED_SIZE, MIN_VOTE_COUNT};
pub use services::novelty::{NoveltyCache, LIFETIME_CAP};
pub use services::seeded::{SeededRng, SessionSeed, SHUFFLE_OFFSET};
pub use services::taste::{TasteProfile, TasteSnapshot};
pub use store::{KeyValueStore, MemoryStore, RedisStore, StoreKey};
