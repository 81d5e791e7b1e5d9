/// Feed assembler
///
/// Orchestrates one assembly pass: candidate fetches from the catalog
/// gateway, exclusion of the obvious trending/popular surfaces, dedup,
/// engagement gating, novelty filtering, deterministic shuffle, flavor
/// post-processing, and the novelty-cache commit.
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{FeedError, FeedResult},
    gateway::CatalogGateway,
    models::{DiscoverCriteria, FeedFlavor, FeedMode, Mood, Movie, PersonRole, SortKey, TasteSignal},
    services::novelty::NoveltyCache,
    services::seeded::{SeededRng, JITTER_OFFSET, SHUFFLE_OFFSET},
    services::taste::{TasteProfile, TasteSnapshot},
    store::{self, KeyValueStore, StoreKey},
};

/// Target feed length after shuffling
pub const FEED_SIZE: usize = 40;
/// Discover pages sampled per assembly, page 1 included
pub const PAGE_SAMPLE_TARGET: usize = 5;
/// Safety ceiling on the upstream-reported page count
pub const TOTAL_PAGE_CEILING: u32 = 500;
/// Minimum rating count for an item to be shown at all
pub const MIN_VOTE_COUNT: u32 = 20;

/// Data-quality gate applied to every result set before any personalization
fn meets_engagement_floor(movie: &Movie) -> bool {
    movie.poster_path.is_some() && movie.vote_count >= MIN_VOTE_COUNT
}

pub struct FeedAssembler {
    gateway: Arc<dyn CatalogGateway>,
    store: Arc<dyn KeyValueStore>,
    novelty: NoveltyCache,
    taste: TasteProfile,
    persist_taste: bool,
}

impl FeedAssembler {
    /// Builds an assembler, loading persisted novelty state (and taste
    /// counters when opted in) from the store
    pub async fn new(
        gateway: Arc<dyn CatalogGateway>,
        store: Arc<dyn KeyValueStore>,
        persist_taste: bool,
    ) -> Self {
        let novelty = NoveltyCache::load(store.clone()).await;

        let taste = if persist_taste {
            store::load_json::<TasteSnapshot>(store.as_ref(), &StoreKey::TasteSnapshot)
                .await
                .map(TasteProfile::from_snapshot)
                .unwrap_or_default()
        } else {
            TasteProfile::new()
        };

        Self {
            gateway,
            store,
            novelty,
            taste,
            persist_taste,
        }
    }

    pub fn taste(&self) -> &TasteProfile {
        &self.taste
    }

    pub fn novelty(&self) -> &NoveltyCache {
        &self.novelty
    }

    /// Assembles a feed for the given mode and effective seed
    ///
    /// Active criteria route through the filtered path; otherwise discovery
    /// mode runs the full sampling/exclusion/novelty pipeline and the plain
    /// list modes return page 1 of their surface. Primary-path fetch
    /// failures surface as the single opaque `AssemblyFailed`.
    pub async fn assemble(
        &mut self,
        mode: FeedMode,
        criteria: Option<&DiscoverCriteria>,
        flavor: FeedFlavor,
        seed: u64,
    ) -> FeedResult<Vec<Movie>> {
        if let Some(criteria) = criteria.filter(|c| c.is_active()) {
            return self.assemble_filtered(mode, criteria, seed).await;
        }

        match mode {
            FeedMode::Discovery => self.assemble_discovery(flavor, seed).await,
            FeedMode::Trending => {
                let page = self.gateway.fetch_trending(1).await.map_err(primary_failure)?;
                Ok(gated(page.results))
            }
            FeedMode::Popular => {
                let page = self.gateway.fetch_popular(1).await.map_err(primary_failure)?;
                Ok(gated(page.results))
            }
        }
    }

    /// Free-text search; bypasses novelty and flavor logic entirely
    pub async fn search(&self, query: &str) -> FeedResult<Vec<Movie>> {
        let page = self
            .gateway
            .search(query, 1)
            .await
            .map_err(primary_failure)?;

        let results = gated(page.results);
        tracing::info!(query = %query, results = results.len(), "Search completed");
        Ok(results)
    }

    /// Unfiltered discovery: the personalized, novelty-preferring pipeline
    async fn assemble_discovery(
        &mut self,
        flavor: FeedFlavor,
        seed: u64,
    ) -> FeedResult<Vec<Movie>> {
        let first = self
            .gateway
            .fetch_discover(1, SortKey::default())
            .await
            .map_err(primary_failure)?;
        let total_pages = first.total_pages.clamp(1, TOTAL_PAGE_CEILING);

        // Discovery is a complement to the obvious surfaces: anything on
        // trending or popular page 1 is excluded. Either list failing to
        // load contributes nothing instead of failing the assembly.
        let (trending, popular) = tokio::join!(
            self.gateway.fetch_trending(1),
            self.gateway.fetch_popular(1)
        );

        let mut exclusion: HashSet<u64> = HashSet::new();
        for (list, result) in [("trending", trending), ("popular", popular)] {
            match result {
                Ok(page) => exclusion.extend(page.results.iter().map(|m| m.id)),
                Err(e) => {
                    tracing::warn!(list = list, error = %e, "Exclusion list unavailable, continuing without it")
                }
            }
        }

        let mut pool = first.results;
        pool.extend(self.fetch_sampled_pages(total_pages, seed).await?);

        pool.retain(meets_engagement_floor);
        pool.retain(|m| !exclusion.contains(&m.id));

        // First occurrence wins within the merged batch
        let mut seen_ids = HashSet::new();
        pool.retain(|m| seen_ids.insert(m.id));

        let mut pool = self.novelty.reset_if_exhausted(pool).await;

        let mut shuffler = SeededRng::new(seed.wrapping_add(SHUFFLE_OFFSET));
        shuffler.shuffle(&mut pool);
        pool.truncate(FEED_SIZE);

        // Flavors run over the capped set, so a restrictive flavor may
        // return fewer than FEED_SIZE items
        apply_flavor(&mut pool, flavor, &self.taste, &mut shuffler);

        let ids: Vec<u64> = pool.iter().map(|m| m.id).collect();
        self.novelty.commit(&ids, seed).await;

        tracing::info!(
            feed_len = pool.len(),
            excluded = exclusion.len(),
            flavor = ?flavor,
            "Discovery feed assembled"
        );

        Ok(pool)
    }

    /// Draws additional distinct discover pages and fetches them in parallel
    ///
    /// Page 1 is always fetched by the caller; this samples the remainder
    /// uniformly from [1, total_pages] until the sample target is reached or
    /// every page is taken. Sampled pages are primary path: a failed fetch
    /// aborts the assembly.
    async fn fetch_sampled_pages(&self, total_pages: u32, seed: u64) -> FeedResult<Vec<Movie>> {
        let mut picker = SeededRng::new(seed);
        let mut pages: Vec<u32> = vec![1];
        let target = PAGE_SAMPLE_TARGET.min(total_pages as usize);

        while pages.len() < target {
            let candidate = picker.gen_range(1, total_pages as u64) as u32;
            if !pages.contains(&candidate) {
                pages.push(candidate);
            }
        }

        let mut tasks = Vec::new();
        for &page in pages.iter().skip(1) {
            let gateway = self.gateway.clone();
            tasks.push(tokio::spawn(async move {
                gateway.fetch_discover(page, SortKey::default()).await
            }));
        }

        let mut extra = Vec::new();
        for task in tasks {
            let page = task
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Sampled page task failed");
                    FeedError::AssemblyFailed
                })?
                .map_err(primary_failure)?;
            extra.extend(page.results);
        }

        Ok(extra)
    }

    /// Explicit criteria: a single filtered page, trusted to already express
    /// the caller's intent. No exclusion set, no novelty tracking, no
    /// flavor; discovery mode still gets the deterministic shuffle and cap.
    async fn assemble_filtered(
        &mut self,
        mode: FeedMode,
        criteria: &DiscoverCriteria,
        seed: u64,
    ) -> FeedResult<Vec<Movie>> {
        let resolved = self.resolve_people(criteria).await;

        let page = self
            .gateway
            .fetch_filtered(1, &resolved)
            .await
            .map_err(primary_failure)?;

        let mut feed = gated(page.results);

        if mode == FeedMode::Discovery {
            let mut shuffler = SeededRng::new(seed.wrapping_add(SHUFFLE_OFFSET));
            shuffler.shuffle(&mut feed);
            feed.truncate(FEED_SIZE);
        }

        tracing::info!(feed_len = feed.len(), mode = ?mode, "Filtered feed assembled");

        Ok(feed)
    }

    /// Resolves actor/director names to identifiers through the gateway
    ///
    /// A failed lookup drops that constraint silently rather than failing
    /// the request.
    async fn resolve_people(&self, criteria: &DiscoverCriteria) -> DiscoverCriteria {
        let mut resolved = criteria.clone();

        let (actor, director) = tokio::join!(
            async {
                match &criteria.actor {
                    Some(name) => Some(self.gateway.resolve_person(name, PersonRole::Actor).await),
                    None => None,
                }
            },
            async {
                match &criteria.director {
                    Some(name) => {
                        Some(self.gateway.resolve_person(name, PersonRole::Director).await)
                    }
                    None => None,
                }
            }
        );

        match actor {
            Some(Ok(id)) => resolved.cast_id = id,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Actor lookup failed, dropping constraint")
            }
            None => {}
        }
        match director {
            Some(Ok(id)) => resolved.crew_id = id,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Director lookup failed, dropping constraint")
            }
            None => {}
        }

        resolved
    }

    /// Records one user interaction into the taste profile
    pub async fn record_interaction(&mut self, movie: &Movie, signal: TasteSignal) {
        self.taste.record_interaction(movie, signal);
        self.save_taste().await;
    }

    /// Records a mood selection into the taste profile
    pub async fn record_mood(&mut self, mood: Mood) {
        self.taste.record_mood(mood);
        self.save_taste().await;
    }

    /// Match percentage for an item, jittered on a stream derived from the
    /// effective seed
    pub fn match_percentage(&self, movie: &Movie, seed: u64) -> u8 {
        let mut rng = SeededRng::new(seed.wrapping_add(JITTER_OFFSET));
        self.taste.match_percentage(movie, &mut rng)
    }

    async fn save_taste(&self) {
        if self.persist_taste {
            store::save_json(
                self.store.as_ref(),
                &StoreKey::TasteSnapshot,
                &self.taste.snapshot(),
            )
            .await;
        }
    }
}

/// Logs a primary-path failure and collapses it to the opaque outcome
fn primary_failure(err: FeedError) -> FeedError {
    tracing::error!(error = %err, "Primary fetch failed");
    FeedError::AssemblyFailed
}

fn gated(results: Vec<Movie>) -> Vec<Movie> {
    let mut results = results;
    results.retain(meets_engagement_floor);
    results
}

/// Applies the selected ranking flavor over the capped candidate set
///
/// Exploratory reshuffles on the continuation of the shuffle stream rather
/// than a fresh seed.
fn apply_flavor(
    feed: &mut Vec<Movie>,
    flavor: FeedFlavor,
    taste: &TasteProfile,
    shuffler: &mut SeededRng,
) {
    match flavor {
        FeedFlavor::Plain => {}
        FeedFlavor::PopularityLean => {
            feed.sort_by(|a, b| {
                b.vote_average
                    .total_cmp(&a.vote_average)
                    .then(b.vote_count.cmp(&a.vote_count))
            });
        }
        FeedFlavor::CriticallyAcclaimed => {
            feed.retain(|m| m.vote_average >= 7.7);
        }
        FeedFlavor::TasteLed => {
            if taste.has_signal() {
                feed.sort_by(|a, b| {
                    taste
                        .score(b)
                        .cmp(&taste.score(a))
                        .then(b.vote_average.total_cmp(&a.vote_average))
                });
            }
        }
        FeedFlavor::Exploratory => {
            feed.retain(|m| m.vote_average >= 6.5 && m.vote_count < 1000);
            shuffler.shuffle(feed);
        }
    }
}
