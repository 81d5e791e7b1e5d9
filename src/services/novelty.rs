/// Novelty cache
///
/// Tracks which item identifiers were already surfaced: once within the
/// current process (session-seen) and once across restarts (lifetime-seen,
/// capacity-bounded and persisted through the store port).
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::Movie;
use crate::services::seeded::{SeededRng, TRIM_OFFSET};
use crate::store::{self, KeyValueStore, StoreKey};

/// Upper bound on the persisted lifetime-seen set
pub const LIFETIME_CAP: usize = 600;

pub struct NoveltyCache {
    session_seen: HashSet<u64>,
    lifetime_seen: HashSet<u64>,
    store: Arc<dyn KeyValueStore>,
}

impl NoveltyCache {
    /// Loads the lifetime-seen set from the store; session-seen always
    /// starts empty. An unreadable store reads as an empty set.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let lifetime: Vec<u64> = store::load_json(store.as_ref(), &StoreKey::LifetimeSeen)
            .await
            .unwrap_or_default();

        tracing::debug!(lifetime_len = lifetime.len(), "Novelty cache loaded");

        Self {
            session_seen: HashSet::new(),
            lifetime_seen: lifetime.into_iter().collect(),
            store,
        }
    }

    /// True iff the identifier has not been surfaced this session or within
    /// the lifetime window
    pub fn is_novel(&self, id: u64) -> bool {
        !self.session_seen.contains(&id) && !self.lifetime_seen.contains(&id)
    }

    pub fn session_len(&self) -> usize {
        self.session_seen.len()
    }

    pub fn lifetime_len(&self) -> usize {
        self.lifetime_seen.len()
    }

    /// Marks identifiers as surfaced and persists the lifetime set
    ///
    /// When the lifetime set overflows its cap it is down-sampled to exactly
    /// the cap: ids are sorted, shuffled with a generator derived from the
    /// effective seed, and truncated. Sorting first keeps the trim
    /// deterministic regardless of hash iteration order.
    pub async fn commit(&mut self, ids: &[u64], effective_seed: u64) {
        self.session_seen.extend(ids.iter().copied());
        self.lifetime_seen.extend(ids.iter().copied());

        if self.lifetime_seen.len() > LIFETIME_CAP {
            let mut all: Vec<u64> = self.lifetime_seen.iter().copied().collect();
            all.sort_unstable();

            let mut rng = SeededRng::new(effective_seed.wrapping_add(TRIM_OFFSET));
            rng.shuffle(&mut all);
            all.truncate(LIFETIME_CAP);

            self.lifetime_seen = all.into_iter().collect();
        }

        self.persist_lifetime().await;

        tracing::debug!(
            committed = ids.len(),
            session_len = self.session_seen.len(),
            lifetime_len = self.lifetime_seen.len(),
            "Novelty cache committed"
        );
    }

    /// Filters the candidate pool down to novel items, clearing both seen
    /// sets and returning the unfiltered pool when nothing novel remains
    ///
    /// The exhaustion reset keeps the feed from going permanently empty once
    /// the accessible catalog slice has been cycled through. An empty input
    /// pool never triggers the reset.
    pub async fn reset_if_exhausted(&mut self, pool: Vec<Movie>) -> Vec<Movie> {
        if pool.is_empty() {
            return pool;
        }

        let novel: Vec<Movie> = pool
            .iter()
            .filter(|m| self.is_novel(m.id))
            .cloned()
            .collect();

        if novel.is_empty() {
            tracing::info!(
                pool_len = pool.len(),
                "Novelty exhausted, clearing seen sets"
            );
            self.session_seen.clear();
            self.lifetime_seen.clear();
            self.persist_lifetime().await;
            return pool;
        }

        novel
    }

    async fn persist_lifetime(&self) {
        let mut ids: Vec<u64> = self.lifetime_seen.iter().copied().collect();
        ids.sort_unstable();
        store::save_json(self.store.as_ref(), &StoreKey::LifetimeSeen, &ids).await;
    }
}
