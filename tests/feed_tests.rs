use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use reelfeed::{
    CatalogGateway, DiscoverCriteria, FeedAssembler, FeedError, FeedFlavor, FeedMode, FeedResult,
    MemoryStore, Movie, MoviePage, PersonRole, SeededRng, SessionSeed, SortKey, TasteSignal,
    FEED_SIZE, SHUFFLE_OFFSET,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Gateway with canned responses per surface; `None` means the fetch fails
#[derive(Default, Clone)]
struct ScriptedGateway {
    discover: Vec<MoviePage>,
    filtered: Option<MoviePage>,
    trending: Option<MoviePage>,
    popular: Option<MoviePage>,
    search: Option<MoviePage>,
    person: Option<u64>,
}

fn unavailable() -> FeedError {
    FeedError::GatewayUnavailable("scripted failure".to_string())
}

#[async_trait]
impl CatalogGateway for ScriptedGateway {
    async fn fetch_popular(&self, _page: u32) -> FeedResult<MoviePage> {
        self.popular.clone().ok_or_else(unavailable)
    }

    async fn fetch_trending(&self, _page: u32) -> FeedResult<MoviePage> {
        self.trending.clone().ok_or_else(unavailable)
    }

    async fn fetch_discover(&self, page: u32, _sort: SortKey) -> FeedResult<MoviePage> {
        self.discover
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn fetch_filtered(
        &self,
        _page: u32,
        _criteria: &DiscoverCriteria,
    ) -> FeedResult<MoviePage> {
        self.filtered.clone().ok_or_else(unavailable)
    }

    async fn search(&self, _query: &str, _page: u32) -> FeedResult<MoviePage> {
        self.search.clone().ok_or_else(unavailable)
    }

    async fn resolve_person(&self, _name: &str, _role: PersonRole) -> FeedResult<Option<u64>> {
        Ok(self.person)
    }
}

fn movie(id: u64) -> Movie {
    Movie {
        id,
        title: format!("Movie {}", id),
        overview: None,
        poster_path: Some(format!("/poster{}.jpg", id)),
        backdrop_path: None,
        release_date: Some("2015-06-01".to_string()),
        vote_average: 7.0,
        vote_count: 100,
        genre_ids: Some(vec![28]),
    }
}

fn thin_movie(id: u64) -> Movie {
    Movie {
        poster_path: None,
        vote_count: 3,
        ..movie(id)
    }
}

fn page_of(movies: Vec<Movie>, total_pages: u32) -> MoviePage {
    MoviePage {
        page: 1,
        total_results: movies.len() as u32,
        results: movies,
        total_pages,
    }
}

fn ids(feed: &[Movie]) -> Vec<u64> {
    feed.iter().map(|m| m.id).collect()
}

async fn fresh_assembler(gateway: ScriptedGateway) -> FeedAssembler {
    init_tracing();
    FeedAssembler::new(Arc::new(gateway), Arc::new(MemoryStore::new()), false).await
}

/// Single-page discovery setup with empty exclusion lists
fn simple_gateway(movies: Vec<Movie>) -> ScriptedGateway {
    ScriptedGateway {
        discover: vec![page_of(movies, 1)],
        trending: Some(page_of(vec![], 1)),
        popular: Some(page_of(vec![], 1)),
        ..Default::default()
    }
}

#[tokio::test]
async fn discovery_feed_is_deterministic_for_a_seed() {
    let movies: Vec<Movie> = (1..=60).map(movie).collect();

    let feed_a = fresh_assembler(simple_gateway(movies.clone()))
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();
    let feed_b = fresh_assembler(simple_gateway(movies))
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    assert_eq!(ids(&feed_a), ids(&feed_b));
    assert_eq!(feed_a.len(), FEED_SIZE);
}

#[tokio::test]
async fn discovery_feed_respects_engagement_gate() {
    let mut movies: Vec<Movie> = (1..=20).map(movie).collect();
    movies.extend((100..=110).map(thin_movie));

    let feed = fresh_assembler(simple_gateway(movies))
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    assert!(!feed.is_empty());
    for item in &feed {
        assert!(item.poster_path.is_some());
        assert!(item.vote_count >= 20);
    }
}

#[tokio::test]
async fn discovery_feed_excludes_trending_and_popular() {
    let gateway = ScriptedGateway {
        discover: vec![page_of((1..=30).map(movie).collect(), 1)],
        trending: Some(page_of(vec![movie(1), movie(2)], 1)),
        popular: Some(page_of(vec![movie(2), movie(3)], 1)),
        ..Default::default()
    };

    let feed = fresh_assembler(gateway)
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    let feed_ids: HashSet<u64> = ids(&feed).into_iter().collect();
    assert!(!feed_ids.contains(&1));
    assert!(!feed_ids.contains(&2));
    assert!(!feed_ids.contains(&3));
    assert_eq!(feed.len(), 27);
}

#[tokio::test]
async fn merged_batch_is_deduplicated() {
    // Two pages sharing ids; the sampler takes both when only two exist
    let gateway = ScriptedGateway {
        discover: vec![
            page_of((1..=10).map(movie).collect(), 2),
            page_of((6..=15).map(movie).collect(), 2),
        ],
        trending: Some(page_of(vec![], 1)),
        popular: Some(page_of(vec![], 1)),
        ..Default::default()
    };

    let feed = fresh_assembler(gateway)
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    let unique: HashSet<u64> = ids(&feed).into_iter().collect();
    assert_eq!(unique.len(), feed.len());
    assert_eq!(feed.len(), 15);
}

#[tokio::test]
async fn consecutive_feeds_prefer_novel_items() {
    let movies: Vec<Movie> = (1..=60).map(movie).collect();
    let mut assembler = fresh_assembler(simple_gateway(movies)).await;
    let mut seed = SessionSeed::new(42);

    let first = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, seed.advance())
        .await
        .unwrap();
    let second = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, seed.advance())
        .await
        .unwrap();

    assert_eq!(first.len(), FEED_SIZE);
    assert_eq!(second.len(), 20);

    let first_ids: HashSet<u64> = ids(&first).into_iter().collect();
    for item in &second {
        assert!(!first_ids.contains(&item.id), "item {} repeated", item.id);
    }
}

#[tokio::test]
async fn exhaustion_reset_recycles_the_pool() {
    let movies: Vec<Movie> = (1..=10).map(movie).collect();
    let mut assembler = fresh_assembler(simple_gateway(movies)).await;
    let mut seed = SessionSeed::new(42);

    let first = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, seed.advance())
        .await
        .unwrap();
    assert_eq!(first.len(), 10);

    // Everything has been surfaced; the reset keeps the feed populated
    let second = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, seed.advance())
        .await
        .unwrap();
    assert_eq!(second.len(), 10);
}

#[tokio::test]
async fn seed_42_scenario_orders_survivors_deterministically() {
    // 20 items, ten of which survive the engagement gate; trending and
    // popular page 1 exclude three of those ten
    let mut movies: Vec<Movie> = (1..=10).map(movie).collect();
    movies.extend((11..=20).map(thin_movie));

    let gateway = ScriptedGateway {
        discover: vec![page_of(movies, 1)],
        trending: Some(page_of(vec![movie(1), movie(2)], 1)),
        popular: Some(page_of(vec![movie(3)], 1)),
        ..Default::default()
    };

    let feed = fresh_assembler(gateway)
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    let mut expected: Vec<u64> = (4..=10).collect();
    SeededRng::new(42 + SHUFFLE_OFFSET).shuffle(&mut expected);

    assert_eq!(ids(&feed), expected);
}

#[tokio::test]
async fn critically_acclaimed_flavor_filters_by_rating() {
    let movies: Vec<Movie> = (1..=20)
        .map(|id| Movie {
            vote_average: if id % 2 == 0 { 8.1 } else { 6.9 },
            ..movie(id)
        })
        .collect();

    let feed = fresh_assembler(simple_gateway(movies))
        .await
        .assemble(
            FeedMode::Discovery,
            None,
            FeedFlavor::CriticallyAcclaimed,
            42,
        )
        .await
        .unwrap();

    assert_eq!(feed.len(), 10);
    for item in &feed {
        assert!(item.vote_average >= 7.7);
    }
}

#[tokio::test]
async fn exploratory_flavor_keeps_under_the_radar_items() {
    let movies: Vec<Movie> = (1..=30)
        .map(|id| Movie {
            vote_average: if id <= 10 { 5.0 } else { 7.0 },
            vote_count: if id > 20 { 5000 } else { 100 },
            ..movie(id)
        })
        .collect();

    let feed = fresh_assembler(simple_gateway(movies))
        .await
        .assemble(FeedMode::Discovery, None, FeedFlavor::Exploratory, 42)
        .await
        .unwrap();

    // Only ids 11..=20 qualify: rating >= 6.5 and under 1000 votes
    assert_eq!(feed.len(), 10);
    for item in &feed {
        assert!(item.vote_average >= 6.5);
        assert!(item.vote_count < 1000);
    }
}

#[tokio::test]
async fn taste_led_flavor_ranks_matching_genres_first() {
    let movies: Vec<Movie> = (1..=10)
        .map(|id| Movie {
            genre_ids: Some(if id <= 5 { vec![99] } else { vec![28, 35] }),
            ..movie(id)
        })
        .collect();

    let mut assembler = fresh_assembler(simple_gateway(movies)).await;
    assembler
        .record_interaction(&movie(1000), TasteSignal::Favorited)
        .await;

    // Top genre is now 28; matching items must lead the feed
    let feed = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::TasteLed, 42)
        .await
        .unwrap();

    assert_eq!(feed.len(), 10);
    for item in feed.iter().take(5) {
        assert!(item.genres().contains(&28));
    }
    for item in feed.iter().skip(5) {
        assert!(!item.genres().contains(&28));
    }
}

#[tokio::test]
async fn filtered_discovery_shuffles_and_caps_without_novelty() {
    let gateway = ScriptedGateway {
        filtered: Some(page_of((1..=60).map(movie).collect(), 1)),
        person: Some(500),
        ..Default::default()
    };

    let criteria = DiscoverCriteria {
        genres: vec![28],
        min_rating: Some(6.0),
        ..Default::default()
    };

    let mut assembler = fresh_assembler(gateway).await;
    let feed = assembler
        .assemble(FeedMode::Discovery, Some(&criteria), FeedFlavor::Plain, 42)
        .await
        .unwrap();

    assert_eq!(feed.len(), FEED_SIZE);
    // Filtered requests do not touch the novelty cache
    assert_eq!(assembler.novelty().session_len(), 0);
    assert_eq!(assembler.novelty().lifetime_len(), 0);
}

#[tokio::test]
async fn filtered_non_discovery_preserves_upstream_order() {
    let gateway = ScriptedGateway {
        filtered: Some(page_of((1..=10).map(movie).collect(), 1)),
        ..Default::default()
    };

    let criteria = DiscoverCriteria {
        year_from: Some(1990),
        ..Default::default()
    };

    let feed = fresh_assembler(gateway)
        .await
        .assemble(FeedMode::Trending, Some(&criteria), FeedFlavor::Plain, 42)
        .await
        .unwrap();

    assert_eq!(ids(&feed), (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn search_applies_gate_and_preserves_order() {
    let gateway = ScriptedGateway {
        search: Some(page_of(
            vec![movie(1), thin_movie(2), movie(3), thin_movie(4)],
            1,
        )),
        ..Default::default()
    };

    let assembler = fresh_assembler(gateway).await;
    let results = assembler.search("matrix").await.unwrap();

    assert_eq!(ids(&results), vec![1, 3]);
}

#[tokio::test]
async fn primary_failure_surfaces_as_assembly_failed() {
    let gateway = ScriptedGateway {
        trending: Some(page_of(vec![], 1)),
        popular: Some(page_of(vec![], 1)),
        ..Default::default()
    };

    let mut assembler = fresh_assembler(gateway).await;
    let result = assembler
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await;

    assert!(matches!(result, Err(FeedError::AssemblyFailed)));
}

#[tokio::test]
async fn lifetime_seen_survives_engine_restart() {
    let store = Arc::new(MemoryStore::new());
    let movies: Vec<Movie> = (1..=60).map(movie).collect();

    let gateway = simple_gateway(movies);
    init_tracing();

    let mut first_session =
        FeedAssembler::new(Arc::new(gateway.clone()), store.clone(), false).await;
    let first = first_session
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 42)
        .await
        .unwrap();

    // A new engine over the same store still avoids the surfaced ids
    let mut second_session = FeedAssembler::new(Arc::new(gateway), store, false).await;
    assert_eq!(second_session.novelty().lifetime_len(), FEED_SIZE);

    let second = second_session
        .assemble(FeedMode::Discovery, None, FeedFlavor::Plain, 43)
        .await
        .unwrap();

    let first_ids: HashSet<u64> = ids(&first).into_iter().collect();
    for item in &second {
        assert!(!first_ids.contains(&item.id));
    }
}

#[tokio::test]
async fn persisted_taste_survives_engine_restart() {
    let store = Arc::new(MemoryStore::new());
    let gateway = simple_gateway(vec![]);
    init_tracing();

    let mut session = FeedAssembler::new(Arc::new(gateway.clone()), store.clone(), true).await;
    let liked = Movie {
        genre_ids: Some(vec![35, 18]),
        ..movie(1)
    };
    session
        .record_interaction(&liked, TasteSignal::MoreLikeThis)
        .await;

    let restarted = FeedAssembler::new(Arc::new(gateway), store, true).await;
    assert_eq!(restarted.taste().top_genres(2), vec![18, 35]);
}

#[tokio::test]
async fn match_percentage_stays_in_documented_bounds() {
    let assembler = fresh_assembler(simple_gateway(vec![])).await;

    // Cold start: no taste signal yet
    for seed in 1..100 {
        let pct = assembler.match_percentage(&movie(1), seed);
        assert!((72..=89).contains(&pct));
    }
}
