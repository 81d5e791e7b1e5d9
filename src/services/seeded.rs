/// Seeded deterministic generator
///
/// A linear-congruential bit source for reproducible shuffles and draws.
/// Cosmetic randomness only; identical seeds produce identical draw
/// sequences on any platform with 64-bit wrapping arithmetic.

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1;
/// Substitute state for a zero seed; avoids the degenerate all-zero stream
const ZERO_SEED_FALLBACK: u64 = 0x9E3779B97F4A7C15;

/// Seed offsets keeping distinct randomized steps of one reload on
/// distinct streams
pub const SHUFFLE_OFFSET: u64 = 10_000;
pub const TRIM_OFFSET: u64 = 20_000;
pub const JITTER_OFFSET: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { ZERO_SEED_FALLBACK } else { seed };
        Self { state }
    }

    /// Advances the generator and returns the new state
    pub fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform draw in the inclusive range [low, high]
    pub fn gen_range(&mut self, low: u64, high: u64) -> u64 {
        debug_assert!(low <= high);
        let span = high - low + 1;
        low + self.next() % span
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

/// Per-session seed state: a base seed plus a reload counter
///
/// Each reload advances the counter so that consecutive feed assemblies draw
/// from fresh streams while staying reproducible for a given base seed.
/// Per-purpose offsets are added on top of the effective seed by consumers.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    base: u64,
    reload: u64,
}

impl SessionSeed {
    pub fn new(base: u64) -> Self {
        Self { base, reload: 0 }
    }

    /// Current effective seed without advancing
    pub fn effective(&self) -> u64 {
        self.base.wrapping_add(self.reload)
    }

    /// Bumps the reload counter and returns the new effective seed
    pub fn advance(&mut self) -> u64 {
        self.reload += 1;
        self.effective()
    }

    pub fn reload_count(&self) -> u64 {
        self.reload
    }
}
