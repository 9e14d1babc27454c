use sgfplay_jitter::JitterConfig;
use std::time::Duration;

/// When games are computed ahead of the viewer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrecomputePolicy {
    /// States are derived only when asked for; precompute requests are logged
    #[default]
    OnDemand,
    /// Loading or requesting a precompute queues the whole game on the
    /// background worker
    Eager,
}

/// Configuration shared by every game of a cache manager.
///
/// Distances are in grid units (one unit between adjacent lines).
#[derive(Clone, Debug, PartialEq)]
pub struct CacheConfig {
    pub jitter: JitterConfig,
    pub stone_radius: f64,
    pub bowl_radius: f64,
    /// Derivation steps slower than this are logged as warnings
    pub slow_step: Duration,
    /// Games kept before the least recently used one is evicted.
    /// `None` keeps every game until cleared.
    pub max_games: Option<usize>,
    pub policy: PrecomputePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            jitter: JitterConfig::default(),
            stone_radius: 0.48,
            bowl_radius: 6.0,
            slow_step: Duration::from_millis(50),
            max_games: None,
            policy: PrecomputePolicy::OnDemand,
        }
    }
}
