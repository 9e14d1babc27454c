//! Incremental game state cache.
//!
//! For every move index of a loaded game the cache derives an immutable
//! [`CachedGameState`]: board snapshot, capture counts, bowl layouts and the
//! jittered offset of every stone. States are computed in order, appended
//! one at a time, and shared as `Arc`s so readers never see a partial state.
//!
//! [`GameCacheManager`] keeps one [`GameStateComputation`] per game and can
//! precompute them on a background worker or in parallel.

mod cache;
mod computation;
mod config;
mod manager;
mod state;
mod worker;

pub use cache::GameStateCache;
pub use computation::{CacheEvent, CachePhase, GameHandle, GameStateComputation};
pub use config::{CacheConfig, PrecomputePolicy};
pub use manager::{CacheInfo, GameCacheManager};
pub use state::{BowlPair, CachedGameState};
pub use worker::{CancelToken, PrecomputeTask, PrecomputeWorker};
