//! Games tracked by a viewer session.

use crate::worker::{CancelToken, PrecomputeTask, PrecomputeWorker};
use crate::{CacheConfig, GameHandle, GameStateComputation, PrecomputePolicy};
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use sgfplay_bowl::{BowlPhysics, ScatterBowl};
use sgfplay_core::{GameFingerprint, GameRecord};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Totals across every tracked game
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub games: usize,
    pub states: usize,
}

struct TrackedGame {
    handle: GameHandle,
    last_used: u64,
    cancel: CancelToken,
}

#[derive(Default)]
struct Games {
    map: FxHashMap<GameFingerprint, TrackedGame>,
    clock: u64,
}

impl Games {
    fn touch(&mut self, fingerprint: &GameFingerprint) -> Option<(GameHandle, CancelToken)> {
        self.clock += 1;
        let clock = self.clock;
        self.map.get_mut(fingerprint).map(|game| {
            game.last_used = clock;
            (Arc::clone(&game.handle), game.cancel.clone())
        })
    }

    /// Evict least recently used games until at most `limit` remain
    fn shrink_to(&mut self, limit: usize) {
        while self.map.len() > limit {
            let Some(oldest) = self
                .map
                .iter()
                .min_by_key(|(_, game)| game.last_used)
                .map(|(fp, _)| fp.clone())
            else {
                break;
            };
            if let Some(game) = self.map.remove(&oldest) {
                game.cancel.cancel();
                info!("Evicted least recently used game {}", oldest);
            }
        }
    }
}

/// One computation per game, keyed by fingerprint
pub struct GameCacheManager {
    config: CacheConfig,
    physics: Arc<dyn BowlPhysics>,
    games: Mutex<Games>,
    eccentricity: Mutex<f64>,
    worker: Option<PrecomputeWorker>,
}

impl GameCacheManager {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_physics(config, Arc::new(ScatterBowl::default()))
    }

    pub fn with_physics(config: CacheConfig, physics: Arc<dyn BowlPhysics>) -> Self {
        let worker = match config.policy {
            PrecomputePolicy::Eager => Some(PrecomputeWorker::new()),
            PrecomputePolicy::OnDemand => None,
        };
        let eccentricity = config.jitter.eccentricity;

        GameCacheManager {
            config,
            physics,
            games: Mutex::new(Games::default()),
            eccentricity: Mutex::new(eccentricity),
            worker,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn policy(&self) -> PrecomputePolicy {
        self.config.policy
    }

    /// Jitter amplitude applied to every game
    pub fn eccentricity(&self) -> f64 {
        *self.eccentricity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_games(&self) -> MutexGuard<'_, Games> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `record` under its content fingerprint
    pub fn load_game(&self, record: GameRecord) -> GameHandle {
        let fingerprint = record.fingerprint();
        self.load_game_with_fingerprint(fingerprint, record)
    }

    /// Track `record` under `fingerprint`, returning the existing computation
    /// if that fingerprint is already loaded
    pub fn load_game_with_fingerprint(
        &self,
        fingerprint: GameFingerprint,
        record: GameRecord,
    ) -> GameHandle {
        let mut games = self.lock_games();
        if let Some((handle, _)) = games.touch(&fingerprint) {
            debug!("Game {} already loaded", fingerprint);
            return handle;
        }

        let mut config = self.config.clone();
        config.jitter.eccentricity = self.eccentricity();
        let handle: GameHandle = Arc::new(GameStateComputation::new(
            fingerprint.clone(),
            record,
            &config,
            Arc::clone(&self.physics),
        ));
        let cancel = CancelToken::new();

        games.clock += 1;
        let clock = games.clock;
        games.map.insert(
            fingerprint.clone(),
            TrackedGame {
                handle: Arc::clone(&handle),
                last_used: clock,
                cancel: cancel.clone(),
            },
        );
        if let Some(limit) = self.config.max_games {
            games.shrink_to(limit.max(1));
        }
        drop(games);

        info!(
            "Loaded game {} ({} moves, {}x{})",
            fingerprint,
            handle.move_count(),
            handle.record().size(),
            handle.record().size()
        );
        self.request_precompute(&handle, cancel);
        handle
    }

    /// Computation for `fingerprint`, if tracked
    pub fn game(&self, fingerprint: &GameFingerprint) -> Option<GameHandle> {
        self.lock_games().touch(fingerprint).map(|(handle, _)| handle)
    }

    /// Ask for the whole game to be derived ahead of the viewer.
    ///
    /// Returns false if the game is not tracked.
    pub fn pre_calculate_game(&self, fingerprint: &GameFingerprint) -> bool {
        let found = self.lock_games().touch(fingerprint);
        match found {
            Some((handle, cancel)) => {
                self.request_precompute(&handle, cancel);
                true
            }
            None => {
                debug!("Precompute requested for unknown game {}", fingerprint);
                false
            }
        }
    }

    fn request_precompute(&self, handle: &GameHandle, cancel: CancelToken) {
        match &self.worker {
            None => debug!(
                "Game {} is derived on demand ({} of {} states cached)",
                handle.fingerprint(),
                handle.len(),
                handle.move_count() + 1
            ),
            Some(worker) => {
                let queued = worker.submit(PrecomputeTask {
                    game: Arc::clone(handle),
                    target: handle.move_count(),
                    cancel,
                });
                if !queued {
                    warn!("Precompute worker is gone, {} not queued", handle.fingerprint());
                }
            }
        }
    }

    /// Derive every tracked game in parallel, each under its own writer.
    ///
    /// Only eager managers compute; on-demand managers log and return 0.
    /// Returns the number of states derived.
    pub fn pre_calculate_all(&self) -> usize {
        let games: Vec<(GameHandle, CancelToken)> = self
            .lock_games()
            .map
            .values()
            .map(|game| (Arc::clone(&game.handle), game.cancel.clone()))
            .collect();

        if self.config.policy == PrecomputePolicy::OnDemand {
            debug!("{} games are derived on demand", games.len());
            return 0;
        }

        let derived: usize = games
            .par_iter()
            .map(|(handle, cancel)| {
                let before = handle.len();
                handle.calculate_until(handle.move_count(), cancel);
                handle.len().saturating_sub(before)
            })
            .sum();
        info!("Derived {} states across {} games", derived, games.len());
        derived
    }

    /// Stop tracking a game and cancel its queued work
    pub fn evict(&self, fingerprint: &GameFingerprint) -> bool {
        match self.lock_games().map.remove(fingerprint) {
            Some(game) => {
                game.cancel.cancel();
                info!("Evicted game {}", fingerprint);
                true
            }
            None => false,
        }
    }

    /// Stop tracking every game
    pub fn clear_cache(&self) {
        let mut games = self.lock_games();
        for game in games.map.values() {
            game.cancel.cancel();
        }
        let count = games.map.len();
        games.map.clear();
        info!("Cleared {} games", count);
    }

    pub fn cache_info(&self) -> CacheInfo {
        let games = self.lock_games();
        CacheInfo {
            games: games.map.len(),
            states: games.map.values().map(|game| game.handle.len()).sum(),
        }
    }

    /// Change the jitter amplitude of every tracked game and of games loaded
    /// later. Non-finite or non-positive values are ignored.
    pub fn set_eccentricity(&self, eccentricity: f64) -> bool {
        if !eccentricity.is_finite() || eccentricity <= 0.0 {
            warn!("Ignoring eccentricity {}", eccentricity);
            return false;
        }
        *self.eccentricity.lock().unwrap_or_else(PoisonError::into_inner) = eccentricity;

        let handles: Vec<GameHandle> = self
            .lock_games()
            .map
            .values()
            .map(|game| Arc::clone(&game.handle))
            .collect();
        handles.par_iter().for_each(|handle| {
            handle.set_eccentricity(eccentricity);
        });
        true
    }
}

impl Drop for GameCacheManager {
    fn drop(&mut self) {
        // Queued work is abandoned so the worker joins promptly
        for game in self.lock_games().map.values() {
            game.cancel.cancel();
        }
    }
}
