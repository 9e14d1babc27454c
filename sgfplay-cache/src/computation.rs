//! Per-game state derivation.
//!
//! A [`GameStateComputation`] owns the replay engine and jitter field of one
//! game behind a single writer lock. Each step derives the next move index
//! from the previous one and appends it to the game's [`GameStateCache`].

use crate::worker::CancelToken;
use crate::{BowlPair, CacheConfig, CachedGameState, GameStateCache};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use sgfplay_bowl::{BowlLayout, BowlPhysics};
use sgfplay_core::{
    captures, Board, BoardPosition, CaptureCounts, GameFingerprint, GameRecord, GoReplay,
    ReplayEngine,
};
use sgfplay_jitter::{JitterField, Occupancy, Offset2D};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Shared handle to one game's computation
pub type GameHandle = Arc<GameStateComputation>;

/// Where a game's cache stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePhase {
    Empty,
    Calculating { prefix_len: usize },
    Cached { prefix_len: usize },
}

/// Notification sent to subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEvent {
    BusyChanged { busy: bool },
    StateAppended { index: usize, progress: f64 },
    OffsetsRecomputed { eccentricity: f64, states: usize },
}

/// State owned by whoever holds the writer lock
struct Writer {
    replay: Box<dyn ReplayEngine>,
    jitter: JitterField,
}

/// Derivation and cache of every move index of one game
pub struct GameStateComputation {
    fingerprint: GameFingerprint,
    record: GameRecord,
    salt: u32,
    stone_radius: f64,
    bowl_radius: f64,
    slow_step: std::time::Duration,
    physics: Arc<dyn BowlPhysics>,
    cache: GameStateCache,
    writer: Mutex<Writer>,
    busy: AtomicUsize,
    subscribers: Mutex<Vec<Sender<CacheEvent>>>,
}

impl GameStateComputation {
    /// Computation replaying `record` with [`GoReplay`]
    pub fn new(
        fingerprint: GameFingerprint,
        record: GameRecord,
        config: &CacheConfig,
        physics: Arc<dyn BowlPhysics>,
    ) -> Self {
        Self::with_replay(fingerprint, record, config, physics, Box::new(GoReplay::new()))
    }

    pub fn with_replay(
        fingerprint: GameFingerprint,
        record: GameRecord,
        config: &CacheConfig,
        physics: Arc<dyn BowlPhysics>,
        mut replay: Box<dyn ReplayEngine>,
    ) -> Self {
        let salt = stonerandom::fingerprint_salt(fingerprint.as_str());
        replay.load(&record);
        let jitter = JitterField::new(record.size(), salt, config.jitter);

        GameStateComputation {
            fingerprint,
            record,
            salt,
            stone_radius: config.stone_radius,
            bowl_radius: config.bowl_radius,
            slow_step: config.slow_step,
            physics,
            cache: GameStateCache::new(),
            writer: Mutex::new(Writer { replay, jitter }),
            busy: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn fingerprint(&self) -> &GameFingerprint {
        &self.fingerprint
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn move_count(&self) -> usize {
        self.record.move_count()
    }

    /// Number of cached states
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// True once every index from 0 to `move_count` is cached
    pub fn is_complete(&self) -> bool {
        self.len() > self.move_count()
    }

    /// Fraction of the game's states already cached
    pub fn progress(&self) -> f64 {
        self.len() as f64 / (self.move_count() + 1) as f64
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire) > 0
    }

    pub fn phase(&self) -> CachePhase {
        let prefix_len = self.len();
        if self.is_busy() {
            CachePhase::Calculating { prefix_len }
        } else if prefix_len == 0 {
            CachePhase::Empty
        } else {
            CachePhase::Cached { prefix_len }
        }
    }

    /// Current jitter amplitude
    pub fn eccentricity(&self) -> f64 {
        self.lock_writer().jitter.config().eccentricity
    }

    /// Cached state for `index`, without deriving anything
    pub fn get_game_state(&self, index: usize) -> Option<Arc<CachedGameState>> {
        self.cache.get(index)
    }

    /// State for `index`, deriving every missing index before it.
    ///
    /// Returns `None` if `index` is past the last move.
    pub fn get_or_calculate(&self, index: usize) -> Option<Arc<CachedGameState>> {
        if index > self.move_count() {
            return None;
        }
        if let Some(state) = self.cache.get(index) {
            return Some(state);
        }
        self.calculate_until(index, &CancelToken::new())
    }

    /// Derive states up to `target` one step at a time, stopping early if
    /// `cancel` fires. Returns the state at `target` if it was reached.
    pub fn calculate_until(
        &self,
        target: usize,
        cancel: &CancelToken,
    ) -> Option<Arc<CachedGameState>> {
        let target = target.min(self.move_count());
        if self.len() > target {
            return self.cache.get(target);
        }

        self.enter_busy();
        let started = Instant::now();
        let first = self.len();
        while self.len() <= target && !cancel.is_cancelled() {
            if self.calculate_next().is_none() {
                break;
            }
        }
        let computed = self.len().saturating_sub(first);
        self.leave_busy();

        if computed > 0 {
            info!(
                "Derived {} states of {} in {:?}",
                computed,
                self.fingerprint,
                started.elapsed()
            );
        }
        self.cache.get(target)
    }

    /// Derive and append the next state. Returns `None` if the game is
    /// complete.
    pub fn calculate_next(&self) -> Option<Arc<CachedGameState>> {
        let mut writer = self.lock_writer();

        // Another writer may have appended while this one waited for the lock
        let index = self.cache.len();
        if index > self.move_count() {
            return None;
        }

        let started = Instant::now();
        let state = Arc::new(self.derive(&mut writer, index)?);
        if !self.cache.push(Arc::clone(&state)) {
            warn!("State {} of {} was not appended", index, self.fingerprint);
            return None;
        }
        drop(writer);

        let elapsed = started.elapsed();
        if elapsed > self.slow_step {
            warn!(
                "State {} of {} took {:?} (limit {:?})",
                index, self.fingerprint, elapsed, self.slow_step
            );
        }
        debug!(
            "State {} of {}: {} stones, captured B {} W {}",
            index,
            self.fingerprint,
            state.board.stone_count(),
            state.captures.black_captured,
            state.captures.white_captured
        );

        self.emit(CacheEvent::StateAppended {
            index,
            progress: self.progress(),
        });
        Some(state)
    }

    fn derive(&self, writer: &mut Writer, index: usize) -> Option<CachedGameState> {
        if !writer.replay.seek(index) {
            warn!("Replay of {} cannot reach index {}", self.fingerprint, index);
            return None;
        }
        let board = Arc::new(writer.replay.board().clone());
        let counts = captures(index, self.record.setup(), self.record.moves(), &board);
        let previous = index.checked_sub(1).and_then(|i| self.cache.get(i));
        let bowls = self.bowls_for(counts, previous.as_deref());
        let offsets = stone_offsets(&mut writer.jitter, &board, index, self.stone_radius);

        Some(CachedGameState {
            move_index: index,
            board,
            captures: counts,
            bowls,
            offsets,
            last_move: writer.replay.last_move(),
        })
    }

    /// Lid layouts for `counts`, reusing the previous layout of a lid whose
    /// count did not change
    fn bowls_for(&self, counts: CaptureCounts, previous: Option<&CachedGameState>) -> BowlPair {
        let lid = |count: usize, is_white: bool| -> Arc<BowlLayout> {
            let before = previous.map(|p| {
                if is_white {
                    (&p.bowls.white, p.captures.white_captured)
                } else {
                    (&p.bowls.black, p.captures.black_captured)
                }
            });
            match before {
                Some((layout, before_count)) if before_count == count => Arc::clone(layout),
                _ => Arc::new(self.physics.compute_stone_positions(
                    before.map_or(0, |(_, c)| c),
                    count,
                    self.bowl_radius,
                    self.stone_radius,
                    self.salt,
                    is_white,
                )),
            }
        };

        BowlPair {
            black: lid(counts.black_captured, false),
            white: lid(counts.white_captured, true),
        }
    }

    /// Change the jitter amplitude and recompute the offsets of every cached
    /// state. Boards, captures and bowls are kept.
    ///
    /// Returns false, changing nothing, for a non-finite or non-positive value.
    pub fn set_eccentricity(&self, eccentricity: f64) -> bool {
        if !eccentricity.is_finite() || eccentricity <= 0.0 {
            warn!("Ignoring eccentricity {}", eccentricity);
            return false;
        }

        let mut writer = self.lock_writer();
        if writer.jitter.config().eccentricity == eccentricity {
            return true;
        }

        let config = writer.jitter.config().with_eccentricity(eccentricity);
        writer.jitter.set_config(config);

        let started = Instant::now();
        let snapshot = self.cache.snapshot();
        let offsets: Vec<_> = snapshot
            .iter()
            .map(|state| {
                stone_offsets(
                    &mut writer.jitter,
                    &state.board,
                    state.move_index,
                    self.stone_radius,
                )
            })
            .collect();
        let states = self.cache.replace_offsets(offsets);
        drop(writer);

        info!(
            "Recomputed offsets of {} states of {} at eccentricity {} in {:?}",
            states,
            self.fingerprint,
            eccentricity,
            started.elapsed()
        );
        self.emit(CacheEvent::OffsetsRecomputed {
            eccentricity,
            states,
        });
        true
    }

    /// Receive events from this game. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    fn emit(&self, event: CacheEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn enter_busy(&self) {
        if self.busy.fetch_add(1, Ordering::AcqRel) == 0 {
            self.emit(CacheEvent::BusyChanged { busy: true });
        }
    }

    fn leave_busy(&self) {
        if self.busy.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.emit(CacheEvent::BusyChanged { busy: false });
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, Writer> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for GameStateComputation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateComputation")
            .field("fingerprint", &self.fingerprint)
            .field("states", &self.len())
            .field("move_count", &self.move_count())
            .finish()
    }
}

/// Offsets of every stone on `board`, queried in row-major order
fn stone_offsets(
    field: &mut JitterField,
    board: &Board,
    move_index: usize,
    radius: f64,
) -> BTreeMap<BoardPosition, Offset2D> {
    let occupied = Occupancy::from_board(board);
    field.prepare(move_index, &occupied);

    board
        .occupied_positions()
        .filter_map(|(pos, _)| {
            field
                .offset(pos.x, pos.y, move_index, radius, &occupied)
                .map(|offset| (pos, offset))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgfplay_bowl::ScatterBowl;
    use sgfplay_core::{Color, Move};

    fn game(moves: Vec<Move>) -> GameStateComputation {
        let record = GameRecord::new(9, vec![], moves).unwrap();
        GameStateComputation::new(
            record.fingerprint(),
            record,
            &CacheConfig::default(),
            Arc::new(ScatterBowl::default()),
        )
    }

    #[test]
    fn test_phase_transitions() {
        let game = game(vec![Move::play(Color::Black, 2, 2)]);
        assert_eq!(game.phase(), CachePhase::Empty);

        game.get_or_calculate(0);
        assert_eq!(game.phase(), CachePhase::Cached { prefix_len: 1 });

        game.get_or_calculate(1);
        assert_eq!(game.phase(), CachePhase::Cached { prefix_len: 2 });
        assert!(game.is_complete());
        assert!(game.calculate_next().is_none());
    }

    #[test]
    fn test_cancelled_before_start() {
        let game = game(vec![Move::play(Color::Black, 2, 2), Move::pass(Color::White)]);
        let token = CancelToken::new();
        token.cancel();
        assert!(game.calculate_until(2, &token).is_none());
        assert!(game.is_empty());
        assert!(!game.is_busy());
    }

    #[test]
    fn test_unchanged_lid_is_shared() {
        let game = game(vec![
            Move::play(Color::Black, 0, 1),
            Move::play(Color::White, 0, 0),
            Move::play(Color::Black, 1, 0),
            Move::play(Color::White, 5, 5),
        ]);
        let before = game.get_or_calculate(2).unwrap();
        let capture = game.get_or_calculate(3).unwrap();
        let after = game.get_or_calculate(4).unwrap();

        assert_eq!(capture.captures.white_captured, 1);
        assert_eq!(capture.bowls.white.len(), 1);
        assert!(!Arc::ptr_eq(&before.bowls.white, &capture.bowls.white));
        assert!(Arc::ptr_eq(&before.bowls.black, &capture.bowls.black));
        assert!(Arc::ptr_eq(&capture.bowls.white, &after.bowls.white));
    }

    #[test]
    fn test_rejected_eccentricity() {
        let game = game(vec![Move::play(Color::Black, 2, 2)]);
        game.get_or_calculate(1);
        let events = game.subscribe();

        assert!(!game.set_eccentricity(f64::NAN));
        assert!(!game.set_eccentricity(0.0));
        assert!(!game.set_eccentricity(-1.0));
        assert_eq!(game.eccentricity(), 1.0);
        assert!(events.try_recv().is_err());
    }
}
