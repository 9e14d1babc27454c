//! Background precompute worker.
//!
//! A single thread drains a task queue. Each task advances one game towards
//! a target index one state at a time, releasing the game's writer lock
//! between steps so viewers can read and derive states meanwhile.

use crate::GameHandle;
use crossbeam_channel::{unbounded, Sender};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Shared cancellation flag, checked between derivation steps
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Request to derive every state of `game` up to `target`
pub struct PrecomputeTask {
    pub game: GameHandle,
    pub target: usize,
    pub cancel: CancelToken,
}

/// Owner of the worker thread. Dropping it finishes the queued tasks that
/// are not cancelled and joins the thread.
pub struct PrecomputeWorker {
    tx: Option<Sender<PrecomputeTask>>,
    join: Option<thread::JoinHandle<()>>,
}

impl PrecomputeWorker {
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<PrecomputeTask>();

        let join = thread::spawn(move || {
            while let Ok(task) = rx.recv() {
                run_task(&task);
            }
            debug!("Precompute queue closed");
        });

        PrecomputeWorker {
            tx: Some(tx),
            join: Some(join),
        }
    }

    /// Queue a task. Returns false if the worker has shut down.
    pub fn submit(&self, task: PrecomputeTask) -> bool {
        match &self.tx {
            Some(tx) => tx.send(task).is_ok(),
            None => false,
        }
    }
}

impl Default for PrecomputeWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PrecomputeWorker {
    fn drop(&mut self) {
        // Closing the queue ends the receive loop
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn run_task(task: &PrecomputeTask) {
    let game = &task.game;
    if task.cancel.is_cancelled() {
        debug!("Skipping cancelled precompute of {}", game.fingerprint());
        return;
    }

    game.calculate_until(task.target, &task.cancel);

    if task.cancel.is_cancelled() {
        debug!(
            "Precompute of {} cancelled at {} states",
            game.fingerprint(),
            game.len()
        );
    } else {
        info!(
            "Precomputed {} states of {}",
            game.len(),
            game.fingerprint()
        );
    }
}
