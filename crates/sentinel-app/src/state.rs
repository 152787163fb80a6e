//! State shared between the runner, the game loop thread and ingestion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sentinel_core::commands::Command;
use sentinel_core::state::WorldSnapshot;

/// Messages for the game loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// Forward to the simulation engine at the next tick boundary.
    Sim(Command),
    /// Stop the loop after the current tick.
    Shutdown,
}

/// Shared runner state. Cloning shares the same cells.
#[derive(Clone)]
pub struct AppState {
    /// Latest snapshot for polling from other threads.
    pub latest_snapshot: Arc<Mutex<Option<WorldSnapshot>>>,
    /// Cleared when the loop exits; ingestion polls it.
    pub running: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn store_snapshot(&self, snapshot: WorldSnapshot) {
        if let Ok(mut lock) = self.latest_snapshot.lock() {
            *lock = Some(snapshot);
        }
    }

    pub fn latest(&self) -> Option<WorldSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|s| s.clone())
    }
}
