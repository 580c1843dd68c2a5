//! Server shared state
//!
//! Holds the configuration and the session behind locks. Core computations
//! are synchronous; the locks only serialize access so every mutation still
//! goes through the session's entry points.

use crate::config::Config;
use crate::session::Session;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// The session: species, user location, filters, selection
    pub session: Arc<RwLock<Session>>,

    /// Monotonic fetch generation for last-writer-wins on remote refreshes
    fetch_seq: AtomicU64,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, session: Session) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session: Arc::new(RwLock::new(session)),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Start a new fetch generation, superseding any in-flight one
    pub fn begin_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `seq` is still the latest fetch generation
    ///
    /// A completed fetch whose generation is stale must discard its result
    /// rather than apply it.
    pub fn is_current_fetch(&self, seq: u64) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) == seq
    }
}
