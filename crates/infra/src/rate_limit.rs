//! Per-client request admission.
//!
//! A fixed-window counter per key behind one mutex. Every admitted hit moves
//! the key's window start to `now`, so a key that stays active never sees its
//! window close; this mirrors the deployed behavior and is kept on purpose.
//!
//! A background sweeper evicts keys whose window has expired so memory is
//! bounded by the number of recently active clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Admissions allowed per window.
    pub max: u32,
    pub window: Duration,
    /// How often the sweeper runs.
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max: 20,
            window: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Result of an admission check. Denial is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        self == Admission::Allow
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
pub struct RateGovernor {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, WindowEntry>>,
}

impl RateGovernor {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    ///
    /// A denial leaves the map untouched.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        let mut clients = self.lock();
        if let Some(entry) = clients.get_mut(key).filter(|e| !self.expired(e, now)) {
            if entry.count >= self.config.max {
                debug!(client = %key, count = entry.count, "rate limit exceeded");
                return Admission::Deny;
            }
            entry.count += 1;
            entry.window_start = now;
            return Admission::Allow;
        }

        clients.insert(
            key.to_owned(),
            WindowEntry {
                count: 1,
                window_start: now,
            },
        );
        Admission::Allow
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drop every entry whose window has expired; returns how many went.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|_, entry| !self.expired(entry, now));
        let removed = before - clients.len();
        debug!(removed, remaining = clients.len(), "rate limiter sweep");
        removed
    }

    /// Number of keys currently holding state.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` until shut down.
    pub fn spawn_sweeper(self: &Arc<Self>) -> RateSweeperHandle {
        let governor = Arc::clone(self);
        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();
        let period = self.config.sweep_interval;

        let join = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = signal.notified() => {
                        debug!("rate limiter sweeper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        governor.sweep();
                    }
                }
            }
        });

        RateSweeperHandle { shutdown, join }
    }

    fn expired(&self, entry: &WindowEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.window_start) > self.config.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, WindowEntry>> {
        // Entries stay consistent even if a holder panicked mid-update.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Handle to the background sweeper.
#[derive(Debug)]
pub struct RateSweeperHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
}

impl RateSweeperHandle {
    /// Stop the sweeper and wait for it to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        let _ = self.join.await;
    }
}
