//! Per-account refresh scheduling and snapshot ownership
//!
//! One [`RefreshCoordinator`] exists per configured account. It owns the
//! recurring refresh timer, the last-good [`Snapshot`], the derived
//! availability flag, and the subscriber table. Metric views and the host
//! platform only ever read from it.

use crate::error::{AurigaError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::upstream::{Snapshot, StatisticsSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Default wall-clock refresh interval (60 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`RefreshCoordinator::subscribe`]; pass it back to
/// [`RefreshCoordinator::unsubscribe`] to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionToken(u64);

struct CoordinatorState {
    /// Last known good snapshot; kept stale across transient failures
    snapshot: Option<Arc<Snapshot>>,
    /// True iff the most recent refresh succeeded
    available: bool,
    /// Set when a post-setup refresh fails authentication; cleared only by
    /// replacing the coordinator with fresh credentials
    needs_reauth: bool,
    /// Cleared by `stop()`; an in-flight refresh may not write once false
    live: bool,
}

/// Owns the refresh cycle for a single account.
pub struct RefreshCoordinator {
    account_id: String,
    source: Arc<dyn StatisticsSource>,
    state: RwLock<CoordinatorState>,
    listeners: StdMutex<HashMap<u64, Listener>>,
    next_token: AtomicU64,
    /// Serializes refreshes; a timer tick never overlaps a manual refresh
    refresh_gate: AsyncMutex<()>,
    timer: StdMutex<Option<JoinHandle<()>>>,
    logger: StructuredLogger,
}

impl RefreshCoordinator {
    /// Create a coordinator for one account bound to the given data source
    pub fn new<S: Into<String>>(account_id: S, source: Arc<dyn StatisticsSource>) -> Arc<Self> {
        let account_id = account_id.into();
        let logger = get_logger_with_context(
            LogContext::new("coordinator").with_account(account_id.clone()),
        );
        Arc::new(Self {
            account_id,
            source,
            state: RwLock::new(CoordinatorState {
                snapshot: None,
                available: false,
                needs_reauth: false,
                live: true,
            }),
            listeners: StdMutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
            refresh_gate: AsyncMutex::new(()),
            timer: StdMutex::new(None),
            logger,
        })
    }

    /// Account id this coordinator was created for
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Perform one eager refresh, then schedule recurring refreshes.
    ///
    /// The first refresh gates setup: if it fails there is no prior snapshot
    /// to fall back on, so the error is propagated and no timer is started.
    /// Authentication failures in particular must reach the caller so the
    /// operator can be prompted for new credentials.
    pub async fn start(coordinator: &Arc<Self>, every: Duration) -> Result<()> {
        coordinator.refresh().await?;

        // Weak handle so a coordinator dropped without stop() does not keep
        // its own timer task alive forever.
        let weak = Arc::downgrade(coordinator);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the eager refresh above
            // already covered it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(c) = weak.upgrade() else { break };
                if let Err(e) = c.refresh().await {
                    // Availability was already flipped inside refresh()
                    c.logger.debug(&format!("Scheduled refresh failed: {}", e));
                }
            }
        });

        if let Ok(mut timer) = coordinator.timer.lock() {
            *timer = Some(handle);
        }
        coordinator
            .logger
            .info(&format!("Refresh scheduled every {:?}", every));
        Ok(())
    }

    /// Fetch both upstream records and replace the snapshot.
    ///
    /// Refreshes are serialized by an in-flight guard. Both fetches run
    /// concurrently and both must succeed before anything becomes visible;
    /// a half-updated snapshot is never observable. On failure the previous
    /// snapshot stays in place and availability flips to false. Subscribers
    /// are notified exactly once per refresh, success or failure.
    pub async fn refresh(&self) -> Result<()> {
        let _inflight = self.refresh_gate.lock().await;

        if self.needs_reauth() {
            // Hammering the API with rejected credentials will not recover;
            // stay unavailable until the operator re-authenticates.
            self.logger
                .warn("Skipping refresh; account requires re-authentication");
            self.notify_listeners();
            return Err(AurigaError::auth("re-authentication required"));
        }

        self.logger.debug("Fetching Flitsmeister data");
        let (profile, statistics) =
            tokio::join!(self.source.fetch_profile(), self.source.fetch_statistics());

        let outcome = match (profile, statistics) {
            (Ok(profile), Ok(statistics)) => Ok(Snapshot::new(profile, statistics)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        let result = match outcome {
            Ok(snapshot) => {
                let replaced = {
                    let mut state = write_state(&self.state);
                    if state.live {
                        state.snapshot = Some(Arc::new(snapshot));
                        state.available = true;
                        true
                    } else {
                        false
                    }
                };
                if replaced {
                    self.logger.debug("Refresh succeeded; snapshot replaced");
                } else {
                    self.logger
                        .debug("Refresh finished after teardown; result discarded");
                }
                Ok(())
            }
            Err(e) => {
                {
                    let mut state = write_state(&self.state);
                    if state.live {
                        state.available = false;
                        if e.is_authentication() {
                            state.needs_reauth = true;
                        }
                    }
                }
                if e.is_authentication() {
                    self.logger.error(&format!(
                        "Authentication failed; re-authentication required: {}",
                        e
                    ));
                } else {
                    self.logger
                        .warn(&format!("Refresh failed; keeping previous snapshot: {}", e));
                }
                Err(e)
            }
        };

        self.notify_listeners();
        result
    }

    /// Register a callback invoked after every refresh, success or failure
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionToken
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_token.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(id, Arc::new(listener));
        }
        SubscriptionToken(id)
    }

    /// Deregister a subscriber; unknown or already-removed tokens are a no-op
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.remove(&token.0);
        }
    }

    /// Cancel the timer and block any in-flight refresh from writing.
    ///
    /// Taking the state write lock orders this against an in-flight
    /// snapshot replacement: whichever side wins the lock, no write lands
    /// after `stop()` has returned.
    pub fn stop(&self) {
        {
            let mut state = write_state(&self.state);
            state.live = false;
            state.available = false;
        }
        if let Ok(mut timer) = self.timer.lock()
            && let Some(handle) = timer.take()
        {
            handle.abort();
        }
        self.logger.info("Coordinator stopped");
    }

    /// Last known good snapshot, if any refresh ever succeeded
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        read_state(&self.state, |s| s.snapshot.clone())
    }

    /// True iff the most recent refresh succeeded
    pub fn is_available(&self) -> bool {
        read_state(&self.state, |s| s.available)
    }

    /// Whether a post-setup refresh was rejected for bad credentials
    pub fn needs_reauth(&self) -> bool {
        read_state(&self.state, |s| s.needs_reauth)
    }

    fn notify_listeners(&self) {
        // Callbacks run outside the lock; a listener may re-enter
        // subscribe/unsubscribe on this coordinator without deadlocking.
        let current: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in current {
            listener();
        }
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock()
            && let Some(handle) = timer.take()
        {
            handle.abort();
        }
    }
}

fn read_state<T>(lock: &RwLock<CoordinatorState>, f: impl FnOnce(&CoordinatorState) -> T) -> T {
    match lock.read() {
        Ok(guard) => f(&guard),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

fn write_state(lock: &RwLock<CoordinatorState>) -> std::sync::RwLockWriteGuard<'_, CoordinatorState> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
