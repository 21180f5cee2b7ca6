//! Periodic, single-flight refresh of a shared data snapshot.
//!
//! [`UpdateCoordinator`] owns the "latest result" a host reads. It refreshes that result on a
//! fixed interval (see [`UpdateCoordinator::spawn_periodic`]) or on demand
//! ([`UpdateCoordinator::refresh`]), and never runs two refreshes at the same time: a refresh
//! requested while another is in flight waits for, and returns, the in-flight result.
//!
//! A failed refresh keeps the previous data around but flips
//! [`UpdateCoordinator::last_update_success`] so the host can mark it unavailable. There is no
//! retry beyond the next scheduled tick.

use crate::error::RefreshError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Default interval between two scheduled refreshes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Produces a fresh snapshot of the data a coordinator manages.
pub trait Update: Send + Sync + 'static {
    type Data: Send + Sync + 'static;

    fn update(&self) -> impl Future<Output = Result<Self::Data, RefreshError>> + Send;
}

/// What a refresh hands back to everyone who asked for it.
pub type Outcome<T> = Result<Arc<T>, Arc<RefreshError>>;

type InFlight<T> = watch::Receiver<Option<Outcome<T>>>;

enum Role<T> {
    Leader(watch::Sender<Option<Outcome<T>>>),
    Follower(InFlight<T>),
}

pub struct UpdateCoordinator<U: Update> {
    name: String,
    updater: U,
    update_interval: Duration,
    data: watch::Sender<Option<Arc<U::Data>>>,
    last_update_success: AtomicBool,
    in_flight: Mutex<Option<InFlight<U::Data>>>,
}

impl<U: Update> std::fmt::Debug for UpdateCoordinator<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCoordinator")
            .field("name", &self.name)
            .field("update_interval", &self.update_interval)
            .field("last_update_success", &self.last_update_success())
            .field("refreshing", &self.in_flight.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl<U: Update> UpdateCoordinator<U> {
    pub fn new(name: impl Into<String>, updater: U, update_interval: Duration) -> Self {
        Self {
            name: name.into(),
            updater,
            update_interval,
            data: watch::Sender::new(None),
            last_update_success: AtomicBool::new(true),
            in_flight: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn updater(&self) -> &U {
        &self.updater
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// The result of the last successful refresh, if there has been one.
    pub fn data(&self) -> Option<Arc<U::Data>> {
        self.data.borrow().clone()
    }

    /// Returns a receiver that is notified whenever a refresh publishes new data.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<U::Data>>> {
        self.data.subscribe()
    }

    /// Whether the most recent refresh succeeded.
    ///
    /// This is `true` before the first refresh.
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Acquire)
    }

    /// Refreshes the data now, or joins the refresh that is already running.
    pub async fn refresh(&self) -> Outcome<U::Data> {
        loop {
            match self.join_or_lead() {
                Role::Leader(tx) => {
                    let _done = ClearInFlight(&self.in_flight);
                    let outcome = self.run_update().await;
                    tx.send_replace(Some(outcome.clone()));
                    return outcome;
                }
                Role::Follower(mut rx) => {
                    tracing::trace!(name = %self.name, "joining in-flight refresh");
                    let published = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|outcome| outcome.clone());
                    if let Some(outcome) = published {
                        return outcome;
                    }
                    // the leading refresh was cancelled before it finished
                    tracing::debug!(name = %self.name, "in-flight refresh went away, retrying");
                }
            }
        }
    }

    /// Spawns a task that refreshes the data every [`Self::update_interval`], starting now.
    ///
    /// Failures are logged and otherwise ignored; the next tick simply tries again.
    pub fn spawn_periodic(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.update_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let _ = this.refresh().await;
            }
        })
    }

    fn join_or_lead(&self) -> Role<U::Data> {
        let mut in_flight = self.in_flight.lock();
        if let Some(rx) = &*in_flight {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        *in_flight = Some(rx);
        Role::Leader(tx)
    }

    async fn run_update(&self) -> Outcome<U::Data> {
        let start = Instant::now();
        match self.updater.update().await {
            Ok(data) => {
                let data = Arc::new(data);
                self.data.send_replace(Some(Arc::clone(&data)));
                if !self.last_update_success.swap(true, Ordering::AcqRel) {
                    tracing::info!(name = %self.name, "fetching data recovered");
                }
                tracing::debug!(
                    name = %self.name,
                    elapsed = ?start.elapsed(),
                    "finished fetching data"
                );
                Ok(data)
            }
            Err(e) => {
                if self.last_update_success.swap(false, Ordering::AcqRel) {
                    tracing::error!(
                        name = %self.name,
                        kind = ?e.kind(),
                        error = %DisplayChain(&e),
                        "error fetching data"
                    );
                } else {
                    tracing::debug!(
                        name = %self.name,
                        kind = ?e.kind(),
                        error = %DisplayChain(&e),
                        "error fetching data (still failing)"
                    );
                }
                Err(Arc::new(e))
            }
        }
    }
}

/// Marks the coordinator idle again when the leading refresh ends, including by cancellation.
struct ClearInFlight<'a, T>(&'a Mutex<Option<InFlight<T>>>);

impl<T> Drop for ClearInFlight<'_, T> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

/// Formats an error followed by its sources, `a: b: c`.
pub struct DisplayChain<'a>(pub &'a (dyn std::error::Error + 'static));

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(e) = source {
            write!(f, ": {e}")?;
            source = e.source();
        }
        Ok(())
    }
}
