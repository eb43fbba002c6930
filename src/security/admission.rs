//! Per-client admission control.
//!
//! Each client identity (the caller's IP address) owns one [`ClientRecord`]
//! tracking two signals: request volume within a fixed window and failed
//! authentication attempts. Both live in one table behind one mutex, so a
//! whole check-and-update is atomic across concurrent callers.
//!
//! # States
//! ```text
//! Fresh → Active: first contact creates the record
//! Active → Blocked: failed_attempts >= max_failed_attempts (lockout)
//!                   request_count >= max_requests_per_minute (throttle)
//! Blocked → Active: throttle deadline passes
//!                   failures reset (reset_failures or idle eviction)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::config::AdmissionConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Mutable state kept for one client identity.
#[derive(Debug, Clone)]
struct ClientRecord {
    request_count: u32,
    failed_attempts: u32,
    blocked_until: Option<Instant>,
    window_started: Instant,
    last_seen: Instant,
}

impl ClientRecord {
    fn new(now: Instant) -> Self {
        Self {
            request_count: 0,
            failed_attempts: 0,
            blocked_until: None,
            window_started: now,
            last_seen: now,
        }
    }
}

/// Read-only view of a client's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub request_count: u32,
    pub failed_attempts: u32,
    pub blocked_until: Option<Instant>,
}

/// Why a client was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Too many failed authentications.
    Lockout,
    /// Too many requests in the current window.
    Throttled,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Lockout => "lockout",
            DenyReason::Throttled => "throttled",
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted,
    Denied(DenyReason),
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted)
    }
}

/// Why [`AdmissionLimiter::attempt`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptError<E> {
    /// Turned away before `verify` ran.
    Denied(DenyReason),
    /// Admitted, but `verify` failed.
    Rejected(E),
}

/// Furthest deadline used when `now + duration` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// `now + duration`, saturating instead of panicking on overflow.
fn deadline(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Admission limiter owning the client table.
pub struct AdmissionLimiter {
    records: Mutex<HashMap<String, ClientRecord>>,
    config: AdmissionConfig,
}

impl AdmissionLimiter {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, ClientRecord>> {
        // A panic mid-update cannot leave a record in a state the checks
        // below do not handle, so a poisoned lock is still usable.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit or deny `client_id`, updating its counters.
    pub fn check_admission(&self, client_id: &str) -> bool {
        self.check(client_id).is_admitted()
    }

    /// Like [`check_admission`](Self::check_admission) but reports the reason
    /// for a denial.
    pub fn check(&self, client_id: &str) -> AdmissionDecision {
        self.check_at(client_id, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn check_at(&self, client_id: &str, now: Instant) -> AdmissionDecision {
        let mut table = self.table();
        let record = table
            .entry(client_id.to_string())
            .or_insert_with(|| ClientRecord::new(now));
        self.admit(record, now)
    }

    /// Admission check followed by `verify`, both under the table lock.
    ///
    /// A `verify` error counts as one failed attempt and a success clears
    /// the failure counter. Because no other check can interleave, at most
    /// `max_failed_attempts` rejected attempts get through before lockout,
    /// however many arrive at once.
    pub fn attempt<T, E>(
        &self,
        client_id: &str,
        verify: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, AttemptError<E>> {
        self.attempt_at(client_id, Instant::now(), verify)
    }

    pub fn attempt_at<T, E>(
        &self,
        client_id: &str,
        now: Instant,
        verify: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, AttemptError<E>> {
        let mut table = self.table();
        let record = table
            .entry(client_id.to_string())
            .or_insert_with(|| ClientRecord::new(now));

        if let AdmissionDecision::Denied(reason) = self.admit(record, now) {
            return Err(AttemptError::Denied(reason));
        }

        match verify() {
            Ok(value) => {
                record.failed_attempts = 0;
                record.blocked_until = None;
                Ok(value)
            }
            Err(e) => {
                record.failed_attempts = record.failed_attempts.saturating_add(1);
                Err(AttemptError::Rejected(e))
            }
        }
    }

    fn admit(&self, record: &mut ClientRecord, now: Instant) -> AdmissionDecision {
        let window = self.config.window();
        record.last_seen = now;

        if record.failed_attempts >= self.config.max_failed_attempts {
            record.blocked_until = Some(deadline(now, self.config.lockout()));
            return AdmissionDecision::Denied(DenyReason::Lockout);
        }

        if record.blocked_until.is_none() && now.duration_since(record.window_started) >= window {
            record.request_count = 0;
            record.window_started = now;
        }

        if record.request_count >= self.config.max_requests_per_minute {
            match record.blocked_until {
                Some(until) if now < until => {
                    return AdmissionDecision::Denied(DenyReason::Throttled);
                }
                Some(_) => {
                    record.request_count = 0;
                    record.blocked_until = None;
                    record.window_started = now;
                }
                None => {
                    record.blocked_until = Some(deadline(now, window));
                    return AdmissionDecision::Denied(DenyReason::Throttled);
                }
            }
        }

        record.request_count += 1;
        AdmissionDecision::Admitted
    }

    /// Count one failed authentication for `client_id`.
    pub fn record_failure(&self, client_id: &str) {
        self.record_failure_at(client_id, Instant::now());
    }

    pub fn record_failure_at(&self, client_id: &str, now: Instant) {
        let mut table = self.table();
        let record = table
            .entry(client_id.to_string())
            .or_insert_with(|| ClientRecord::new(now));
        record.failed_attempts = record.failed_attempts.saturating_add(1);
        record.last_seen = now;
    }

    /// Clear the failure counter and any deadline for `client_id`.
    pub fn reset_failures(&self, client_id: &str) {
        if let Some(record) = self.table().get_mut(client_id) {
            record.failed_attempts = 0;
            record.blocked_until = None;
        }
    }

    pub fn snapshot(&self, client_id: &str) -> Option<ClientSnapshot> {
        self.table().get(client_id).map(|r| ClientSnapshot {
            request_count: r.request_count,
            failed_attempts: r.failed_attempts,
            blocked_until: r.blocked_until,
        })
    }

    pub fn tracked_clients(&self) -> usize {
        self.table().len()
    }

    /// Evict records idle for longer than `idle_ttl` whose deadline has
    /// passed. Returns the number of records removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let idle_ttl = self.config.idle_ttl();
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, record| {
            let idle = now.saturating_duration_since(record.last_seen) >= idle_ttl;
            let still_blocked = record.blocked_until.is_some_and(|until| until > now);
            !idle || still_blocked
        });
        let evicted = before - table.len();
        metrics::record_tracked_clients(table.len());
        evicted
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` until shutdown.
    pub fn spawn_sweeper(self: Arc<Self>, shutdown: Shutdown) -> JoinHandle<()> {
        let period = self.config.sweep_interval();
        let stop = shutdown.wait();
        tokio::spawn(async move {
            tokio::pin!(stop);
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = self.sweep(Instant::now());
                        if evicted > 0 {
                            tracing::debug!(evicted, remaining = self.tracked_clients(), "Evicted idle client records");
                        }
                    }
                    _ = &mut stop => {
                        tracing::info!("Admission sweeper received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }
}
