//! Correlation of dispatched registration requests with their redirect
//! callbacks, keyed by state token.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::registration::request::DeviceRegistrationRequest;

struct PendingEntry<H> {
    request: Option<DeviceRegistrationRequest>,
    handle: Option<H>,
    expires_at: DateTime<Utc>,
}

/// Keyed store mapping a state token to its pending registration request and
/// result-delivery handle.
///
/// Entries are write-once, read-once per field: `take_request` and
/// `take_result_handle` remove what they return, so a second take for the
/// same token finds nothing. Check-and-remove is atomic per key, which is
/// what stops two concurrent redirects for the same token from both
/// succeeding.
///
/// Construct one per process and inject it; there is no global instance.
/// Entries expire after a TTL (default 10 minutes) so abandoned flows do not
/// accumulate; [`sweep_expired`](Self::sweep_expired) reclaims them, and
/// dropping a swept handle wakes any flow still awaiting it.
pub struct CorrelationStore<H> {
    entries: Mutex<HashMap<String, PendingEntry<H>>>,
    ttl: Duration,
}

impl<H> CorrelationStore<H> {
    /// Store with the default 10 minute entry TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a pending correlation. Reusing a live state token overwrites
    /// the previous entry; that is tolerated but logged, since it means a
    /// caller generated a duplicate token.
    pub fn put(&self, state: impl Into<String>, request: DeviceRegistrationRequest, handle: H) {
        let state = state.into();
        let entry = PendingEntry {
            request: Some(request),
            handle: Some(handle),
            expires_at: Utc::now() + self.ttl,
        };
        let mut entries = self.entries.lock().unwrap();
        if entries.insert(state.clone(), entry).is_some() {
            tracing::warn!(%state, "overwrote pending correlation for reused state token");
        }
    }

    /// Remove and return the original request for a state token.
    /// Returns `None` for unknown, already-taken, or expired tokens.
    pub fn take_request(&self, state: &str) -> Option<DeviceRegistrationRequest> {
        self.take_field(state, |entry| entry.request.take())
    }

    /// Remove and return the result-delivery handle for a state token.
    /// Returns `None` for unknown, already-taken, or expired tokens.
    pub fn take_result_handle(&self, state: &str) -> Option<H> {
        self.take_field(state, |entry| entry.handle.take())
    }

    fn take_field<T>(
        &self,
        state: &str,
        take: impl FnOnce(&mut PendingEntry<H>) -> Option<T>,
    ) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(state)?;
        if entry.expires_at <= Utc::now() {
            entries.remove(state);
            return None;
        }
        let value = take(&mut *entry);
        if entry.request.is_none() && entry.handle.is_none() {
            entries.remove(state);
        }
        value
    }

    /// Drop every entry past its deadline, returning how many were removed.
    /// Dropping an entry drops its handle.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Remove all entries. Test/reset hook.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl<H> Default for CorrelationStore<H> {
    fn default() -> Self {
        Self::new()
    }
}
