//! Shared bookkeeping for the stores: load status, last good snapshot and the
//! request sequence that keeps an older response from overwriting a newer one.

use crate::http_client::ApiResult;

/// Handle for one issued fetch. Only the most recently issued ticket of a
/// store is allowed to settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Every ticket issued so far becomes stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// How a mutation reaches the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStrategy {
    /// The server assigns identity, so the list is fetched again.
    RefetchAfter,
    /// The target is known; patch the cached entry in place.
    OptimisticPatch,
}

#[derive(Debug, Clone)]
pub struct Resource<T> {
    data: Option<T>,
    status: LoadStatus,
    seq: RequestSeq,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resource<T> {
    /// Starts out loading, the way a freshly mounted screen does.
    pub fn new() -> Self {
        Self {
            data: None,
            status: LoadStatus::Loading,
            seq: RequestSeq::default(),
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Issues a ticket and flips to loading. A previous error is dropped; the
    /// last good data stays visible.
    pub fn begin(&mut self) -> RequestTicket {
        self.status = LoadStatus::Loading;
        self.seq.issue()
    }

    /// Applies a fetch result if `ticket` is still the latest one. Returns
    /// whether it was applied.
    pub fn settle(&mut self, ticket: RequestTicket, result: ApiResult<T>) -> bool {
        if !self.seq.is_current(ticket) {
            tracing::debug!(ticket = ticket.seq(), "discarding stale response");
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.status = LoadStatus::Ready;
            }
            Err(err) => {
                self.status = LoadStatus::Failed(err.to_string());
            }
        }
        true
    }

    /// Fails without a request (domain validation). Pending tickets go stale.
    pub fn fail_now(&mut self, message: impl Into<String>) {
        self.seq.invalidate();
        self.status = LoadStatus::Failed(message.into());
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    /// Consumer went away: whatever is still in flight gets ignored.
    pub fn detach(&mut self) {
        self.seq.invalidate();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl MutationStatus {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish<T>(&mut self, result: ApiResult<T>) -> Option<T> {
        self.loading = false;
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn reject(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
