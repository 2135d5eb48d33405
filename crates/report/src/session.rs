use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Guards against the stale-read race: a host that lets the user pick a
/// second file while the first read is still in flight must not let the
/// slow first result clobber the newer state. Each load gets a ticket;
/// only the newest ticket may commit.
#[derive(Debug, Default)]
pub struct LoadSession {
    current: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("resultado descartado: um carregamento mais recente foi iniciado")]
pub struct StaleLoad;

impl LoadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load. Every ticket issued earlier becomes stale.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Accepts `value` only when `ticket` still belongs to the newest
    /// load; otherwise the result is dropped.
    pub fn commit<T>(&self, ticket: LoadTicket, value: T) -> Result<T, StaleLoad> {
        if self.is_current(ticket) {
            Ok(value)
        } else {
            Err(StaleLoad)
        }
    }
}
