//! Per-call environment: log session name, deadline and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Carrier handed to every collaborator call.
///
/// Children derived with [`Env::with_session`] or [`Env::with_timeout`] share
/// the parent's cancellation flag, so cancelling the root stops every
/// invocation started under it.
#[derive(Debug, Clone)]
pub struct Env {
    session: String,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new("smbdriver")
    }
}

impl Env {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn with_session(&self, session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            ..self.clone()
        }
    }

    /// Derive a child whose deadline is at most `timeout` from now.
    ///
    /// An earlier deadline inherited from the parent is kept. A timeout too
    /// large to represent leaves the parent's deadline (or none) in place.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(existing), Some(candidate)) => Some(existing.min(candidate)),
            (existing, candidate) => existing.or(candidate),
        };
        Self {
            deadline,
            ..self.clone()
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
