// crates/survey-gate-core/src/runtime/session.rs
// ============================================================================
// Module: Survey Gate Bounded Identity Session
// Description: Time-bounded wrapper around an identity session backend.
// Purpose: Keep a slow identity provider from stalling or opening the gate.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`BoundedIdentitySession`] runs each session query on a short-lived worker
//! thread and waits at most the configured budget for the answer. A query
//! that misses the budget yields [`SessionError::Timeout`], which the gate
//! treats as unauthenticated. `login_url` is a pure computation and is not
//! bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use crate::core::IdentityAttributes;
use crate::interfaces::IdentitySession;
use crate::interfaces::SessionError;

// ============================================================================
// SECTION: Bounded Session
// ============================================================================

/// Identity session whose queries are bounded by a timeout.
pub struct BoundedIdentitySession<S> {
    /// Wrapped session backend.
    inner: Arc<S>,
    /// Per-query time budget.
    timeout: Duration,
}

impl<S> BoundedIdentitySession<S>
where
    S: IdentitySession + Send + Sync + 'static,
{
    /// Wraps a session with a per-query timeout.
    #[must_use]
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    /// Runs a session query on a worker thread within the time budget.
    fn bounded<T, F>(&self, query: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, SessionError> + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name("sg-identity-session".to_string())
            .spawn(move || {
                // The caller may have given up already; a closed channel is fine.
                let _ = sender.send(query(&inner));
            })
            .map_err(|err| {
                SessionError::Unavailable(format!("failed to spawn session worker: {err}"))
            })?;
        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(SessionError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SessionError::Unavailable("session worker exited without answer".to_string()))
            }
        }
    }
}

impl<S> IdentitySession for BoundedIdentitySession<S>
where
    S: IdentitySession + Send + Sync + 'static,
{
    fn is_authenticated(&self) -> Result<bool, SessionError> {
        self.bounded(S::is_authenticated)
    }

    fn attributes(&self) -> Result<IdentityAttributes, SessionError> {
        self.bounded(S::attributes)
    }

    fn login_url(&self) -> String {
        self.inner.login_url()
    }
}
