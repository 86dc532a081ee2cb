//! Open/closed state and the in-flight drain barrier.
//!
//! The closed flag and the in-flight counter live under a single lock so a
//! submission can never slip between the closed check and its increment
//! while a shutdown flips the flag. Shutdown waits on a condition variable
//! that is signalled whenever the counter returns to zero.

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Returned by [`Lifecycle::submit_accepted`] once shutdown has begun.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("log pipeline is closed")]
pub struct Closed;

#[derive(Debug, Default)]
struct State {
    closed: bool,
    in_flight: usize,
}

/// Tracks whether the pipeline accepts work and how much is outstanding.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: Mutex<State>,
    drained: Condvar,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has begun. Once `true`, stays `true`.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of accepted batches not yet fully processed.
    pub fn pending(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Count one accepted submission.
    ///
    /// # Errors
    ///
    /// Returns [`Closed`] without touching the counter when shutdown has
    /// already begun.
    pub fn submit_accepted(&self) -> Result<(), Closed> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Closed);
        }
        state.in_flight += 1;
        Ok(())
    }

    /// Count one processed batch, delivered or failed.
    pub fn submit_completed(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.in_flight > 0, "completion without acceptance");
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 {
            self.drained.notify_all();
        }
    }

    /// Guard that calls [`submit_completed`](Self::submit_completed) when
    /// dropped, including during unwinding.
    pub fn completion(&self) -> Completion<'_> {
        Completion { lifecycle: self }
    }

    /// Flip the closed flag. Returns `false` when it was already set.
    pub fn begin_close(&self) -> bool {
        let mut state = self.state.lock();
        !std::mem::replace(&mut state.closed, true)
    }

    /// Block until every accepted submission has completed.
    pub fn wait_drained(&self) {
        let mut state = self.state.lock();
        while state.in_flight > 0 {
            self.drained.wait(&mut state);
        }
    }

    /// Close, run `signal` to stop worker intake, then wait for the drain.
    ///
    /// A second call returns `false` immediately without signalling or
    /// waiting.
    pub fn shutdown(&self, signal: impl FnOnce()) -> bool {
        if !self.begin_close() {
            return false;
        }
        signal();
        self.wait_drained();
        true
    }
}

/// Completion guard returned by [`Lifecycle::completion`].
#[must_use = "dropping the guard immediately completes the submission"]
pub struct Completion<'a> {
    lifecycle: &'a Lifecycle,
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.lifecycle.submit_completed();
    }
}
