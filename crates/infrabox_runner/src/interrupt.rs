//! Terminal interrupt bookkeeping.
//!
//! Ctrl-C reaches both Infrabox and any child in the foreground process
//! group. While a child is running, the child gets to shut down on its own
//! and the runner reports the interrupt once it has exited. With no child
//! running (for example while waiting at a prompt) the process should abort
//! straight away.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// What the signal handler should do with an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// A child process is running; let it stop first.
    WaitForChild,
    /// Nothing is running; exit now.
    Abort,
}

#[derive(Debug, Default)]
struct State {
    running: AtomicUsize,
    interrupted: AtomicBool,
}

/// Shared between the signal handler and the [`ProcessRunner`](crate::ProcessRunner).
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    state: Arc<State>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interrupt and decide how to react to it.
    pub fn signal(&self) -> InterruptAction {
        self.state.interrupted.store(true, Ordering::SeqCst);
        if self.running() > 0 {
            InterruptAction::WaitForChild
        } else {
            InterruptAction::Abort
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.state.interrupted.load(Ordering::SeqCst)
    }

    /// Number of child processes currently running.
    pub fn running(&self) -> usize {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Mark a child as running until the guard is dropped.
    pub fn track_child(&self) -> ChildGuard {
        self.state.running.fetch_add(1, Ordering::SeqCst);
        ChildGuard {
            state: self.state.clone(),
        }
    }
}

/// Returned by [`Interrupts::track_child`].
#[derive(Debug)]
pub struct ChildGuard {
    state: Arc<State>,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.state.running.fetch_sub(1, Ordering::SeqCst);
    }
}
