/// Cooperative cancellation and bounded exit waiting for search workers.
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cloneable flag polled by the worker at well-defined points.
///
/// Cancelling is one-way: once set, the token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the worker to stop as soon as possible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A one-shot latch that the worker trips when it exits.
///
/// Waiters block on a condition variable with a timeout rather than
/// polling the thread.
#[derive(Clone, Debug, Default)]
pub struct Completion(Arc<(Mutex<bool>, Condvar)>);

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the worker as exited and wake every waiter.
    pub fn finish(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock() = true;
        cvar.notify_all();
    }

    pub fn is_finished(&self) -> bool {
        *self.0 .0.lock()
    }

    /// Block until finished or `timeout` elapses. Returns `true` if finished.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.0;
        let mut done = lock.lock();
        if !*done {
            cvar.wait_while_for(&mut done, |done| !*done, timeout);
        }
        *done
    }

    /// A guard that trips the latch when dropped, including during unwinding.
    pub fn guard(&self) -> CompletionGuard {
        CompletionGuard(self.clone())
    }
}

pub struct CompletionGuard(Completion);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}
