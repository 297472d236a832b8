//! Current-value observables.
//!
//! A subscriber first receives the value current at subscription time and
//! then every later value, in publication order. Publication and
//! subscription share one lock, so no update can slip between the snapshot
//! and the registration.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use parking_lot::Mutex;

struct Inner<T> {
    current: T,
    subscribers: Vec<Sender<T>>,
}

/// A value with ordered change notification.
pub struct Observable<T: Clone + Send> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone + Send> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Replace the value and notify every live subscriber.
    pub(crate) fn set(&self, value: T) {
        let mut inner = self.inner.lock();
        inner.current = value;
        let Inner {
            current,
            subscribers,
        } = &mut *inner;
        subscribers.retain(|tx| tx.send(current.clone()).is_ok());
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let mut inner = self.inner.lock();
        let (tx, rx) = mpsc::channel();
        // Cannot fail: rx is alive
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// Receiving end of an `Observable`. Dropping it unsubscribes.
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Block for the next value; `None` once the observable is gone.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Everything already delivered, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

impl<T> Iterator for Subscription<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}
