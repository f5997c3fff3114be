// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-threaded readiness dispatcher.
//!
//! Sources (negotiation channels) are registered with an interest mask.
//! Whatever completes their I/O, usually a worker thread, signals readiness
//! through a cloneable [`ReadyNotifier`]; the dispatcher thread blocks in
//! [`Dispatch::work`] until a registered source is ready or the timeout
//! expires.
//!
//! ```text
//!   worker threads                      dispatcher thread
//!   --------------                      -----------------
//!   notifier.signal(id, WRITABLE) --+
//!                                   +--> ReadySet (Mutex + Condvar)
//!   notifier.signal(id, EXCEPTION) -+          |
//!                                              v
//!                                   Dispatch::work(timeout)
//!                                     -> [(id, mask & interest)]
//! ```
//!
//! Only the notifier crosses threads; `Dispatch` itself is driven from one
//! thread and needs `&mut self`.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Independent readiness flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: EventMask = EventMask(0);
    pub const READABLE: EventMask = EventMask(0b001);
    pub const WRITABLE: EventMask = EventMask(0b010);
    pub const EXCEPTION: EventMask = EventMask(0b100);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: EventMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: EventMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventMask {
    type Output = EventMask;

    fn bitand(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 & rhs.0)
    }
}

impl fmt::Debug for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::READABLE) {
            names.push("READABLE");
        }
        if self.contains(Self::WRITABLE) {
            names.push("WRITABLE");
        }
        if self.contains(Self::EXCEPTION) {
            names.push("EXCEPTION");
        }
        if names.is_empty() {
            write!(f, "EventMask(NONE)")
        } else {
            write!(f, "EventMask({})", names.join(" | "))
        }
    }
}

/// Identity of a dispatchable source (stable for the source's lifetime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

impl SourceId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// Registration surface consumed by negotiation connections.
pub trait Dispatcher {
    /// Register (or update) interest for `source`.
    fn add_source(&mut self, source: SourceId, interest: EventMask);

    /// Drop any registration for `source`; unknown sources are ignored.
    fn remove_source(&mut self, source: SourceId);
}

#[derive(Default)]
struct ReadySet {
    pending: Mutex<HashMap<SourceId, EventMask>>,
    condvar: Condvar,
}

/// Thread-safe handle used to report readiness to a [`Dispatch`].
#[derive(Clone)]
pub struct ReadyNotifier {
    ready: Arc<ReadySet>,
}

impl ReadyNotifier {
    /// Mark `source` ready for `events` and wake the dispatcher.
    pub fn signal(&self, source: SourceId, events: EventMask) {
        let mut pending = self.ready.pending.lock();
        *pending.entry(source).or_default() |= events;
        self.ready.condvar.notify_one();
    }
}

impl fmt::Debug for ReadyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyNotifier").finish_non_exhaustive()
    }
}

/// Readiness reported by [`Dispatch::work`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub source: SourceId,
    pub events: EventMask,
}

/// Reactor driven by one thread.
pub struct Dispatch {
    interest: HashMap<SourceId, EventMask>,
    ready: Arc<ReadySet>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self {
            interest: HashMap::new(),
            ready: Arc::new(ReadySet::default()),
        }
    }

    /// Handle for sources to signal readiness with.
    pub fn notifier(&self) -> ReadyNotifier {
        ReadyNotifier {
            ready: Arc::clone(&self.ready),
        }
    }

    pub fn interest(&self, source: SourceId) -> Option<EventMask> {
        self.interest.get(&source).copied()
    }

    pub fn source_count(&self) -> usize {
        self.interest.len()
    }

    /// Wait up to `timeout` for registered sources to become ready.
    ///
    /// Returns the ready sources masked by their registered interest.
    /// Signals for unregistered sources, or outside the interest mask, are
    /// consumed and discarded.
    pub fn work(&mut self, timeout: Duration) -> Vec<ReadyEvent> {
        let deadline = Instant::now() + timeout;
        let mut pending = self.ready.pending.lock();

        loop {
            let events: Vec<ReadyEvent> = pending
                .drain()
                .filter_map(|(source, events)| {
                    let interest = self.interest.get(&source).copied()?;
                    let masked = events & interest;
                    (!masked.is_empty()).then_some(ReadyEvent {
                        source,
                        events: masked,
                    })
                })
                .collect();

            if !events.is_empty() {
                return events;
            }
            if self.ready.condvar.wait_until(&mut pending, deadline).timed_out() {
                return Vec::new();
            }
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for Dispatch {
    fn add_source(&mut self, source: SourceId, interest: EventMask) {
        log::trace!("[dispatch] add source {:?} {:?}", source, interest);
        self.interest.insert(source, interest);
    }

    fn remove_source(&mut self, source: SourceId) {
        if self.interest.remove(&source).is_some() {
            log::trace!("[dispatch] remove source {:?}", source);
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("sources", &self.interest.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn mask_operations() {
        let mask = EventMask::WRITABLE | EventMask::EXCEPTION;
        assert!(mask.contains(EventMask::WRITABLE));
        assert!(!mask.contains(EventMask::READABLE));
        assert!(mask.intersects(EventMask::EXCEPTION | EventMask::READABLE));
        assert_eq!((mask & EventMask::READABLE), EventMask::NONE);
        assert_eq!(format!("{:?}", mask), "EventMask(WRITABLE | EXCEPTION)");
    }

    #[test]
    fn source_ids_are_unique() {
        assert_ne!(SourceId::next(), SourceId::next());
    }

    #[test]
    fn work_times_out_without_signals() {
        let mut dispatch = Dispatch::new();
        dispatch.add_source(SourceId::next(), EventMask::WRITABLE);
        let start = Instant::now();
        assert!(dispatch.work(Duration::from_millis(10)).is_empty());
        assert!(start.elapsed() >= Duration::from_millis(9));
    }

    #[test]
    fn pending_signal_returns_immediately() {
        let mut dispatch = Dispatch::new();
        let id = SourceId::next();
        dispatch.add_source(id, EventMask::WRITABLE | EventMask::EXCEPTION);
        dispatch.notifier().signal(id, EventMask::WRITABLE);

        let events = dispatch.work(Duration::from_secs(5));
        assert_eq!(
            events,
            vec![ReadyEvent {
                source: id,
                events: EventMask::WRITABLE
            }]
        );
    }

    #[test]
    fn signals_are_masked_by_interest() {
        let mut dispatch = Dispatch::new();
        let registered = SourceId::next();
        let stranger = SourceId::next();
        dispatch.add_source(registered, EventMask::WRITABLE);

        let notifier = dispatch.notifier();
        notifier.signal(registered, EventMask::READABLE);
        notifier.signal(stranger, EventMask::WRITABLE);

        assert!(dispatch.work(Duration::from_millis(5)).is_empty());
    }

    #[test]
    fn removed_source_is_not_reported() {
        let mut dispatch = Dispatch::new();
        let id = SourceId::next();
        dispatch.add_source(id, EventMask::WRITABLE);
        dispatch.remove_source(id);
        dispatch.remove_source(id);
        dispatch.notifier().signal(id, EventMask::WRITABLE);

        assert_eq!(dispatch.source_count(), 0);
        assert!(dispatch.work(Duration::from_millis(5)).is_empty());
    }

    #[test]
    fn cross_thread_signal_wakes_work() {
        let mut dispatch = Dispatch::new();
        let id = SourceId::next();
        dispatch.add_source(id, EventMask::EXCEPTION);
        let notifier = dispatch.notifier();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.signal(id, EventMask::EXCEPTION);
        });

        let events = dispatch.work(Duration::from_secs(5));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].events, EventMask::EXCEPTION);
        handle.join().unwrap();
    }
}
