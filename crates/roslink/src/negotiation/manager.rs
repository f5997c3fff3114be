// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dispatcher-thread owner of all pending negotiations.

use super::connection::{FailureVerdict, NegotiationConnection};
use crate::dispatch::{Dispatch, ReadyNotifier};
use std::time::Duration;

/// Drives pending [`NegotiationConnection`]s to completion.
///
/// Every poll and every owner callback runs on the thread calling
/// [`spin_once`](NegotiationManager::spin_once).
#[derive(Debug, Default)]
pub struct NegotiationManager {
    dispatch: Dispatch,
    connections: Vec<NegotiationConnection>,
}

impl NegotiationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier handed to channels so they can wake the dispatcher.
    pub fn notifier(&self) -> ReadyNotifier {
        self.dispatch.notifier()
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Remote URIs of the connections still negotiating.
    pub fn pending_uris(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.remote_uri()).collect()
    }

    /// Adopt `connection` and register it with the dispatcher.
    ///
    /// A negotiation that resolves during registration is disposed
    /// right away.
    pub fn add(&mut self, mut connection: NegotiationConnection) {
        connection.register_with_dispatcher(Some(&mut self.dispatch));
        if connection.is_completed() {
            connection.dispose();
            return;
        }
        log::debug!("[negotiation] pending {}", connection.remote_uri());
        self.connections.push(connection);
    }

    /// Wait up to `timeout` for readiness, then poll every connection.
    ///
    /// Returns the number of negotiations finalized by this call.
    pub fn spin_once(&mut self, timeout: Duration) -> usize {
        let ready = self.dispatch.work(timeout);
        if !ready.is_empty() {
            log::trace!("[negotiation] {} source(s) ready", ready.len());
        }
        self.poll_connections()
    }

    /// Poll every connection once, retiring the finalized and abandoned.
    ///
    /// Connections whose owner no longer wants a result are retired
    /// before being polled.
    ///
    /// Connections are polled even without a readiness signal so a
    /// missed wakeup only delays completion by one spin.
    pub fn poll_connections(&mut self) -> usize {
        let dispatch = &mut self.dispatch;
        let mut completed = 0;

        self.connections.retain_mut(|conn| {
            if conn.owner().is_some_and(|owner| !owner.wants_result(&*conn)) {
                log::debug!("[negotiation] {} no longer wanted", conn.remote_uri());
                conn.unregister_from_dispatcher(Some(&mut *dispatch));
                conn.dispose();
                return false;
            }

            let healthy = conn.poll();

            if conn.is_completed() {
                completed += 1;
                conn.unregister_from_dispatcher(Some(&mut *dispatch));
                conn.dispose();
                return false;
            }

            let Some(owner) = conn.owner() else {
                log::debug!("[negotiation] {} abandoned by its owner", conn.remote_uri());
                conn.unregister_from_dispatcher(Some(&mut *dispatch));
                conn.dispose();
                return false;
            };

            if healthy {
                return true;
            }

            match owner.pending_connection_failed(conn) {
                FailureVerdict::Keep => true,
                FailureVerdict::Abandon => {
                    log::info!(
                        "[negotiation] giving up on {} after {} failed poll(s)",
                        conn.remote_uri(),
                        conn.failures()
                    );
                    conn.unregister_from_dispatcher(Some(&mut *dispatch));
                    conn.dispose();
                    false
                }
            }
        });

        completed
    }

    /// Dispose every pending connection.
    pub fn shutdown(&mut self) {
        for mut conn in self.connections.drain(..) {
            conn.unregister_from_dispatcher(Some(&mut self.dispatch));
            conn.dispose();
        }
    }

    /// Spin until nothing is pending or `deadline` elapses.
    ///
    /// Returns `true` if every connection was retired.
    pub fn spin_until_idle(&mut self, step: Duration, deadline: Duration) -> bool {
        let start = std::time::Instant::now();
        while !self.is_empty() {
            if start.elapsed() >= deadline {
                return false;
            }
            self.spin_once(step);
        }
        true
    }
}

impl Drop for NegotiationManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
