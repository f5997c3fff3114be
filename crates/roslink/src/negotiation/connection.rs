// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polling state machine for one subscriber -> publisher negotiation.
//!
//! ```text
//!   Created --register--> Registered --poll(result)--> Completed
//!      |                      |                            |
//!      +--poll(result)--------+----------------------------+
//!      |                                                   |
//!      +------------------------dispose--------------------+--> Disposed
//! ```
//!
//! The owner callback fires at most once, from `Created` or `Registered`.
//! Liveness and result availability are observed separately; a result
//! that lands between the two reads is still delivered by the same
//! [`poll`](NegotiationConnection::poll).

use super::channel::NegotiationChannel;
use super::value::RpcValue;
use crate::dispatch::{Dispatcher, EventMask, SourceId};
use std::fmt;
use std::sync::{Arc, Weak};

/// Outcome of an unhealthy poll, decided by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Keep polling the same connection.
    Keep,
    /// Stop negotiating with this publisher.
    Abandon,
}

/// Receiver of negotiation outcomes (a subscription).
///
/// Callbacks run on the dispatcher thread and must not block.
pub trait NegotiationOwner: Send + Sync {
    /// The publisher answered. Invoked at most once per connection.
    fn pending_connection_done(&self, connection: &NegotiationConnection, result: RpcValue);

    /// A poll observed an unhealthy channel.
    ///
    /// The owner is the only party that records failures; the default
    /// records one and keeps polling.
    fn pending_connection_failed(&self, connection: &mut NegotiationConnection) -> FailureVerdict {
        connection.record_failure();
        FailureVerdict::Keep
    }

    /// Whether the owner still accepts a result for `connection`.
    ///
    /// Checked by the manager before every poll; `false` retires the
    /// connection without a callback.
    fn wants_result(&self, _connection: &NegotiationConnection) -> bool {
        true
    }
}

/// Lifecycle of a [`NegotiationConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Created,
    Registered,
    Completed,
    Disposed,
}

/// One in-flight `requestTopic` call towards a publisher.
pub struct NegotiationConnection {
    remote_uri: String,
    channel: Option<Box<dyn NegotiationChannel>>,
    owner: Weak<dyn NegotiationOwner>,
    failures: u32,
    state: ConnectionState,
}

impl NegotiationConnection {
    pub fn new(
        channel: Box<dyn NegotiationChannel>,
        owner: Weak<dyn NegotiationOwner>,
        remote_uri: impl Into<String>,
    ) -> Self {
        Self {
            remote_uri: remote_uri.into(),
            channel: Some(channel),
            owner,
            failures: 0,
            state: ConnectionState::Created,
        }
    }

    /// Connection holding a weak reference to `owner`.
    pub fn for_owner<O>(
        channel: Box<dyn NegotiationChannel>,
        owner: &Arc<O>,
        remote_uri: impl Into<String>,
    ) -> Self
    where
        O: NegotiationOwner + 'static,
    {
        let weak: Weak<dyn NegotiationOwner> = Arc::downgrade(owner) as Weak<dyn NegotiationOwner>;
        Self::new(channel, weak, remote_uri)
    }

    pub fn remote_uri(&self) -> &str {
        &self.remote_uri
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Count one failed attempt; returns the new total.
    pub fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        self.failures
    }

    /// Dispatcher identity of the channel, `None` once disposed.
    pub fn source_id(&self) -> Option<SourceId> {
        self.channel.as_ref().map(|c| c.source_id())
    }

    pub fn is_completed(&self) -> bool {
        self.state == ConnectionState::Completed
    }

    /// The owner has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.owner.strong_count() == 0
    }

    pub(crate) fn owner(&self) -> Option<Arc<dyn NegotiationOwner>> {
        self.owner.upgrade()
    }

    /// Register the channel for `WRITABLE | EXCEPTION` readiness.
    ///
    /// Polls first: a negotiation that already resolved is finalized and
    /// never registered. No-op without a dispatcher.
    pub fn register_with_dispatcher(&mut self, dispatcher: Option<&mut dyn Dispatcher>) {
        let Some(dispatcher) = dispatcher else {
            return;
        };
        if self.state == ConnectionState::Disposed {
            return;
        }

        self.poll();
        if self.is_completed() {
            log::debug!(
                "[negotiation] {} resolved before dispatcher registration",
                self.remote_uri
            );
            return;
        }

        if let Some(source) = self.source_id() {
            dispatcher.add_source(source, EventMask::WRITABLE | EventMask::EXCEPTION);
            self.state = ConnectionState::Registered;
        }
    }

    /// Remove the channel's registration. State is unchanged.
    pub fn unregister_from_dispatcher(&self, dispatcher: Option<&mut dyn Dispatcher>) {
        if let (Some(dispatcher), Some(source)) = (dispatcher, self.source_id()) {
            dispatcher.remove_source(source);
        }
    }

    /// Advance the negotiation without blocking.
    ///
    /// Returns `true` once finalized, otherwise the channel liveness:
    /// `true` means keep waiting, `false` means the channel looks
    /// unhealthy (or the owner is gone, see [`is_abandoned`]).
    ///
    /// [`is_abandoned`]: NegotiationConnection::is_abandoned
    pub fn poll(&mut self) -> bool {
        match self.state {
            ConnectionState::Completed => return true,
            ConnectionState::Disposed => return false,
            ConnectionState::Created | ConnectionState::Registered => {}
        }

        let Some(owner) = self.owner.upgrade() else {
            log::trace!("[negotiation] owner of {} released", self.remote_uri);
            return false;
        };
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };

        let connected = channel.is_connected();
        let mut fetched = channel.try_fetch_result();

        // The result can land between the liveness read and the fetch.
        if fetched.is_none() && !connected {
            fetched = channel.try_fetch_result();
            if fetched.is_some() {
                log::debug!(
                    "[negotiation] {} result landed after stale liveness read",
                    self.remote_uri
                );
            }
        }

        match fetched {
            Some(result) => {
                self.state = ConnectionState::Completed;
                owner.pending_connection_done(self, result);
                true
            }
            None => {
                if !connected {
                    log::debug!("[negotiation] {} channel not connected", self.remote_uri);
                }
                connected
            }
        }
    }

    /// Release the channel. Further polls are no-ops returning `false`.
    pub fn dispose(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
        self.state = ConnectionState::Disposed;
    }
}

impl Drop for NegotiationConnection {
    fn drop(&mut self) {
        if self.channel.is_some() {
            self.dispose();
        }
    }
}

impl fmt::Debug for NegotiationConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiationConnection")
            .field("remote_uri", &self.remote_uri)
            .field("state", &self.state)
            .field("failures", &self.failures)
            .field("source", &self.source_id())
            .finish()
    }
}
