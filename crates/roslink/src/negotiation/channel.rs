// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Negotiation channels: one outbound RPC call to a publisher's control
//! endpoint, observed without blocking.

use super::protocol::TopicRequest;
use super::value::RpcValue;
use crate::dispatch::{EventMask, ReadyNotifier, SourceId};
use crate::error::{Error, Result};
use crossbeam::channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Consumed contract of an in-flight RPC call.
pub trait NegotiationChannel: Send {
    /// Identity used for dispatcher registration.
    fn source_id(&self) -> SourceId;

    /// Liveness of the underlying call. A signal, not a verdict: the
    /// result may land right after this reads `false`.
    fn is_connected(&self) -> bool;

    /// Non-blocking fetch; yields the result exactly once.
    fn try_fetch_result(&mut self) -> Option<RpcValue>;

    /// Release the underlying resources. Called once by the owner.
    fn close(&mut self) {}
}

/// Opens channels towards publishers.
pub trait ChannelFactory: Send + Sync {
    fn open(
        &self,
        publisher_uri: &str,
        request: &TopicRequest,
        notifier: ReadyNotifier,
    ) -> Result<Box<dyn NegotiationChannel>>;
}

/// Channel running one blocking call on a worker thread.
///
/// The worker hands the result over a bounded crossbeam channel, then
/// clears the liveness flag, then signals the dispatcher (`WRITABLE` on
/// success, `EXCEPTION` on failure).
pub struct AsyncCallChannel {
    id: SourceId,
    remote_uri: String,
    receiver: Option<Receiver<RpcValue>>,
    running: Arc<AtomicBool>,
}

impl AsyncCallChannel {
    /// Start `call` on a dedicated thread.
    pub fn spawn<F>(
        remote_uri: impl Into<String>,
        notifier: Option<ReadyNotifier>,
        call: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<RpcValue, String> + Send + 'static,
    {
        let id = SourceId::next();
        let remote_uri = remote_uri.into();
        let (tx, rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));

        let flag = Arc::clone(&running);
        let uri = remote_uri.clone();
        thread::Builder::new()
            .name(format!("roslink-rpc-{}", id.as_raw()))
            .spawn(move || {
                let events = match call() {
                    Ok(value) => {
                        // Receiver may already be closed; nothing to deliver then.
                        let _ = tx.send(value);
                        EventMask::WRITABLE
                    }
                    Err(reason) => {
                        log::debug!("[negotiation] call to {} failed: {}", uri, reason);
                        EventMask::EXCEPTION
                    }
                };
                flag.store(false, Ordering::Release);
                if let Some(notifier) = notifier {
                    notifier.signal(id, events);
                }
            })
            .map_err(|e| Error::ChannelOpen {
                uri: remote_uri.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            remote_uri,
            receiver: Some(rx),
            running,
        })
    }

    pub fn remote_uri(&self) -> &str {
        &self.remote_uri
    }
}

impl NegotiationChannel for AsyncCallChannel {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.receiver.is_some() && self.running.load(Ordering::Acquire)
    }

    fn try_fetch_result(&mut self) -> Option<RpcValue> {
        self.receiver.as_ref()?.try_recv().ok()
    }

    fn close(&mut self) {
        self.receiver = None;
    }
}

/// [`ChannelFactory`] running `call(publisher_uri, params)` on an
/// [`AsyncCallChannel`] per publisher.
///
/// `call` is where an XML-RPC client plugs in.
pub struct AsyncCallFactory<F> {
    call: Arc<F>,
}

impl<F> AsyncCallFactory<F>
where
    F: Fn(&str, &RpcValue) -> std::result::Result<RpcValue, String> + Send + Sync + 'static,
{
    pub fn new(call: F) -> Self {
        Self {
            call: Arc::new(call),
        }
    }
}

impl<F> ChannelFactory for AsyncCallFactory<F>
where
    F: Fn(&str, &RpcValue) -> std::result::Result<RpcValue, String> + Send + Sync + 'static,
{
    fn open(
        &self,
        publisher_uri: &str,
        request: &TopicRequest,
        notifier: ReadyNotifier,
    ) -> Result<Box<dyn NegotiationChannel>> {
        let call = Arc::clone(&self.call);
        let uri = publisher_uri.to_string();
        let params = request.to_params();
        let channel = AsyncCallChannel::spawn(publisher_uri, Some(notifier), move || {
            call(&uri, &params)
        })?;
        Ok(Box::new(channel))
    }
}
