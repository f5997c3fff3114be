// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscriber endpoint: tracks the publishers of one topic and negotiates
//! a transport with each of them.

use crate::config::NodeConfig;
use crate::msg::RosMessage;
use crate::negotiation::{
    ChannelFactory, FailureVerdict, NegotiatedTransport, NegotiationConnection,
    NegotiationManager, NegotiationOwner, RpcValue, TopicRequest, TCPROS,
};
use crate::registry::MessageTypeRegistry;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Publisher with a negotiated transport.
#[derive(Debug, Clone)]
pub struct PublisherLink {
    pub publisher_uri: String,
    pub transport: NegotiatedTransport,
    /// Default instance of the subscribed type, used to decode samples.
    pub prototype: Arc<dyn RosMessage>,
}

#[derive(Default)]
struct SubscriptionState {
    pending: Vec<String>,
    links: Vec<PublisherLink>,
    /// Publishers whose reply could not be used. Kept until they leave
    /// the publisher list.
    rejected: Vec<String>,
    shut_down: bool,
}

impl SubscriptionState {
    /// Returns `true` if `uri` was pending.
    fn forget_pending(&mut self, uri: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p != uri);
        self.pending.len() != before
    }

    fn is_pending(&self, uri: &str) -> bool {
        self.pending.iter().any(|p| p == uri)
    }

    fn is_known(&self, uri: &str) -> bool {
        self.is_pending(uri)
            || self.rejected.iter().any(|r| r == uri)
            || self.links.iter().any(|l| l.publisher_uri == uri)
    }
}

/// One topic subscription.
pub struct Subscription {
    topic: String,
    message_type: String,
    caller_id: String,
    max_failures: u32,
    registry: Arc<MessageTypeRegistry>,
    factory: Arc<dyn ChannelFactory>,
    state: Mutex<SubscriptionState>,
}

impl Subscription {
    pub fn new(
        topic: impl Into<String>,
        message_type: impl Into<String>,
        registry: Arc<MessageTypeRegistry>,
        config: &NodeConfig,
        factory: Arc<dyn ChannelFactory>,
    ) -> Arc<Self> {
        let topic = topic.into();
        let message_type = message_type.into();
        if !registry.contains(&message_type) {
            log::warn!(
                "[subscription] {}: message type {} is not registered",
                topic,
                message_type
            );
        }
        Arc::new(Self {
            topic,
            message_type,
            caller_id: config.node_name.clone(),
            max_failures: config.negotiation.max_failures,
            registry,
            factory,
            state: Mutex::new(SubscriptionState::default()),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Reconcile with the current publisher list of the topic.
    ///
    /// Opens a negotiation for every new publisher. Publishers no longer
    /// listed lose their link, and their in-flight negotiation is retired
    /// by the manager on its next poll. A rejected publisher is retried
    /// only after it has left the list once. Returns the number of
    /// negotiations started.
    pub fn pub_update<S: AsRef<str>>(
        self: &Arc<Self>,
        publisher_uris: &[S],
        manager: &mut NegotiationManager,
    ) -> usize {
        let to_open: Vec<String> = {
            let mut state = self.state.lock();
            if state.shut_down {
                return 0;
            }

            let listed = |uri: &str| publisher_uris.iter().any(|u| u.as_ref() == uri);
            state.links.retain(|link| {
                let keep = listed(&link.publisher_uri);
                if !keep {
                    log::info!(
                        "[subscription] {}: publisher {} went away",
                        self.topic,
                        link.publisher_uri
                    );
                }
                keep
            });
            state.pending.retain(|uri| {
                let keep = listed(uri);
                if !keep {
                    log::debug!(
                        "[subscription] {}: dropping negotiation with {}",
                        self.topic,
                        uri
                    );
                }
                keep
            });
            state.rejected.retain(|uri| listed(uri));

            let mut fresh = Vec::new();
            for uri in publisher_uris.iter().map(|u| u.as_ref()) {
                if !state.is_known(uri) && !fresh.iter().any(|f: &String| f == uri) {
                    fresh.push(uri.to_string());
                }
            }
            state.pending.extend(fresh.iter().cloned());
            fresh
        };

        // Lock released: registration may finalize synchronously and call back.
        let mut opened = 0;
        for uri in to_open {
            let request = TopicRequest::tcpros(self.caller_id.as_str(), self.topic.as_str());
            match self.factory.open(&uri, &request, manager.notifier()) {
                Ok(channel) => {
                    log::debug!("[subscription] {}: negotiating with {}", self.topic, uri);
                    manager.add(NegotiationConnection::for_owner(channel, self, uri));
                    opened += 1;
                }
                Err(e) => {
                    log::warn!("[subscription] {}: {}", self.topic, e);
                    self.state.lock().forget_pending(&uri);
                }
            }
        }
        opened
    }

    /// Snapshot of the negotiated publishers.
    pub fn links(&self) -> Vec<PublisherLink> {
        self.state.lock().links.clone()
    }

    /// Publishers still being negotiated with.
    pub fn pending(&self) -> Vec<String> {
        self.state.lock().pending.clone()
    }

    /// Publishers whose reply was unusable, skipped until they leave the
    /// publisher list.
    pub fn rejected(&self) -> Vec<String> {
        self.state.lock().rejected.clone()
    }

    pub fn publisher_count(&self) -> usize {
        self.state.lock().links.len()
    }

    /// Stop accepting negotiation results and forget every publisher.
    ///
    /// In-flight connections are retired by the manager on its next poll.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shut_down = true;
        state.pending.clear();
        state.links.clear();
        state.rejected.clear();
        log::debug!("[subscription] {}: shut down", self.topic);
    }

    fn link_from_reply(&self, uri: &str, reply: &RpcValue) -> Option<PublisherLink> {
        let transport = match NegotiatedTransport::from_reply(reply) {
            Ok(transport) => transport,
            Err(e) => {
                log::warn!("[subscription] {}: {} from {}", self.topic, e, uri);
                return None;
            }
        };
        if transport.protocol != TCPROS {
            log::warn!(
                "[subscription] {}: {} offered unsupported protocol {}",
                self.topic,
                uri,
                transport.protocol
            );
            return None;
        }
        let Some(prototype) = self.registry.create_message(&self.message_type) else {
            log::warn!(
                "[subscription] {}: cannot instantiate {} for {}",
                self.topic,
                self.message_type,
                uri
            );
            return None;
        };
        Some(PublisherLink {
            publisher_uri: uri.to_string(),
            transport,
            prototype: Arc::from(prototype),
        })
    }
}

impl NegotiationOwner for Subscription {
    fn pending_connection_done(&self, connection: &NegotiationConnection, result: RpcValue) {
        let uri = connection.remote_uri();
        let link = self.link_from_reply(uri, &result);

        let mut state = self.state.lock();
        if !state.forget_pending(uri) || state.shut_down {
            log::debug!("[subscription] {}: ignoring late reply from {}", self.topic, uri);
            return;
        }
        match link {
            Some(link) => {
                log::info!(
                    "[subscription] {}: linked to {} via {}:{}",
                    self.topic,
                    uri,
                    link.transport.host,
                    link.transport.port
                );
                state.links.push(link);
            }
            None => state.rejected.push(uri.to_string()),
        }
    }

    fn pending_connection_failed(&self, connection: &mut NegotiationConnection) -> FailureVerdict {
        let failures = connection.record_failure();
        let shut_down = self.state.lock().shut_down;

        if shut_down || failures >= self.max_failures {
            self.state.lock().forget_pending(connection.remote_uri());
            return FailureVerdict::Abandon;
        }
        log::debug!(
            "[subscription] {}: {} unhealthy ({}/{})",
            self.topic,
            connection.remote_uri(),
            failures,
            self.max_failures
        );
        FailureVerdict::Keep
    }

    fn wants_result(&self, connection: &NegotiationConnection) -> bool {
        let state = self.state.lock();
        !state.shut_down && state.is_pending(connection.remote_uri())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("message_type", &self.message_type)
            .field("pending", &state.pending)
            .field("links", &state.links.len())
            .field("rejected", &state.rejected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ReadyNotifier, SourceId};
    use crate::error::{Error, Result};
    use crate::msg::Header;
    use crate::negotiation::NegotiationChannel;
    use crate::registry::{MessageDescriptor, MessageModule};
    use std::time::Duration;

    const DEFAULT_FAILURES: u32 = crate::config::DEFAULT_MAX_FAILURES;

    /// Channel answering immediately, or never.
    struct Canned {
        id: SourceId,
        reply: Option<RpcValue>,
        alive: bool,
    }

    impl NegotiationChannel for Canned {
        fn source_id(&self) -> SourceId {
            self.id
        }

        fn is_connected(&self) -> bool {
            self.alive
        }

        fn try_fetch_result(&mut self) -> Option<RpcValue> {
            self.reply.take()
        }
    }

    struct CannedFactory {
        reply: Option<RpcValue>,
        alive: bool,
        refuse: bool,
    }

    impl ChannelFactory for CannedFactory {
        fn open(
            &self,
            publisher_uri: &str,
            _request: &TopicRequest,
            _notifier: ReadyNotifier,
        ) -> Result<Box<dyn NegotiationChannel>> {
            if self.refuse {
                return Err(Error::ChannelOpen {
                    uri: publisher_uri.to_string(),
                    reason: "refused".into(),
                });
            }
            Ok(Box::new(Canned {
                id: SourceId::next(),
                reply: self.reply.clone(),
                alive: self.alive,
            }))
        }
    }

    /// Connected channels answering once the test fills `answer`.
    struct Deferred {
        answer: Arc<Mutex<Option<RpcValue>>>,
    }

    struct DeferredChannel {
        id: SourceId,
        answer: Arc<Mutex<Option<RpcValue>>>,
    }

    impl NegotiationChannel for DeferredChannel {
        fn source_id(&self) -> SourceId {
            self.id
        }

        fn is_connected(&self) -> bool {
            self.answer.lock().is_none()
        }

        fn try_fetch_result(&mut self) -> Option<RpcValue> {
            self.answer.lock().take()
        }
    }

    impl ChannelFactory for Deferred {
        fn open(
            &self,
            _publisher_uri: &str,
            _request: &TopicRequest,
            _notifier: ReadyNotifier,
        ) -> Result<Box<dyn NegotiationChannel>> {
            Ok(Box::new(DeferredChannel {
                id: SourceId::next(),
                answer: Arc::clone(&self.answer),
            }))
        }
    }

    fn registry() -> Arc<MessageTypeRegistry> {
        let mut registry = MessageTypeRegistry::new();
        registry
            .register(&MessageModule::new("std").with(MessageDescriptor::of::<Header>()))
            .unwrap();
        Arc::new(registry)
    }

    fn reply(port: u16) -> RpcValue {
        NegotiatedTransport {
            protocol: TCPROS.into(),
            host: "robot".into(),
            port,
        }
        .to_reply("ok")
    }

    fn subscription(factory: CannedFactory, message_type: &str) -> Arc<Subscription> {
        Subscription::new(
            "/tf",
            message_type,
            registry(),
            &NodeConfig::default(),
            Arc::new(factory),
        )
    }

    #[test]
    fn immediate_reply_links_publisher() {
        let sub = subscription(
            CannedFactory {
                reply: Some(reply(4000)),
                alive: true,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();

        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 1);
        assert!(manager.is_empty());
        assert!(sub.pending().is_empty());

        let links = sub.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].transport.port, 4000);
        assert!(links[0].prototype.downcast_ref::<Header>().is_some());
    }

    #[test]
    fn known_publishers_are_not_renegotiated() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: true,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();

        assert_eq!(sub.pub_update(&["http://a:1", "http://a:1"], &mut manager), 1);
        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 0);
        assert_eq!(sub.pending(), vec!["http://a:1".to_string()]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn unknown_type_is_not_linked() {
        let sub = subscription(
            CannedFactory {
                reply: Some(reply(4000)),
                alive: true,
                refuse: false,
            },
            "geometry_msgs/Twist",
        );
        let mut manager = NegotiationManager::new();
        sub.pub_update(&["http://a:1"], &mut manager);
        assert_eq!(sub.publisher_count(), 0);
        assert!(sub.pending().is_empty());
        assert_eq!(sub.rejected(), vec!["http://a:1".to_string()]);
    }

    #[test]
    fn rejected_publisher_retried_after_leaving_list() {
        let sub = subscription(
            CannedFactory {
                reply: Some(reply(4000)),
                alive: true,
                refuse: false,
            },
            "geometry_msgs/Twist",
        );
        let mut manager = NegotiationManager::new();
        let none: [&str; 0] = [];

        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 1);
        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 0);

        assert_eq!(sub.pub_update(&none, &mut manager), 0);
        assert!(sub.rejected().is_empty());
        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 1);
    }

    #[test]
    fn publisher_removed_while_negotiating_is_not_linked() {
        let answer = Arc::new(Mutex::new(None));
        let sub = Subscription::new(
            "/tf",
            "std_msgs/Header",
            registry(),
            &NodeConfig::default(),
            Arc::new(Deferred {
                answer: Arc::clone(&answer),
            }),
        );
        let mut manager = NegotiationManager::new();
        let none: [&str; 0] = [];

        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 1);
        assert_eq!(manager.len(), 1);
        sub.pub_update(&none, &mut manager);
        assert!(sub.pending().is_empty());

        *answer.lock() = Some(reply(4000));
        manager.poll_connections();
        assert_eq!(sub.publisher_count(), 0);
        assert!(manager.is_empty());
        assert_eq!(manager.dispatch().source_count(), 0);
    }

    #[test]
    fn reply_for_unlisted_publisher_is_ignored() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: true,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let channel = Box::new(Canned {
            id: SourceId::next(),
            reply: None,
            alive: true,
        });
        let conn = NegotiationConnection::for_owner(channel, &sub, "http://stale:1");

        assert!(!sub.wants_result(&conn));
        sub.pending_connection_done(&conn, reply(4000));
        assert_eq!(sub.publisher_count(), 0);
        assert!(sub.rejected().is_empty());
    }

    #[test]
    fn refused_open_is_forgotten() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: true,
                refuse: true,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();
        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 0);
        assert!(sub.pending().is_empty());
    }

    #[test]
    fn dead_publisher_abandoned_after_max_failures() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: false,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();
        sub.pub_update(&["http://a:1"], &mut manager);

        // the registration poll does not count; each manager poll does
        for _ in 0..DEFAULT_FAILURES - 1 {
            manager.poll_connections();
            assert_eq!(manager.len(), 1);
        }
        manager.poll_connections();
        assert!(manager.is_empty());
        assert!(sub.pending().is_empty());
    }

    #[test]
    fn dropped_publishers_are_unlinked() {
        let sub = subscription(
            CannedFactory {
                reply: Some(reply(4000)),
                alive: true,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();
        sub.pub_update(&["http://a:1", "http://b:1"], &mut manager);
        assert_eq!(sub.publisher_count(), 2);

        sub.pub_update(&["http://b:1"], &mut manager);
        let links = sub.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].publisher_uri, "http://b:1");
    }

    #[test]
    fn shutdown_abandons_in_flight() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: false,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();
        sub.pub_update(&["http://a:1"], &mut manager);
        sub.shutdown();

        manager.poll_connections();
        assert!(manager.is_empty());
        assert_eq!(sub.pub_update(&["http://a:1"], &mut manager), 0);
    }

    #[test]
    fn shutdown_retires_connected_negotiation() {
        let sub = subscription(
            CannedFactory {
                reply: None,
                alive: true,
                refuse: false,
            },
            "std_msgs/Header",
        );
        let mut manager = NegotiationManager::new();
        sub.pub_update(&["http://a:1"], &mut manager);
        manager.poll_connections();
        assert_eq!(manager.len(), 1);

        sub.shutdown();
        assert!(manager.spin_until_idle(Duration::from_millis(5), Duration::from_millis(200)));
        assert_eq!(manager.dispatch().source_count(), 0);
    }
}
