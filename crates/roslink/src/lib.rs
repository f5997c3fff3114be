// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS 1 client plumbing: message type registry and subscriber-side topic
//! negotiation.
//!
//! # Architecture
//!
//! ```text
//!   MessageModule --register--> MessageTypeRegistry --Arc--> Subscription
//!                                                                |
//!   publisher URIs --pub_update--> NegotiationConnection <-------+
//!                                        |
//!                               NegotiationManager (dispatcher thread)
//!                                        |
//!                               Dispatch <-- ReadyNotifier <-- RPC worker
//! ```
//!
//! - [`registry`]: name -> constructor index with wire signature checks.
//! - [`negotiation`]: non-blocking `requestTopic` state machine.
//! - [`subscription`]: owner of negotiations for one topic.
//! - [`dispatch`]: single-threaded readiness loop.
//!
//! # Quick Start
//!
//! ```
//! use roslink::config::NodeConfig;
//! use roslink::msg::Header;
//! use roslink::negotiation::{AsyncCallFactory, NegotiatedTransport, NegotiationManager, TCPROS};
//! use roslink::registry::{MessageDescriptor, MessageModule, MessageTypeRegistry};
//! use roslink::subscription::Subscription;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut registry = MessageTypeRegistry::new();
//! registry
//!     .register(&MessageModule::new("std_msgs").with(MessageDescriptor::of::<Header>()))
//!     .unwrap();
//!
//! // Loopback publisher: always answers with TCPROS on robot:4711.
//! let factory = AsyncCallFactory::new(|_uri: &str, _params: &roslink::negotiation::RpcValue| {
//!     Ok(NegotiatedTransport { protocol: TCPROS.into(), host: "robot".into(), port: 4711 }
//!         .to_reply("ready"))
//! });
//!
//! let config = NodeConfig::default();
//! let sub = Subscription::new("/tf", "std_msgs/Header", Arc::new(registry), &config, Arc::new(factory));
//! let mut manager = NegotiationManager::new();
//! sub.pub_update(&["http://robot:40001/"], &mut manager);
//!
//! assert!(manager.spin_until_idle(Duration::from_millis(10), Duration::from_secs(5)));
//! assert_eq!(sub.publisher_count(), 1);
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod msg;
pub mod negotiation;
pub mod registry;
pub mod subscription;
pub mod time;

pub use config::NodeConfig;
pub use error::{Error, Result};
pub use msg::{RosMessage, WireSignature};
pub use negotiation::{NegotiationConnection, NegotiationManager, NegotiationOwner};
pub use registry::{MessageDescriptor, MessageModule, MessageTypeRegistry, ModuleCatalog};
pub use subscription::Subscription;
pub use time::TimeData;
