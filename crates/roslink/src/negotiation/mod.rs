// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscriber-side topic negotiation.
//!
//! A subscription that learns about a publisher asks it, over an RPC call,
//! which transport to use. The call must not block the dispatcher thread,
//! so each one is wrapped in a [`NegotiationConnection`] that the
//! [`NegotiationManager`] polls until the publisher answers, the channel
//! is declared unhealthy, or the subscription goes away.

pub mod channel;
pub mod connection;
pub mod manager;
pub mod protocol;
pub mod value;

pub use channel::{AsyncCallChannel, AsyncCallFactory, ChannelFactory, NegotiationChannel};
pub use connection::{ConnectionState, FailureVerdict, NegotiationConnection, NegotiationOwner};
pub use manager::NegotiationManager;
pub use protocol::{NegotiatedTransport, TopicRequest, CODE_SUCCESS, TCPROS};
pub use value::RpcValue;
