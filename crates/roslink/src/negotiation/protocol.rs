// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `requestTopic` call shape.
//!
//! Request params: `[caller_id, topic, [[protocol, ...], ...]]`.
//! Reply: `[code, status_message, protocol_params]` where `code == 1` means
//! success and `protocol_params` is `["TCPROS", host, port]`.

use super::value::RpcValue;
use crate::error::{Error, Result};

/// Success code of a ROS slave API reply.
pub const CODE_SUCCESS: i32 = 1;

/// Transport protocol negotiated by default.
pub const TCPROS: &str = "TCPROS";

/// Parameters of one `requestTopic` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub caller_id: String,
    pub topic: String,
    pub protocols: Vec<String>,
}

impl TopicRequest {
    /// Request offering only TCPROS.
    pub fn tcpros(caller_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            topic: topic.into(),
            protocols: vec![TCPROS.to_string()],
        }
    }

    /// XML-RPC params of the call.
    pub fn to_params(&self) -> RpcValue {
        let protocols = self
            .protocols
            .iter()
            .map(|p| RpcValue::Array(vec![RpcValue::from(p.as_str())]))
            .collect();
        RpcValue::Array(vec![
            RpcValue::from(self.caller_id.as_str()),
            RpcValue::from(self.topic.as_str()),
            RpcValue::Array(protocols),
        ])
    }
}

/// Data-connection endpoint agreed with a publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedTransport {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl NegotiatedTransport {
    /// Parse a `requestTopic` reply.
    ///
    /// # Errors
    ///
    /// - [`Error::TopicRejected`] for a well-formed reply with a failure code;
    /// - [`Error::MalformedReply`] for anything else that does not match.
    pub fn from_reply(reply: &RpcValue) -> Result<Self> {
        let items = reply
            .as_array()
            .ok_or_else(|| malformed(format!("expected array, got {}", reply.type_name())))?;
        let [code, status, params] = items else {
            return Err(malformed(format!("expected 3 elements, got {}", items.len())));
        };

        let code = code
            .as_i32()
            .ok_or_else(|| malformed("status code is not an integer"))?;
        let status = status.as_str().unwrap_or_default().to_string();
        if code != CODE_SUCCESS {
            return Err(Error::TopicRejected { code, status });
        }

        let params = params
            .as_array()
            .ok_or_else(|| malformed("protocol params are not an array"))?;
        let [protocol, host, port] = params else {
            return Err(malformed(format!(
                "expected [protocol, host, port], got {} element(s)",
                params.len()
            )));
        };

        let protocol = protocol
            .as_str()
            .ok_or_else(|| malformed("protocol name is not a string"))?;
        let host = host
            .as_str()
            .ok_or_else(|| malformed("host is not a string"))?;
        let port = port
            .as_i32()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| malformed("port is not a valid u16"))?;

        Ok(Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Reply a publisher would send for this endpoint (tests, loopback).
    pub fn to_reply(&self, status: &str) -> RpcValue {
        RpcValue::Array(vec![
            RpcValue::from(CODE_SUCCESS),
            RpcValue::from(status),
            RpcValue::Array(vec![
                RpcValue::from(self.protocol.as_str()),
                RpcValue::from(self.host.as_str()),
                RpcValue::from(i32::from(self.port)),
            ]),
        ])
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedReply(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> NegotiatedTransport {
        NegotiatedTransport {
            protocol: TCPROS.to_string(),
            host: "robot.local".to_string(),
            port: 45_123,
        }
    }

    #[test]
    fn request_params_shape() {
        let params = TopicRequest::tcpros("/listener", "/chatter").to_params();
        assert_eq!(params.to_string(), r#"["/listener", "/chatter", [["TCPROS"]]]"#);
    }

    #[test]
    fn parses_success_reply() {
        let reply = transport().to_reply("ready on robot.local:45123");
        assert_eq!(NegotiatedTransport::from_reply(&reply).unwrap(), transport());
    }

    #[test]
    fn failure_code_is_a_rejection() {
        let reply = RpcValue::Array(vec![
            RpcValue::from(0),
            RpcValue::from("no suitable protocol"),
            RpcValue::Array(vec![]),
        ]);
        match NegotiatedTransport::from_reply(&reply) {
            Err(Error::TopicRejected { code, status }) => {
                assert_eq!(code, 0);
                assert_eq!(status, "no suitable protocol");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_replies() {
        let cases = [
            RpcValue::Nil,
            RpcValue::Array(vec![RpcValue::from(1)]),
            RpcValue::Array(vec![
                RpcValue::from("1"),
                RpcValue::from(""),
                RpcValue::Array(vec![]),
            ]),
            RpcValue::Array(vec![
                RpcValue::from(1),
                RpcValue::from(""),
                RpcValue::Array(vec![RpcValue::from(TCPROS)]),
            ]),
            RpcValue::Array(vec![
                RpcValue::from(1),
                RpcValue::from(""),
                RpcValue::Array(vec![
                    RpcValue::from(TCPROS),
                    RpcValue::from("host"),
                    RpcValue::from(70_000),
                ]),
            ]),
        ];
        for reply in &cases {
            assert!(
                matches!(NegotiatedTransport::from_reply(reply), Err(Error::MalformedReply(_))),
                "accepted {reply}"
            );
        }
    }
}
