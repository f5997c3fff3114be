// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the registry, the negotiation layer and the
//! configuration loader.
//!
//! Transient negotiation outcomes (publisher unreachable, RPC still in
//! flight, owner released) never surface here: they stay `bool`/`Option`
//! results. Only structural problems become an [`Error`].

use crate::msg::WireSignature;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors emitted by roslink.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two definitions claim the same canonical name with different shapes.
    #[error(
        "message type {type_name} is already registered with signature {existing}, \
         new definition has signature {incoming}"
    )]
    SignatureConflict {
        type_name: String,
        existing: WireSignature,
        incoming: WireSignature,
    },

    /// A message type never set its own canonical name.
    #[error("message type {0} does not initialize its canonical name")]
    UninitializedType(String),

    /// The process-wide registry was read before `registry::install`.
    #[error("message type registry not initialized")]
    RegistryNotInitialized,

    /// `registry::install` was called more than once.
    #[error("message type registry already initialized")]
    RegistryAlreadyInitialized,

    /// A topic negotiation reply did not have the expected shape.
    #[error("malformed topic negotiation reply: {0}")]
    MalformedReply(String),

    /// The publisher answered the topic request with a failure code.
    #[error("publisher rejected topic request (code {code}): {status}")]
    TopicRejected { code: i32, status: String },

    /// Channel could not be opened towards a publisher.
    #[error("channel open failed for {uri}: {reason}")]
    ChannelOpen { uri: String, reason: String },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error means the process must not keep registering types.
    pub fn is_fatal_registration(&self) -> bool {
        matches!(
            self,
            Self::SignatureConflict { .. } | Self::UninitializedType(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_signatures() {
        let err = Error::SignatureConflict {
            type_name: "pkg/Foo".to_string(),
            existing: WireSignature::compute("int32 a"),
            incoming: WireSignature::compute("int64 a"),
        };
        let text = err.to_string();
        assert!(text.contains("pkg/Foo"));
        assert!(text.contains(&WireSignature::compute("int32 a").to_string()));
        assert!(text.contains(&WireSignature::compute("int64 a").to_string()));
        assert!(err.is_fatal_registration());
    }

    #[test]
    fn transient_errors_are_not_fatal() {
        assert!(!Error::RegistryNotInitialized.is_fatal_registration());
        assert!(!Error::InvalidArgument("x".into()).is_fatal_registration());
    }
}
