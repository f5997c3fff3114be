// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire signature of a message definition.
//!
//! The signature is the MD5 digest of the definition's *signature text*:
//!
//! 1. comments (`# ...`) and blank lines are removed, lines are trimmed;
//! 2. a field whose base type is an embedded message is rewritten to
//!    `<embedded signature hex> <field name>` (array suffixes dropped);
//! 3. the remaining lines are joined with `\n`.
//!
//! Two definitions sharing a canonical name are wire compatible only if
//! their signatures are bit-identical. The digest is never interpreted
//! beyond equality.
//!
//! # Example
//!
//! ```
//! use roslink::msg::WireSignature;
//!
//! let sig = WireSignature::compute("string data");
//! assert_eq!(sig.to_string(), "992ce8a1687cec8c8bd883ec73ca41d1");
//! ```

use md5::{Digest, Md5};
use std::fmt;

/// Signature length in bytes (full MD5).
pub const WIRE_SIGNATURE_LEN: usize = 16;

/// 16-byte MD5 content hash over a message definition.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireSignature([u8; WIRE_SIGNATURE_LEN]);

impl WireSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; WIRE_SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; WIRE_SIGNATURE_LEN] {
        &self.0
    }

    /// Signature of a definition without embedded message fields.
    pub fn compute(definition: &str) -> Self {
        Self::compute_with(definition, &[])
    }

    /// Signature of a definition whose fields reference embedded messages.
    ///
    /// `embedded` maps a field type as written in the definition (e.g.
    /// `Header`, `actionlib_msgs/GoalID`) to that type's signature.
    pub fn compute_with(definition: &str, embedded: &[(&str, WireSignature)]) -> Self {
        let text = signature_text(definition, embedded);
        let mut hasher = Md5::new();
        hasher.update(text.as_bytes());
        let result = hasher.finalize();

        let mut bytes = [0u8; WIRE_SIGNATURE_LEN];
        bytes.copy_from_slice(&result[..WIRE_SIGNATURE_LEN]);
        Self(bytes)
    }

    /// Parse the 32-digit hex form.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != WIRE_SIGNATURE_LEN * 2 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; WIRE_SIGNATURE_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

/// Normalized text the digest is computed over.
pub fn signature_text(definition: &str, embedded: &[(&str, WireSignature)]) -> String {
    let mut lines = Vec::new();

    for raw in definition.lines() {
        let line = match raw.find('#') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(field_type), Some(rest)) = (parts.next(), parts.next()) else {
            lines.push(line.to_string());
            continue;
        };

        // Constants (`int32 X=1`) are kept verbatim.
        if line.contains('=') {
            lines.push(line.to_string());
            continue;
        }

        let base_type = field_type.split('[').next().unwrap_or(field_type);
        match embedded.iter().find(|(name, _)| *name == base_type) {
            Some((_, sig)) => lines.push(format!("{} {}", sig, rest)),
            None => lines.push(format!("{} {}", field_type, rest)),
        }
    }

    lines.join("\n")
}

impl fmt::Debug for WireSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WireSignature({})", self)
    }
}

impl fmt::Display for WireSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<[u8; WIRE_SIGNATURE_LEN]> for WireSignature {
    fn from(bytes: [u8; WIRE_SIGNATURE_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for WireSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
