// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML-RPC value model carried by negotiation requests and replies.

use std::collections::BTreeMap;
use std::fmt;

/// One XML-RPC value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RpcValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    Array(Vec<RpcValue>),
    Struct(BTreeMap<String, RpcValue>),
}

impl RpcValue {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RpcValue]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn member(&self, key: &str) -> Option<&RpcValue> {
        match self {
            Self::Struct(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// XML-RPC type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "i4",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Struct(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for RpcValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for RpcValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for RpcValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for RpcValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<RpcValue>> From<Vec<T>> for RpcValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(RpcValue::from(7).as_i32(), Some(7));
        assert_eq!(RpcValue::from("x").as_str(), Some("x"));
        assert_eq!(RpcValue::from(true).as_bool(), Some(true));
        assert_eq!(RpcValue::from(1.5).as_i32(), None);
        assert!(RpcValue::default().is_nil());
    }

    #[test]
    fn nested_display() {
        let value = RpcValue::Array(vec![
            RpcValue::from(1),
            RpcValue::from("ok"),
            RpcValue::from(vec!["TCPROS"]),
        ]);
        assert_eq!(value.to_string(), r#"[1, "ok", ["TCPROS"]]"#);
        assert_eq!(value.type_name(), "array");
    }

    #[test]
    fn struct_member_lookup() {
        let mut map = BTreeMap::new();
        map.insert("port".to_string(), RpcValue::from(11311));
        let value = RpcValue::Struct(map);
        assert_eq!(value.member("port").and_then(RpcValue::as_i32), Some(11311));
        assert!(value.member("host").is_none());
    }
}
