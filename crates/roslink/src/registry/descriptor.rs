// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor tables: the explicit list of message types a module declares.

use crate::msg::{ActionRole, RosMessage};
use std::collections::HashSet;

/// Builds a default-initialized instance of one message type.
pub type MessageConstructor = fn() -> Box<dyn RosMessage>;

fn construct_default<T: RosMessage + Default>() -> Box<dyn RosMessage> {
    Box::new(T::default())
}

/// How the registry treats a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    /// Registered under its own canonical name.
    Plain,
    /// Inner action type; the matching envelope is registered instead.
    Action(ActionRole),
    /// Declared but explicitly excluded from registration.
    Ignored,
    /// Framework-internal base or wrapper type, never registered.
    Internal,
}

/// One row of a module's descriptor table.
#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    ident: &'static str,
    role: MessageRole,
    construct: MessageConstructor,
}

impl MessageDescriptor {
    /// Plain message type.
    pub fn of<T: RosMessage + Default>() -> Self {
        Self {
            ident: std::any::type_name::<T>(),
            role: MessageRole::Plain,
            construct: construct_default::<T>,
        }
    }

    /// Inner action type registered through its envelope.
    pub fn action<T: RosMessage + Default>(role: ActionRole) -> Self {
        Self::of::<T>().with_role(MessageRole::Action(role))
    }

    /// Type tagged to be skipped by the registry.
    pub fn ignored<T: RosMessage + Default>() -> Self {
        Self::of::<T>().with_role(MessageRole::Ignored)
    }

    /// Framework-internal type, skipped by the registry.
    pub fn internal<T: RosMessage + Default>() -> Self {
        Self::of::<T>().with_role(MessageRole::Internal)
    }

    /// Descriptor from a raw constructor (generated code, tests).
    pub fn from_constructor(
        ident: &'static str,
        role: MessageRole,
        construct: MessageConstructor,
    ) -> Self {
        Self {
            ident,
            role,
            construct,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.role = role;
        self
    }

    /// Rust path of the declared type, used in diagnostics.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Instance of the declared type itself (never wrapped).
    pub fn construct_raw(&self) -> Box<dyn RosMessage> {
        (self.construct)()
    }

    /// Instance as registered: the envelope for action roles, the type
    /// itself for plain ones, nothing for skipped roles.
    pub fn instantiate(&self) -> Option<Box<dyn RosMessage>> {
        match self.role {
            MessageRole::Plain => Some(self.construct_raw()),
            MessageRole::Action(role) => Some(Box::new(crate::msg::ActionEnvelope::new(
                role,
                self.construct_raw(),
            ))),
            MessageRole::Ignored | MessageRole::Internal => None,
        }
    }
}

/// A loadable unit of message types together with the packages it
/// declares a dependency on.
#[derive(Debug, Clone)]
pub struct MessageModule {
    name: String,
    dependencies: Vec<String>,
    descriptors: Vec<MessageDescriptor>,
}

impl MessageModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    #[must_use]
    pub fn with(mut self, descriptor: MessageDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn descriptors(&self) -> &[MessageDescriptor] {
        &self.descriptors
    }

    /// Whether any declared dependency is in `markers` (lowercased names).
    pub(crate) fn depends_on_any(&self, markers: &HashSet<String>) -> bool {
        self.dependencies
            .iter()
            .any(|dep| markers.contains(&dep.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Ping;

    crate::ros_message!(Ping, "demo/PingGoal", "uint8 id");

    #[test]
    fn roles_select_the_registered_shape() {
        let plain = MessageDescriptor::of::<Ping>();
        assert_eq!(plain.role(), MessageRole::Plain);
        assert_eq!(
            plain.instantiate().map(|m| m.message_type().to_string()),
            Some("demo/PingGoal".to_string())
        );

        let goal = MessageDescriptor::action::<Ping>(ActionRole::Goal);
        assert_eq!(
            goal.instantiate().map(|m| m.message_type().to_string()),
            Some("demo/PingActionGoal".to_string())
        );
        assert_eq!(goal.construct_raw().message_type(), "demo/PingGoal");

        assert!(MessageDescriptor::ignored::<Ping>().instantiate().is_none());
        assert!(MessageDescriptor::internal::<Ping>().instantiate().is_none());
    }

    #[test]
    fn ident_names_the_rust_type() {
        assert!(MessageDescriptor::of::<Ping>().ident().ends_with("Ping"));
    }

    #[test]
    fn dependency_match_is_case_insensitive() {
        let module = MessageModule::new("demo_msgs").depends_on("RosLink");
        let markers: HashSet<String> = ["roslink".to_string()].into_iter().collect();
        assert!(module.depends_on_any(&markers));

        let other: HashSet<String> = ["other".to_string()].into_iter().collect();
        assert!(!module.depends_on_any(&other));
    }
}
