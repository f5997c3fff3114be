// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message type registry.
//!
//! Maps canonical type names to constructors and enforces that a name
//! always denotes one wire shape: a second registration under a known name
//! must carry a bit-identical [`WireSignature`], otherwise it is rejected.
//!
//! # Lifecycle
//!
//! 1. Startup: build a [`ModuleCatalog`], discover candidate modules and
//!    [`register`](MessageTypeRegistry::register) them serially (`&mut`).
//! 2. Runtime: wrap the registry in an `Arc` and hand it to every
//!    component that resolves types. Lookups are read-only and need no
//!    synchronization. [`install`] optionally publishes it process-wide.
//!
//! # Example
//!
//! ```
//! use roslink::registry::{MessageDescriptor, MessageModule, MessageTypeRegistry};
//! use roslink::ros_message;
//!
//! #[derive(Debug, Default)]
//! struct Ping;
//! ros_message!(Ping, "demo/Ping", "uint8 id");
//!
//! let module = MessageModule::new("demo").with(MessageDescriptor::of::<Ping>());
//! let mut registry = MessageTypeRegistry::new();
//! registry.register(&module).unwrap();
//!
//! assert!(registry.create_message("demo/Ping").is_some());
//! assert!(registry.create_message("demo/Pong").is_none());
//! ```

mod catalog;
mod descriptor;
mod global;

pub use catalog::ModuleCatalog;
pub use descriptor::{MessageConstructor, MessageDescriptor, MessageModule, MessageRole};
pub use global::{global, install, is_installed};

use crate::error::{Error, Result};
use crate::msg::{package_of, ActionEnvelope, RosMessage, WireSignature, UNINITIALIZED_TYPE_NAME};
use std::collections::HashMap;

/// Outcome of registering one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    /// Names inserted by this call.
    pub added: usize,
    /// Names already present with an identical signature.
    pub duplicates: usize,
    /// Descriptors tagged ignored or internal.
    pub skipped: usize,
}

impl RegisterSummary {
    fn merge(&mut self, other: RegisterSummary) {
        self.added += other.added;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    descriptor: MessageDescriptor,
    signature: WireSignature,
    module: String,
}

/// Name -> type index with one-name-one-shape enforcement.
#[derive(Debug, Default)]
pub struct MessageTypeRegistry {
    types: HashMap<String, TypeEntry>,
    names: Vec<String>,
    package_names: Vec<String>,
}

impl MessageTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover every catalog module depending on `marker_packages` and
    /// register them in catalog order.
    pub fn from_catalog<S: AsRef<str>>(
        catalog: &ModuleCatalog,
        marker_packages: &[S],
    ) -> Result<Self> {
        let mut registry = Self::new();
        let modules = catalog.discover_candidate_modules(marker_packages)?;
        registry.register_all(modules)?;
        Ok(registry)
    }

    /// See [`ModuleCatalog::discover_candidate_modules`].
    pub fn discover_candidate_modules<'a, S: AsRef<str>>(
        catalog: &'a ModuleCatalog,
        marker_packages: &[S],
    ) -> Result<Vec<&'a MessageModule>> {
        catalog.discover_candidate_modules(marker_packages)
    }

    /// Register every message type declared by `module`.
    ///
    /// The module is validated in full before anything is committed: on
    /// error the registry is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::UninitializedType`] if a declared type reports the
    ///   placeholder name;
    /// - [`Error::SignatureConflict`] if a name is already known (or
    ///   declared twice in the module) with a different signature.
    pub fn register(&mut self, module: &MessageModule) -> Result<RegisterSummary> {
        let mut summary = RegisterSummary::default();
        let mut staged: Vec<(String, TypeEntry)> = Vec::new();

        for descriptor in module.descriptors() {
            let role = descriptor.role();
            if matches!(role, MessageRole::Ignored | MessageRole::Internal) {
                log::trace!(
                    "[registry] skip {} ({:?}) from module {}",
                    descriptor.ident(),
                    role,
                    module.name()
                );
                summary.skipped += 1;
                continue;
            }

            let raw = descriptor.construct_raw();
            if raw.message_type() == UNINITIALIZED_TYPE_NAME {
                log::error!(
                    "[registry] {} in module {} does not initialize its message type",
                    descriptor.ident(),
                    module.name()
                );
                return Err(Error::UninitializedType(descriptor.ident().to_string()));
            }

            let message: Box<dyn RosMessage> = match role {
                MessageRole::Action(action_role) => Box::new(ActionEnvelope::new(action_role, raw)),
                _ => raw,
            };
            let type_name = message.message_type().to_string();
            let signature = message.md5sum();

            log::debug!("[registry] register {} ({})", type_name, signature);

            let existing = self.types.get(&type_name).map(|e| e.signature).or_else(|| {
                staged
                    .iter()
                    .find(|(name, _)| *name == type_name)
                    .map(|(_, e)| e.signature)
            });

            match existing {
                Some(existing) if existing == signature => {
                    log::warn!(
                        "[registry] message type {} is already registered; signatures match, \
                         ignoring the new declaration from module {}",
                        type_name,
                        module.name()
                    );
                    summary.duplicates += 1;
                }
                Some(existing) => {
                    log::error!(
                        "[registry] message type {} is already registered with signature {}, \
                         module {} declares {}",
                        type_name,
                        existing,
                        module.name(),
                        signature
                    );
                    return Err(Error::SignatureConflict {
                        type_name,
                        existing,
                        incoming: signature,
                    });
                }
                None => staged.push((
                    type_name,
                    TypeEntry {
                        descriptor: descriptor.clone(),
                        signature,
                        module: module.name().to_string(),
                    },
                )),
            }
        }

        for (type_name, entry) in staged {
            let package = package_of(&type_name);
            if !self.package_names.iter().any(|p| p == package) {
                self.package_names.push(package.to_string());
            }
            self.names.push(type_name.clone());
            self.types.insert(type_name, entry);
            summary.added += 1;
        }

        log::debug!(
            "[registry] module {}: {} added, {} duplicate(s), {} skipped",
            module.name(),
            summary.added,
            summary.duplicates,
            summary.skipped
        );
        Ok(summary)
    }

    /// Register modules in order, stopping at the first failure.
    ///
    /// Modules registered before the failing one stay registered.
    pub fn register_all<'a, I>(&mut self, modules: I) -> Result<RegisterSummary>
    where
        I: IntoIterator<Item = &'a MessageModule>,
    {
        let mut total = RegisterSummary::default();
        for module in modules {
            total.merge(self.register(module)?);
        }
        Ok(total)
    }

    /// Fresh default-initialized instance, `None` for unknown names.
    pub fn create_message(&self, type_name: &str) -> Option<Box<dyn RosMessage>> {
        self.types
            .get(type_name)
            .and_then(|entry| entry.descriptor.instantiate())
    }

    /// Registered names in insertion order.
    ///
    /// Each call starts a new pass; the iterator is `Clone`.
    pub fn type_names(&self) -> TypeNames<'_> {
        TypeNames {
            inner: self.names.iter(),
        }
    }

    /// Package prefixes in first-seen order.
    pub fn package_names(&self) -> &[String] {
        &self.package_names
    }

    pub fn signature_of(&self, type_name: &str) -> Option<WireSignature> {
        self.types.get(type_name).map(|entry| entry.signature)
    }

    /// Module that first declared `type_name`.
    pub fn module_of(&self, type_name: &str) -> Option<&str> {
        self.types.get(type_name).map(|entry| entry.module.as_str())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Iterator over registered names, see [`MessageTypeRegistry::type_names`].
#[derive(Debug, Clone)]
pub struct TypeNames<'a> {
    inner: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for TypeNames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TypeNames<'_> {}
