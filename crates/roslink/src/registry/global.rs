// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Optional process-wide registry slot.
//!
//! Components normally receive an `Arc<MessageTypeRegistry>` explicitly.
//! Code that cannot be handed one (FFI callbacks, generated glue) reads the
//! instance installed here once at process start.

use super::MessageTypeRegistry;
use crate::error::{Error, Result};
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<MessageTypeRegistry>> = OnceLock::new();

/// Publish `registry` as the process-wide instance.
///
/// Only the first call succeeds; later calls fail with
/// [`Error::RegistryAlreadyInitialized`] and leave the installed one alone.
pub fn install(registry: MessageTypeRegistry) -> Result<Arc<MessageTypeRegistry>> {
    let shared = Arc::new(registry);
    GLOBAL_REGISTRY
        .set(Arc::clone(&shared))
        .map_err(|_| Error::RegistryAlreadyInitialized)?;
    log::info!(
        "[registry] installed process-wide registry ({} types, {} packages)",
        shared.len(),
        shared.package_names().len()
    );
    Ok(shared)
}

/// Process-wide instance; fails fast before [`install`].
pub fn global() -> Result<Arc<MessageTypeRegistry>> {
    GLOBAL_REGISTRY
        .get()
        .cloned()
        .ok_or(Error::RegistryNotInitialized)
}

pub fn is_installed() -> bool {
    GLOBAL_REGISTRY.get().is_some()
}
