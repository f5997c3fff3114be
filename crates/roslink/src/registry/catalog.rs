// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Set of message modules known to the process and candidate discovery.

use super::descriptor::MessageModule;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Loadable message modules, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: Vec<MessageModule>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: MessageModule) {
        self.modules.push(module);
    }

    #[must_use]
    pub fn with(mut self, module: MessageModule) -> Self {
        self.add(module);
        self
    }

    pub fn modules(&self) -> &[MessageModule] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every module whose dependency set intersects `marker_packages`.
    ///
    /// Names compare ASCII case-insensitively. Fails with
    /// [`Error::InvalidArgument`] when no marker is given.
    pub fn discover_candidate_modules<S: AsRef<str>>(
        &self,
        marker_packages: &[S],
    ) -> Result<Vec<&MessageModule>> {
        if marker_packages.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one marker package must be specified".to_string(),
            ));
        }

        let markers: HashSet<String> = marker_packages
            .iter()
            .map(|m| m.as_ref().to_ascii_lowercase())
            .collect();

        let found: Vec<&MessageModule> = self
            .modules
            .iter()
            .filter(|module| module.depends_on_any(&markers))
            .collect();

        log::debug!(
            "[registry] discovered {} candidate module(s) out of {} for markers {:?}",
            found.len(),
            self.modules.len(),
            markers
        );
        Ok(found)
    }
}

impl FromIterator<MessageModule> for ModuleCatalog {
    fn from_iter<I: IntoIterator<Item = MessageModule>>(iter: I) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}
