// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Standard ROS message modules for roslink.
//!
//! ```
//! let registry = roslink_msgs::load_registry(&["roslink"]).unwrap();
//! assert!(registry.create_message("std_msgs/String").is_some());
//! assert!(registry.create_message("actionlib_tutorials/FibonacciActionGoal").is_some());
//! ```

pub mod actionlib_msgs;
pub mod actionlib_tutorials;
pub mod rosgraph_msgs;
pub mod std_msgs;

use roslink::registry::{MessageTypeRegistry, ModuleCatalog};

/// Every module shipped by this crate, dependencies first.
pub fn catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .with(std_msgs::module())
        .with(rosgraph_msgs::module())
        .with(actionlib_msgs::module())
        .with(actionlib_tutorials::module())
}

/// Registry holding every [`catalog`] module that depends on one of
/// `marker_packages`.
pub fn load_registry<S: AsRef<str>>(marker_packages: &[S]) -> roslink::Result<MessageTypeRegistry> {
    let registry = MessageTypeRegistry::from_catalog(&catalog(), marker_packages)?;
    log::info!(
        "[registry] loaded {} message type(s) from {} package(s)",
        registry.len(),
        registry.package_names().len()
    );
    Ok(registry)
}
