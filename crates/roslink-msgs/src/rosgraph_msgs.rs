// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `rosgraph_msgs`: simulated clock.

use roslink::registry::{MessageDescriptor, MessageModule};
use roslink::ros_message;
use roslink::TimeData;

/// `rosgraph_msgs/Clock`, published on `/clock` when `use_sim_time` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub clock: TimeData,
}

ros_message!(Clock, "rosgraph_msgs/Clock", "time clock");

pub fn module() -> MessageModule {
    MessageModule::new("rosgraph_msgs")
        .depends_on("roslink")
        .with(MessageDescriptor::of::<Clock>())
}
