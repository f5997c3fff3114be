// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `actionlib_msgs`: goal tracking shared by every action.

use roslink::registry::{MessageDescriptor, MessageModule};
use roslink::ros_message;

pub use roslink::msg::{GoalID, GoalStatus, Header};

/// `actionlib_msgs/GoalStatusArray`, the periodic status broadcast of an
/// action server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalStatusArray {
    pub header: Header,
    pub status_list: Vec<GoalStatus>,
}

ros_message!(
    GoalStatusArray,
    "actionlib_msgs/GoalStatusArray",
    "Header header\nGoalStatus[] status_list",
    embeds { "Header" => Header, "GoalStatus" => GoalStatus }
);

pub fn module() -> MessageModule {
    MessageModule::new("actionlib_msgs")
        .depends_on("roslink")
        .depends_on("std_msgs")
        .with(MessageDescriptor::of::<GoalID>())
        .with(MessageDescriptor::of::<GoalStatus>())
        .with(MessageDescriptor::of::<GoalStatusArray>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roslink::RosMessage;

    #[test]
    fn status_array_has_header() {
        let msg = GoalStatusArray::default();
        assert!(msg.has_header());
        assert_ne!(msg.md5sum(), GoalStatus::default().md5sum());
    }
}
