// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `actionlib_tutorials/Fibonacci` action.
//!
//! An action-role row registers only the envelope
//! (`FibonacciActionGoal`, `FibonacciActionResult`,
//! `FibonacciActionFeedback`), never the inner type. The plain
//! `FibonacciGoal`, `FibonacciResult` and `FibonacciFeedback` rows are
//! declared separately so the inner types are also usable on their own
//! topics.

use roslink::msg::ActionRole;
use roslink::registry::{MessageDescriptor, MessageModule};
use roslink::ros_message;

/// Number of Fibonacci terms requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FibonacciGoal {
    pub order: i32,
}

ros_message!(FibonacciGoal, "actionlib_tutorials/FibonacciGoal", "int32 order");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FibonacciResult {
    pub sequence: Vec<i32>,
}

ros_message!(
    FibonacciResult,
    "actionlib_tutorials/FibonacciResult",
    "int32[] sequence"
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FibonacciFeedback {
    pub sequence: Vec<i32>,
}

ros_message!(
    FibonacciFeedback,
    "actionlib_tutorials/FibonacciFeedback",
    "int32[] sequence"
);

/// Aggregate action declaration. Only its envelopes travel on the wire.
#[derive(Debug, Clone, Default)]
pub struct FibonacciAction;

ros_message!(
    FibonacciAction,
    "actionlib_tutorials/FibonacciAction",
    "FibonacciActionGoal action_goal\n\
     FibonacciActionResult action_result\n\
     FibonacciActionFeedback action_feedback"
);

pub fn module() -> MessageModule {
    MessageModule::new("actionlib_tutorials")
        .depends_on("roslink")
        .depends_on("actionlib_msgs")
        .with(MessageDescriptor::of::<FibonacciGoal>())
        .with(MessageDescriptor::of::<FibonacciResult>())
        .with(MessageDescriptor::of::<FibonacciFeedback>())
        .with(MessageDescriptor::action::<FibonacciGoal>(ActionRole::Goal))
        .with(MessageDescriptor::action::<FibonacciResult>(ActionRole::Result))
        .with(MessageDescriptor::action::<FibonacciFeedback>(ActionRole::Feedback))
        .with(MessageDescriptor::ignored::<FibonacciAction>())
}
