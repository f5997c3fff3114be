// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Action companion messages.
//!
//! An action `pkg/X` declares three inner types (`pkg/XGoal`, `pkg/XResult`,
//! `pkg/XFeedback`). What travels on the wire is an *envelope* around each
//! of them that adds a header and goal tracking:
//!
//! | Role | Envelope name | Tracking field |
//! |------|---------------|----------------|
//! | goal | `pkg/XActionGoal` | `actionlib_msgs/GoalID goal_id` |
//! | result | `pkg/XActionResult` | `actionlib_msgs/GoalStatus status` |
//! | feedback | `pkg/XActionFeedback` | `actionlib_msgs/GoalStatus status` |
//!
//! The registry builds the envelope from the inner type's constructor, so
//! the envelope signature covers the inner layout.

use super::{package_of, short_name, Header, RosMessage, WireSignature};
use crate::time::TimeData;
use std::any::Any;

const GOAL_ID_TYPE: &str = "actionlib_msgs/GoalID";
const GOAL_STATUS_TYPE: &str = "actionlib_msgs/GoalStatus";

/// Role of an inner action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionRole {
    Goal,
    Result,
    Feedback,
}

impl ActionRole {
    /// Suffix carried by inner and envelope names.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Goal => "Goal",
            Self::Result => "Result",
            Self::Feedback => "Feedback",
        }
    }

    /// Field name of the inner message inside the envelope.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Result => "result",
            Self::Feedback => "feedback",
        }
    }

    /// Envelope name for an inner type: `pkg/FooGoal` -> `pkg/FooActionGoal`.
    pub fn envelope_type_name(self, inner_type: &str) -> String {
        let package = package_of(inner_type);
        let name = short_name(inner_type);
        let stem = name.strip_suffix(self.suffix()).unwrap_or(name);
        format!("{}/{}Action{}", package, stem, self.suffix())
    }
}

/// `actionlib_msgs/GoalID`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalID {
    pub stamp: TimeData,
    pub id: String,
}

crate::ros_message!(GoalID, GOAL_ID_TYPE, "time stamp\nstring id");

/// `actionlib_msgs/GoalStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalStatus {
    pub goal_id: GoalID,
    pub status: u8,
    pub text: String,
}

impl GoalStatus {
    pub const PENDING: u8 = 0;
    pub const ACTIVE: u8 = 1;
    pub const PREEMPTED: u8 = 2;
    pub const SUCCEEDED: u8 = 3;
    pub const ABORTED: u8 = 4;
    pub const REJECTED: u8 = 5;
    pub const PREEMPTING: u8 = 6;
    pub const RECALLING: u8 = 7;
    pub const RECALLED: u8 = 8;
    pub const LOST: u8 = 9;
}

crate::ros_message!(
    GoalStatus,
    GOAL_STATUS_TYPE,
    "GoalID goal_id\n\
     uint8 status\n\
     uint8 PENDING=0\n\
     uint8 ACTIVE=1\n\
     uint8 PREEMPTED=2\n\
     uint8 SUCCEEDED=3\n\
     uint8 ABORTED=4\n\
     uint8 REJECTED=5\n\
     uint8 PREEMPTING=6\n\
     uint8 RECALLING=7\n\
     uint8 RECALLED=8\n\
     uint8 LOST=9\n\
     string text",
    embeds { "GoalID" => GoalID }
);

/// Goal tracking carried next to the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalTracking {
    Id(GoalID),
    Status(GoalStatus),
}

/// Envelope message built around an inner action type.
#[derive(Debug)]
pub struct ActionEnvelope {
    role: ActionRole,
    type_name: String,
    definition: String,
    pub header: Header,
    pub tracking: GoalTracking,
    pub inner: Box<dyn RosMessage>,
}

impl ActionEnvelope {
    pub fn new(role: ActionRole, inner: Box<dyn RosMessage>) -> Self {
        let inner_type = inner.message_type();
        let type_name = role.envelope_type_name(inner_type);
        let (tracking_line, tracking) = match role {
            ActionRole::Goal => (
                format!("{} goal_id", GOAL_ID_TYPE),
                GoalTracking::Id(GoalID::default()),
            ),
            ActionRole::Result | ActionRole::Feedback => (
                format!("{} status", GOAL_STATUS_TYPE),
                GoalTracking::Status(GoalStatus::default()),
            ),
        };
        let definition = format!(
            "Header header\n{}\n{} {}",
            tracking_line,
            inner_type,
            role.field_name()
        );

        Self {
            role,
            type_name,
            definition,
            header: Header::default(),
            tracking,
            inner,
        }
    }

    pub fn role(&self) -> ActionRole {
        self.role
    }

    pub fn inner(&self) -> &dyn RosMessage {
        self.inner.as_ref()
    }
}

impl RosMessage for ActionEnvelope {
    fn message_type(&self) -> &str {
        &self.type_name
    }

    fn message_definition(&self) -> &str {
        &self.definition
    }

    fn md5sum(&self) -> WireSignature {
        let tracking = match self.role {
            ActionRole::Goal => (GOAL_ID_TYPE, GoalID::default().md5sum()),
            ActionRole::Result | ActionRole::Feedback => {
                (GOAL_STATUS_TYPE, GoalStatus::default().md5sum())
            }
        };
        let embedded = [
            ("Header", Header::default().md5sum()),
            tracking,
            (self.inner.message_type(), self.inner.md5sum()),
        ];
        WireSignature::compute_with(&self.definition, &embedded)
    }

    fn has_header(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FibonacciGoal {
        order: i32,
    }

    crate::ros_message!(FibonacciGoal, "demo/FibonacciGoal", "int32 order");

    #[derive(Debug, Default)]
    struct WideGoal;

    crate::ros_message!(WideGoal, "demo/FibonacciGoal", "int64 order");

    #[test]
    fn envelope_names() {
        assert_eq!(
            ActionRole::Goal.envelope_type_name("demo/FibonacciGoal"),
            "demo/FibonacciActionGoal"
        );
        assert_eq!(
            ActionRole::Result.envelope_type_name("demo/FibonacciResult"),
            "demo/FibonacciActionResult"
        );
        assert_eq!(
            ActionRole::Feedback.envelope_type_name("demo/Progress"),
            "demo/ProgressActionFeedback"
        );
    }

    #[test]
    fn goal_envelope_layout() {
        let envelope = ActionEnvelope::new(ActionRole::Goal, Box::new(FibonacciGoal { order: 5 }));
        assert_eq!(envelope.message_type(), "demo/FibonacciActionGoal");
        assert!(envelope.has_header());
        assert!(matches!(envelope.tracking, GoalTracking::Id(_)));
        assert_eq!(
            envelope.message_definition(),
            "Header header\nactionlib_msgs/GoalID goal_id\ndemo/FibonacciGoal goal"
        );
        let order = envelope.inner().downcast_ref::<FibonacciGoal>().map(|g| g.order);
        assert_eq!(order, Some(5));
    }

    #[test]
    fn envelope_signature_follows_inner_layout() {
        let narrow = ActionEnvelope::new(ActionRole::Goal, Box::new(FibonacciGoal::default()));
        let wide = ActionEnvelope::new(ActionRole::Goal, Box::new(WideGoal));
        assert_eq!(narrow.message_type(), wide.message_type());
        assert_ne!(narrow.md5sum(), wide.md5sum());

        let again = ActionEnvelope::new(ActionRole::Goal, Box::new(FibonacciGoal::default()));
        assert_eq!(narrow.md5sum(), again.md5sum());
    }

    #[test]
    fn result_and_feedback_track_status() {
        let result = ActionEnvelope::new(ActionRole::Result, Box::new(FibonacciGoal::default()));
        assert_eq!(result.role(), ActionRole::Result);
        assert!(matches!(result.tracking, GoalTracking::Status(_)));
        assert_ne!(
            result.md5sum(),
            ActionEnvelope::new(ActionRole::Feedback, Box::new(FibonacciGoal::default())).md5sum()
        );
    }

    #[test]
    fn goal_status_embeds_goal_id() {
        let status = GoalStatus::default();
        assert_eq!(status.embedded_signatures()[0].0, "GoalID");
        assert_eq!(status.status, GoalStatus::PENDING);
    }
}
