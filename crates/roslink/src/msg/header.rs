// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::time::TimeData;

/// `std_msgs/Header`: sequence number, timestamp and coordinate frame.
///
/// Lives in the core crate because action envelopes embed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub seq: u32,
    pub stamp: TimeData,
    pub frame_id: String,
}

impl Header {
    /// Header stamped with the current wall-clock time.
    pub fn now(frame_id: impl Into<String>) -> Self {
        Self {
            seq: 0,
            stamp: TimeData::now(),
            frame_id: frame_id.into(),
        }
    }
}

crate::ros_message!(
    Header,
    "std_msgs/Header",
    "uint32 seq\ntime stamp\nstring frame_id"
);
