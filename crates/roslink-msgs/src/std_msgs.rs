// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `std_msgs` primitives.

use roslink::registry::{MessageDescriptor, MessageModule};
use roslink::ros_message;
use roslink::TimeData;

pub use roslink::msg::Header;

/// `std_msgs/String`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct String {
    pub data: std::string::String,
}

ros_message!(String, "std_msgs/String", "string data");

/// `std_msgs/Bool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bool {
    pub data: bool,
}

ros_message!(Bool, "std_msgs/Bool", "bool data");

/// `std_msgs/Int32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int32 {
    pub data: i32,
}

ros_message!(Int32, "std_msgs/Int32", "int32 data");

/// `std_msgs/Float64`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float64 {
    pub data: f64,
}

ros_message!(Float64, "std_msgs/Float64", "float64 data");

/// `std_msgs/Time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub data: TimeData,
}

ros_message!(Time, "std_msgs/Time", "time data");

/// `std_msgs/Duration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    pub data: TimeData,
}

ros_message!(Duration, "std_msgs/Duration", "duration data");

/// `std_msgs/Empty`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

ros_message!(Empty, "std_msgs/Empty", "");

pub fn module() -> MessageModule {
    MessageModule::new("std_msgs")
        .depends_on("roslink")
        .with(MessageDescriptor::of::<Header>())
        .with(MessageDescriptor::of::<String>())
        .with(MessageDescriptor::of::<Bool>())
        .with(MessageDescriptor::of::<Int32>())
        .with(MessageDescriptor::of::<Float64>())
        .with(MessageDescriptor::of::<Time>())
        .with(MessageDescriptor::of::<Duration>())
        .with(MessageDescriptor::of::<Empty>())
}
