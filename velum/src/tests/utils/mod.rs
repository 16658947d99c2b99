// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod asserts;
mod env;
mod host;

pub(crate) use asserts::{assert_rect_within, assert_same_geometry, line_string, paint_items};
pub(crate) use env::{TestEnv, ADVANCE, LINE_HEIGHT};
pub(crate) use host::{HostEvent, RecordingHost};
