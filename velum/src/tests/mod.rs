// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_draw;
mod test_hit;
mod test_layout;
mod test_text;
mod test_vertical;
mod utils;
