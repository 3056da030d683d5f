// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the listing aggregate and review tables.

pub mod listings;
pub mod reviews;
