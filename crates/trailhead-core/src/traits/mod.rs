// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the edges of the discovery core.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod source;
pub mod store;

pub use source::ListingSource;
pub use store::ReviewStore;
