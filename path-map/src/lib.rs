// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Path maps
//!
//! A path map selects a path policy for the packets matching a flow condition. Path maps are
//! kept in ordered lists, one global and one per tenant: the first path map whose condition
//! matches wins, and the lists of a tenant take precedence over the global one.

#![deny(clippy::all, clippy::pedantic, clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod pathmap;
mod table;

pub use pathmap::PathMap;
pub use table::{PathMapTable, PathMapTables};
