// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow conditions and their registry

#![deny(clippy::all, clippy::pedantic, clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod cond;
mod table;

pub use cond::{FlowCond, UpdateType};
pub use table::{FlowCondLookup, FlowCondTable};
