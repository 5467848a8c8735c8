// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow filters
//!
//! A [`FlowFilterMap`] is the ordered list of flow filters attached to a virtual node (a
//! tenant, bridge, terminal, or one of their interfaces) for one direction. Evaluating it
//! against a packet yields an [`Outcome`]:
//!
//! - PASS filters apply their flow actions and let the packet continue down the list.
//! - DROP filters stop evaluation and discard the packet.
//! - REDIRECT filters apply their flow actions, stop evaluation and hand the packet over to
//!   another interface of the same tenant.
//!
//! The lists of all the nodes are kept in a [`FlowFilterTable`], published to packet
//! processing threads through a [`FlowFilterTableWriter`].

#![deny(clippy::all, clippy::pedantic, clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod action;
mod filter;
mod filter_rw;
mod map;
mod outcome;
mod path;
mod setup;
mod tables;

pub use action::FlowAction;
pub use filter::{FilterKind, FlowFilter, RedirectFilter};
pub use filter_rw::{FlowFilterTableReader, FlowFilterTableReaderFactory, FlowFilterTableWriter};
pub use map::{Direction, FlowFilterMap};
pub use outcome::{Outcome, Redirect};
pub use path::{
    RedirectDestination, RedirectNode, VBridgePath, VInterfaceParent, VInterfacePath, VNodePath,
    VTenantPath, VTerminalPath,
};
pub use tables::FlowFilterTable;
