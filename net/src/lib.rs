// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Network value types and the parsed packet model consumed by flow classification.

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::should_panic_without_expect)]
#![allow(clippy::must_use_candidate)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod eth;
pub mod flow;
pub mod headers;
pub mod icmp4;
pub mod ip;
pub mod ipv4;
pub mod packet;
pub mod tcp;
pub mod udp;
pub mod vlan;
