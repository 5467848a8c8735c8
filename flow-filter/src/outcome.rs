// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Results of flow filter evaluation

use crate::path::{VBridgePath, VInterfacePath};
use net::packet::{Packet, PacketMeta};
use net::vlan::Vid;
use std::fmt::Display;
use tracing::{debug, error, info, warn};

/// What the forwarding pipeline has to do with a packet once a flow filter list has been
/// evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No filter stopped the packet: forward it normally.
    Continue,
    /// The packet must be discarded.
    Drop,
    /// The packet must be forwarded to another virtual interface.
    Redirect(Redirect),
}

impl Outcome {
    /// Returns true for [`Outcome::Continue`].
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue)
    }

    /// Returns true for [`Outcome::Drop`].
    #[must_use]
    pub fn is_drop(&self) -> bool {
        matches!(self, Outcome::Drop)
    }

    /// The redirection, for [`Outcome::Redirect`].
    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Outcome::Redirect(r) => Some(r),
            _ => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Continue => write!(f, "continue"),
            Outcome::Drop => write!(f, "drop"),
            Outcome::Redirect(r) => write!(f, "redirect to {r}"),
        }
    }
}

/// A packet redirection requested by a REDIRECT flow filter.
///
/// The forwarding pipeline validates the destination and reports what happened through the
/// notification methods, which only log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    destination: VInterfacePath,
    output: bool,
    context: String,
}

impl Redirect {
    pub(crate) fn new(destination: VInterfacePath, output: bool, context: String) -> Self {
        Self {
            destination,
            output,
            context,
        }
    }

    /// The interface the packet is redirected to.
    #[must_use]
    pub fn destination(&self) -> &VInterfacePath {
        &self.destination
    }

    /// True if the packet is to be sent out of the destination, false if it is to be received
    /// by it.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.output
    }

    /// Identifies the flow filter that requested the redirection.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Count one more redirection hop for `packet`.
    ///
    /// Returns false once the packet exceeded [`PacketMeta::MAX_REDIRECTIONS`].
    pub fn add_hop(&self, packet: &mut Packet) -> bool {
        let hops = packet.meta_mut().add_redirection();
        if hops > PacketMeta::MAX_REDIRECTIONS {
            self.too_many_hops(packet, hops);
            return false;
        }
        true
    }

    /// The destination interface does not exist.
    pub fn destination_not_found(&self, packet: &Packet) {
        warn!(
            "{}: Packet from {} discarded: redirect destination not found: {}",
            self.context,
            packet.source_key(),
            self.destination
        );
    }

    /// The destination interface is disabled.
    pub fn destination_disabled(&self, packet: &Packet) {
        debug!(
            "{}: Packet from {} discarded: redirect destination is disabled: {}",
            self.context,
            packet.source_key(),
            self.destination
        );
    }

    /// The packet went through too many redirections.
    pub fn too_many_hops(&self, packet: &Packet, hops: u32) {
        error!(
            "{}: Packet from {} discarded: too many hops ({hops}) redirecting to {}",
            self.context,
            packet.source_key(),
            self.destination
        );
    }

    /// The destination interface is not mapped to a physical port.
    pub fn not_mapped(&self, packet: &Packet) {
        debug!(
            "{}: Packet from {} discarded: redirect destination is not mapped: {}",
            self.context,
            packet.source_key(),
            self.destination
        );
    }

    /// The packet was forwarded to physical port `port`.
    pub fn forwarded(&self, packet: &Packet, port: &str, vlan: Option<Vid>) {
        let vid = vlan.map_or(0, Vid::as_u16);
        if packet.meta().redirections() <= 1 {
            info!(
                "{}: Packet from {} redirected to {} and forwarded to port {port} vlan {vid}",
                self.context,
                packet.source_key(),
                self.destination
            );
        } else {
            debug!(
                "{}: Packet from {} redirected to {} and forwarded to port {port} vlan {vid}",
                self.context,
                packet.source_key(),
                self.destination
            );
        }
    }

    /// The packet was flooded on bridge `bridge`.
    pub fn flooded(&self, packet: &Packet, bridge: &VBridgePath) {
        debug!(
            "{}: Packet from {} redirected to {} and flooded on {bridge}",
            self.context,
            packet.source_key(),
            self.destination
        );
    }
}

impl Display for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = if self.output { "out" } else { "in" };
        write!(f, "{} ({direction})", self.destination)
    }
}
