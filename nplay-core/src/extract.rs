//! Field extraction from decoded packet records.

use tracing::trace;

use crate::classify::DirectionClassifier;
use crate::error::ExtractionError;
use crate::event::{CanonicalEvent, Direction};
use crate::record::{PacketRecord, Ports};

/// Maps packet records onto canonical events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldExtractor {
    classifier: DirectionClassifier,
}

impl FieldExtractor {
    pub fn new(classifier: DirectionClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    /// Extracts the canonical field set of `record`.
    ///
    /// Records without a network layer are rejected; every other absent
    /// field falls back to an empty string or zero.
    pub fn extract(&self, record: &PacketRecord) -> Result<CanonicalEvent, ExtractionError> {
        let net = record
            .network
            .ok_or_else(|| ExtractionError::MissingNetworkLayer {
                summary: record.to_string(),
            })?;

        let direction = self.classifier.classify(net.src, net.dst);
        let ports = resolve_ports(record);
        let host = match direction {
            Direction::Outgoing => net.dst,
            Direction::Incoming => net.src,
            Direction::Unknown => net.src,
        };
        trace!(%direction, src = %net.src, dst = %net.dst, "Classified packet");

        Ok(CanonicalEvent {
            direction,
            length: record.length,
            transport: record.transport.clone().unwrap_or_default(),
            src: net.src,
            dst: net.dst,
            host,
            highest_layer: record.highest_layer.clone(),
            timestamp: record.timestamp,
            src_port: ports.src,
            dst_port: ports.dst,
            tcp_flags: record.tcp_flags,
            query: record.query.clone(),
        })
    }
}

/// UDP ports first, then TCP ports; the later one present wins.
fn resolve_ports(record: &PacketRecord) -> Ports {
    let mut ports = Ports::default();
    if let Some(udp) = record.udp {
        ports = udp;
    }
    if let Some(tcp) = record.tcp {
        ports = tcp;
    }
    ports
}
