//! Trigger tags for `/type/*` messages.
//!
//! An event yields its transport triggers (TCP flags in FIN, RST, ACK, SYN
//! order, or `tcp_nsa` when none is set) followed by one direction trigger.

use crate::event::{CanonicalEvent, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Unknown,
    Incoming,
    Outgoing,
    Udp,
    /// TCP segment with none of SYN, ACK, FIN, RST set.
    TcpNsa,
    TcpSyn,
    TcpAck,
    TcpFin,
    TcpRst,
    Icmp,
}

impl Trigger {
    pub fn address(self) -> &'static str {
        match self {
            Trigger::Unknown => "/type/unknown",
            Trigger::Incoming => "/type/incoming",
            Trigger::Outgoing => "/type/outgoing",
            Trigger::Udp => "/type/udp",
            Trigger::TcpNsa => "/type/tcp_nsa",
            Trigger::TcpSyn => "/type/tcp_syn",
            Trigger::TcpAck => "/type/tcp_ack",
            Trigger::TcpFin => "/type/tcp_fin",
            Trigger::TcpRst => "/type/tcp_rst",
            Trigger::Icmp => "/type/icmp",
        }
    }
}

impl From<Direction> for Trigger {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Incoming => Trigger::Incoming,
            Direction::Outgoing => Trigger::Outgoing,
            Direction::Unknown => Trigger::Unknown,
        }
    }
}

pub fn triggers_for(event: &CanonicalEvent) -> Vec<Trigger> {
    let mut triggers = Vec::with_capacity(3);
    let transport = event.transport.to_ascii_uppercase();
    match transport.as_str() {
        "UDP" => triggers.push(Trigger::Udp),
        "ICMP" | "ICMPV6" => triggers.push(Trigger::Icmp),
        "TCP" => {
            let flags = event.tcp_flags.unwrap_or_default();
            if flags.fin {
                triggers.push(Trigger::TcpFin);
            }
            if flags.rst {
                triggers.push(Trigger::TcpRst);
            }
            if flags.ack {
                triggers.push(Trigger::TcpAck);
            }
            if flags.syn {
                triggers.push(Trigger::TcpSyn);
            }
            if flags.none_set() {
                triggers.push(Trigger::TcpNsa);
            }
        }
        _ => {}
    }
    triggers.push(event.direction.into());
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TcpFlags;

    fn event(transport: &str, flags: Option<TcpFlags>, direction: Direction) -> CanonicalEvent {
        let addr = "10.0.0.1".parse().unwrap();
        CanonicalEvent {
            direction,
            length: 60,
            transport: transport.into(),
            src: addr,
            dst: addr,
            host: addr,
            highest_layer: transport.into(),
            timestamp: 0.0,
            src_port: 0,
            dst_port: 0,
            tcp_flags: flags,
            query: None,
        }
    }

    #[test]
    fn syn_ack_order() {
        let flags = TcpFlags {
            syn: true,
            ack: true,
            ..Default::default()
        };
        let out = triggers_for(&event("TCP", Some(flags), Direction::Outgoing));
        assert_eq!(
            out,
            vec![Trigger::TcpAck, Trigger::TcpSyn, Trigger::Outgoing]
        );
    }

    #[test]
    fn bare_tcp_segment() {
        let out = triggers_for(&event("TCP", None, Direction::Incoming));
        assert_eq!(out, vec![Trigger::TcpNsa, Trigger::Incoming]);
    }

    #[test]
    fn udp_icmp_and_other() {
        assert_eq!(
            triggers_for(&event("UDP", None, Direction::Unknown)),
            vec![Trigger::Udp, Trigger::Unknown]
        );
        assert_eq!(
            triggers_for(&event("ICMPV6", None, Direction::Unknown))[0],
            Trigger::Icmp
        );
        assert_eq!(
            triggers_for(&event("", None, Direction::Unknown)),
            vec![Trigger::Unknown]
        );
    }

    #[test]
    fn addresses_are_under_type() {
        assert!(Trigger::TcpRst.address().starts_with("/type/"));
        assert_eq!(Trigger::from(Direction::Outgoing).address(), "/type/outgoing");
    }
}
