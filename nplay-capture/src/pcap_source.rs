//! libpcap backed sources.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pcap::{Active, Capture, Device, Offline};
use tracing::{debug, info};

use nplay_core::record::PacketRecord;

use crate::decode::{decode_frame, LinkType};
use crate::error::CaptureError;
use crate::packet::Frame;
use crate::source::PacketSource;

fn link_type(dlt: pcap::Linktype) -> Result<LinkType, CaptureError> {
    LinkType::from_dlt(dlt.0).ok_or(CaptureError::UnsupportedLinkType(dlt.0))
}

#[derive(Debug, Clone, Copy)]
pub struct LiveOptions {
    pub promiscuous: bool,
    pub snaplen: i32,
    /// Read timeout; also how often the stop flag is polled.
    pub timeout_ms: i32,
}

impl Default for LiveOptions {
    fn default() -> Self {
        LiveOptions {
            promiscuous: true,
            snaplen: 65535,
            timeout_ms: 1000,
        }
    }
}

/// Live capture on a named interface. Runs until `terminate` is set.
pub struct LiveSource {
    interface: String,
    cap: Capture<Active>,
    link: LinkType,
    terminate: Arc<AtomicBool>,
}

impl LiveSource {
    pub fn open(
        interface: &str,
        options: LiveOptions,
        terminate: Arc<AtomicBool>,
    ) -> Result<Self, CaptureError> {
        let open_err = |error: pcap::Error| CaptureError::Open {
            source_name: interface.to_string(),
            error,
        };

        let device = Device::list()
            .map_err(open_err)?
            .into_iter()
            .find(|d| d.name == interface)
            .ok_or_else(|| CaptureError::DeviceNotFound(interface.to_string()))?;

        let cap = Capture::from_device(device)
            .map_err(open_err)?
            .promisc(options.promiscuous)
            .snaplen(options.snaplen)
            .timeout(options.timeout_ms)
            .open()
            .map_err(open_err)?;
        let link = link_type(cap.get_datalink())?;

        info!(interface, ?link, promiscuous = options.promiscuous, "Live capture opened");
        Ok(LiveSource {
            interface: interface.to_string(),
            cap,
            link,
            terminate,
        })
    }
}

impl PacketSource for LiveSource {
    fn next_record(&mut self) -> Result<Option<PacketRecord>, CaptureError> {
        while !self.terminate.load(Ordering::Relaxed) {
            match self.cap.next_packet() {
                Ok(packet) => return Ok(Some(decode_frame(&Frame::from_pcap(&packet, self.link)))),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => return Err(CaptureError::Read(e)),
            }
        }
        debug!(interface = %self.interface, "Stop requested, ending live capture");
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("interface {}", self.interface)
    }
}

/// Replays a pcap/pcapng trace file to its end.
pub struct TraceSource {
    path: PathBuf,
    cap: Capture<Offline>,
    link: LinkType,
}

impl TraceSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        let cap = Capture::from_file(&path).map_err(|error| CaptureError::Open {
            source_name: path.display().to_string(),
            error,
        })?;
        let link = link_type(cap.get_datalink())?;
        info!(path = %path.display(), ?link, "Trace file opened");
        Ok(TraceSource { path, cap, link })
    }
}

impl PacketSource for TraceSource {
    fn next_record(&mut self) -> Result<Option<PacketRecord>, CaptureError> {
        match self.cap.next_packet() {
            Ok(packet) => Ok(Some(decode_frame(&Frame::from_pcap(&packet, self.link)))),
            Err(pcap::Error::NoMorePackets) => Ok(None),
            Err(e) => Err(CaptureError::Read(e)),
        }
    }

    fn describe(&self) -> String {
        format!("trace {}", self.path.display())
    }
}
