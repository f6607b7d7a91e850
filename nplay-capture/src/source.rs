use std::collections::VecDeque;

use nplay_core::record::PacketRecord;

use crate::error::CaptureError;

/// Anything that yields packet records in capture order.
pub trait PacketSource {
    /// The next record, or `Ok(None)` once the source is exhausted or stopped.
    fn next_record(&mut self) -> Result<Option<PacketRecord>, CaptureError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Records held in memory. Used by tests and for replaying pre-built records.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: VecDeque<PacketRecord>,
}

impl MemorySource {
    pub fn new(records: impl IntoIterator<Item = PacketRecord>) -> Self {
        MemorySource {
            records: records.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl PacketSource for MemorySource {
    fn next_record(&mut self) -> Result<Option<PacketRecord>, CaptureError> {
        Ok(self.records.pop_front())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    fn next_record(&mut self) -> Result<Option<PacketRecord>, CaptureError> {
        (**self).next_record()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_preserves_order() {
        let mut source = MemorySource::new(vec![
            PacketRecord::new(1.0, 60, "TCP"),
            PacketRecord::new(2.0, 70, "UDP"),
        ]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 1.0);
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 2.0);
        assert!(source.next_record().unwrap().is_none());
    }
}
