//! Packet encoding for senders and test fixtures.
//!
//! [`encode_record`] lays a [`Record`] out on the wire and appends the XOR
//! checksum; [`PacketWriter`] pushes encoded frames into any
//! [`std::io::Write`] sink, flushing after each one so a serial line sees
//! whole packets.

#![expect(clippy::little_endian_bytes, reason = "wire format is little-endian")]

use std::io::{self, Write};

use super::{
    errors::EncodeError,
    frame::xor_checksum,
    record::Record,
};

/// Serialise `record` into a complete frame, checksum included.
///
/// # Errors
/// Returns [`EncodeError::LengthMismatch`] when `record.length` does not
/// equal the size of `record.wifi_data`.
pub fn encode_record(record: &Record) -> Result<Vec<u8>, EncodeError> {
    if usize::from(record.length) != record.wifi_data.len() {
        return Err(EncodeError::LengthMismatch {
            declared: record.length,
            actual: record.wifi_data.len(),
        });
    }
    let header = record.header();
    let mut frame = Vec::with_capacity(header.frame_len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(&record.wifi_data);
    frame.extend_from_slice(&record.timestamp.to_le_bytes());
    frame.push(xor_checksum(&frame));
    Ok(frame)
}

/// Writer that emits one encoded frame per call.
#[derive(Debug)]
pub struct PacketWriter<W> {
    writer: W,
}

impl<W: Write> PacketWriter<W> {
    /// Wrap `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self { Self { writer } }

    /// Encode `record`, write the frame and flush.
    ///
    /// Returns the frame that was written.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::InvalidInput`] for records that cannot be
    /// encoded and propagates write or flush failures.
    pub fn write_record(&mut self, record: &Record) -> io::Result<Vec<u8>> {
        let frame =
            encode_record(record).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        Ok(frame)
    }

    /// Consume the writer and return the sink.
    #[must_use]
    pub fn into_inner(self) -> W { self.writer }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn encodes_scenario_frame() {
        let record = Record::new(1, -5, vec![0xAA, 0xBB], 16).expect("record");
        let frame = encode_record(&record).expect("encode");
        let body = [0x01, 0xFB, 0x02, 0x00, 0xAA, 0xBB, 0x10, 0x00, 0x00, 0x00];
        assert_eq!(frame.get(..10), Some(&body[..]));
        assert_eq!(frame.last(), Some(&xor_checksum(&body)));
        assert_eq!(frame.len(), record.header().frame_len());
    }

    #[rstest]
    fn rejects_inconsistent_length() {
        let mut record = Record::new(1, 0, vec![1, 2, 3], 0).expect("record");
        record.length = 2;
        assert_eq!(
            encode_record(&record),
            Err(EncodeError::LengthMismatch {
                declared: 2,
                actual: 3,
            })
        );
    }

    #[rstest]
    fn writer_appends_frames_back_to_back() {
        let first = Record::new(1, -1, vec![0x10], 1).expect("record");
        let second = Record::new(2, -2, vec![], 2).expect("record");
        let mut writer = PacketWriter::new(Vec::new());
        let a = writer.write_record(&first).expect("write");
        let b = writer.write_record(&second).expect("write");
        let sink = writer.into_inner();
        assert_eq!(sink.len(), a.len() + b.len());
        assert_eq!(sink, [a, b].concat());
    }

    #[rstest]
    fn writer_rejects_unencodable_record() {
        let mut record = Record::new(1, 0, vec![1], 0).expect("record");
        record.length = 9;
        let mut writer = PacketWriter::new(Vec::new());
        let err = writer.write_record(&record).expect_err("invalid record");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(writer.into_inner().is_empty());
    }
}
