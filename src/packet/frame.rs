//! Frame-level packet layout.
//!
//! This module owns the fixed 4-byte header format, the XOR checksum and the
//! [`ValidatedPacket`] handed from the reader to the field extractor. Stream
//! handling lives in [`reader`](super::reader).

#![expect(clippy::little_endian_bytes, reason = "wire format is little-endian")]

use super::{CHECKSUM_LEN, HEADER_LEN, TIMESTAMP_LEN};

/// XOR-fold `bytes`, seeded at zero.
#[must_use]
pub fn xor_checksum(bytes: &[u8]) -> u8 { bytes.iter().fold(0, |acc, b| acc ^ b) }

/// Parsed packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Packet type identifier.
    pub packet_type: u8,
    /// Received signal strength in dBm.
    pub rssi: i8,
    /// Number of Wi-Fi data bytes following the header.
    pub length: u16,
}

impl PacketHeader {
    /// Parse a header from its 4-byte wire form.
    #[must_use = "use the returned header"]
    pub const fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            packet_type: buf[0],
            rssi: i8::from_le_bytes([buf[1]]),
            length: u16::from_le_bytes([buf[2], buf[3]]),
        }
    }

    /// Serialise the header to its 4-byte wire form.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [rssi] = self.rssi.to_le_bytes();
        let [lo, hi] = self.length.to_le_bytes();
        [self.packet_type, rssi, lo, hi]
    }

    /// Bytes that follow the header on the wire: data, timestamp and checksum.
    #[must_use]
    pub const fn body_len(&self) -> usize {
        self.length as usize + TIMESTAMP_LEN + CHECKSUM_LEN
    }

    /// Size of the checksum-covered region: header, data and timestamp.
    #[must_use]
    pub const fn payload_len(&self) -> usize { HEADER_LEN + self.length as usize + TIMESTAMP_LEN }

    /// Size of the whole frame including the checksum byte.
    #[must_use]
    pub const fn frame_len(&self) -> usize { HEADER_LEN + self.body_len() }
}

/// A frame whose checksum matched, with the checksum byte stripped.
///
/// `bytes` always holds exactly [`PacketHeader::payload_len`] bytes: the
/// header, the Wi-Fi data and the timestamp. The header parsed while framing
/// travels alongside so the extractor need not parse it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPacket {
    header: PacketHeader,
    bytes: Vec<u8>,
}

impl ValidatedPacket {
    pub(super) const fn new(header: PacketHeader, bytes: Vec<u8>) -> Self { Self { header, bytes } }

    /// Header parsed while framing.
    #[must_use]
    pub const fn header(&self) -> &PacketHeader { &self.header }

    /// Checksum-covered bytes (header, data and timestamp).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Consume the packet and return its raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> { self.bytes }
}
