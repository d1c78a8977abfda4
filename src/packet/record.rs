//! Field extraction from validated packets.

#![expect(clippy::little_endian_bytes, reason = "wire format is little-endian")]

use serde::{Serialize, Serializer};

use super::{
    HEADER_LEN,
    TIMESTAMP_LEN,
    errors::{DecodeError, EncodeError},
    frame::{PacketHeader, ValidatedPacket},
};

/// Fully decoded telemetry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Packet type identifier.
    #[serde(rename = "type")]
    pub packet_type: u8,
    /// Received signal strength in dBm.
    pub rssi: i8,
    /// Number of bytes in `wifi_data`.
    pub length: u16,
    /// Opaque Wi-Fi payload.
    #[serde(serialize_with = "serialize_hex")]
    pub wifi_data: Vec<u8>,
    /// Sender timestamp, seconds since the Unix epoch.
    pub timestamp: u32,
}

fn serialize_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

impl Record {
    /// Build a record, deriving `length` from `wifi_data`.
    ///
    /// # Errors
    /// Returns [`EncodeError::PayloadTooLarge`] when the payload does not fit
    /// the 16-bit length field.
    pub fn new(
        packet_type: u8,
        rssi: i8,
        wifi_data: Vec<u8>,
        timestamp: u32,
    ) -> Result<Self, EncodeError> {
        let length = u16::try_from(wifi_data.len())
            .map_err(|_| EncodeError::PayloadTooLarge(wifi_data.len()))?;
        Ok(Self {
            packet_type,
            rssi,
            length,
            wifi_data,
            timestamp,
        })
    }

    /// Header describing this record on the wire.
    #[must_use]
    pub const fn header(&self) -> PacketHeader {
        PacketHeader {
            packet_type: self.packet_type,
            rssi: self.rssi,
            length: self.length,
        }
    }
}

/// Decode a record from checksum-validated bytes.
///
/// `bytes` must hold the header, `length` bytes of Wi-Fi data and the
/// timestamp, with the checksum already stripped. The header is parsed from
/// the bytes themselves, so any source of such bytes will do.
///
/// # Errors
/// Returns [`DecodeError::ShortBuffer`] if the buffer ends early and
/// [`DecodeError::SizeMismatch`] if it carries trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<Record, DecodeError> {
    let header_bytes: &[u8; HEADER_LEN] = bytes
        .first_chunk()
        .ok_or(DecodeError::ShortBuffer {
            needed: HEADER_LEN,
            available: bytes.len(),
        })?;
    let header = PacketHeader::from_bytes(header_bytes);
    extract(header, bytes)
}

/// Decode a record from a packet produced by the reader.
///
/// Reuses the header parsed while framing instead of parsing it again.
///
/// # Errors
/// Returns a [`DecodeError`] only if the packet does not match its header,
/// which the reader never produces.
pub fn decode_packet(packet: &ValidatedPacket) -> Result<Record, DecodeError> {
    extract(*packet.header(), packet.as_bytes())
}

fn extract(header: PacketHeader, bytes: &[u8]) -> Result<Record, DecodeError> {
    let expected = header.payload_len();
    if bytes.len() < expected {
        return Err(DecodeError::ShortBuffer {
            needed: expected,
            available: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(DecodeError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let data_end = HEADER_LEN + usize::from(header.length);
    let short = || DecodeError::ShortBuffer {
        needed: expected,
        available: bytes.len(),
    };
    let wifi_data = bytes.get(HEADER_LEN..data_end).ok_or_else(short)?;
    let timestamp: &[u8; TIMESTAMP_LEN] = bytes
        .get(data_end..)
        .and_then(|rest| rest.first_chunk())
        .ok_or_else(short)?;

    Ok(Record {
        packet_type: header.packet_type,
        rssi: header.rssi,
        length: header.length,
        wifi_data: wifi_data.to_vec(),
        timestamp: u32::from_le_bytes(*timestamp),
    })
}
