//! Receiver and simulator for serial Wi-Fi telemetry packets.
//!
//! Packets travel over a byte stream as a four-byte header (type, RSSI and a
//! little-endian data length), the Wi-Fi data, a little-endian Unix timestamp
//! and a trailing XOR checksum. [`packet`] frames and decodes them,
//! [`source`] adapts byte streams and serial devices to the framer and
//! [`app`] wires both into the `wifi-telemetry` command.

pub mod app;
pub mod packet;
pub mod source;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use packet::{PacketReader, Record, ValidatedPacket, decode_packet, xor_checksum};
pub use source::{ByteSource, DeviceSource, ReadSource};
