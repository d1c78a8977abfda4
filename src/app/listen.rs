//! Receive loop: frame, decode and print packets until told to stop.

use std::{
    io::{self, Write},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use cli_defs::OutputFormat;
use tracing::info;

use super::{config::AppConfig, render, shutdown_flag};
use crate::{
    packet::{FrameStats, PacketReader, decode_packet},
    source::{ByteSource, DeviceSource},
};

/// Open the configured source and run the receive loop.
///
/// # Errors
/// Returns an error if the device cannot be opened, stdout cannot be written
/// or a validated packet fails to decode.
pub fn run(config: &AppConfig) -> Result<()> {
    let device_config = config.device_config()?;
    let device = if config.uses_stdio() {
        DeviceSource::stdin(device_config)?
    } else {
        DeviceSource::open(device_config)?
    };
    let shutdown = shutdown_flag()?;
    let mut reader = PacketReader::new(device);
    listen(&mut reader, &mut io::stdout().lock(), config.format, &shutdown)?;
    Ok(())
}

/// Pull packets from `reader` and render them to `out`.
///
/// Runs until `shutdown` is set or the source reports end of stream after a
/// cycle that produced nothing. Failed cycles are logged by the reader and
/// skipped.
///
/// # Errors
/// Returns an error if rendering fails or a validated packet does not decode,
/// which would mean the reader handed out a malformed packet.
pub fn listen<S: ByteSource, W: Write>(
    reader: &mut PacketReader<S>,
    out: &mut W,
    format: OutputFormat,
    shutdown: &AtomicBool,
) -> Result<FrameStats> {
    while !shutdown.load(Ordering::SeqCst) {
        match reader.next_packet() {
            Some(packet) => {
                let record = decode_packet(&packet)
                    .context("validated packet does not match its own header")?;
                render::write_record(out, &record, format).context("failed to write record")?;
            }
            None if reader.source_exhausted() => {
                info!("source reached end of stream");
                break;
            }
            None => {}
        }
    }
    let stats = reader.stats();
    info!(
        accepted = stats.accepted,
        short_headers = stats.short_headers,
        short_bodies = stats.short_bodies,
        checksum_mismatches = stats.checksum_mismatches,
        io_errors = stats.io_errors,
        "listener stopped"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;
    use crate::{
        packet::{Record, encode_record},
        source::ReadSource,
    };

    fn frame(packet_type: u8, data: &[u8], timestamp: u32) -> Vec<u8> {
        let record = Record::new(packet_type, -60, data.to_vec(), timestamp).expect("record");
        encode_record(&record).expect("encode")
    }

    fn run_over(bytes: Vec<u8>, format: OutputFormat) -> (String, FrameStats) {
        let mut reader = PacketReader::new(ReadSource::new(Cursor::new(bytes)));
        let mut out = Vec::new();
        let stats =
            listen(&mut reader, &mut out, format, &AtomicBool::new(false)).expect("listen");
        (String::from_utf8(out).expect("utf8"), stats)
    }

    #[rstest]
    fn prints_each_valid_packet_until_end_of_stream() {
        let bytes = [frame(1, &[0x01], 10), frame(2, &[0x02, 0x03], 20)].concat();
        let (text, stats) = run_over(bytes, OutputFormat::Json);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().is_some_and(|l| l.contains("\"type\":1")));
        assert!(lines.get(1).is_some_and(|l| l.contains("\"wifi_data\":\"0203\"")));
        assert_eq!(stats.accepted, 2);
    }

    #[rstest]
    fn corrupted_packet_is_skipped_and_next_one_printed() {
        let mut bad = frame(7, &[0xEE], 1);
        if let Some(byte) = bad.get_mut(4) {
            *byte ^= 0x10;
        }
        let bytes = [bad, frame(8, &[0xAB], 2)].concat();
        let (text, stats) = run_over(bytes, OutputFormat::Text);
        assert!(!text.contains("Type: 7"));
        assert!(text.contains("Type: 8"));
        assert_eq!(stats.checksum_mismatches, 1);
        assert_eq!(stats.accepted, 1);
    }

    #[rstest]
    fn stops_immediately_when_shutdown_is_set() {
        let mut reader = PacketReader::new(ReadSource::new(Cursor::new(frame(1, &[], 0))));
        let mut out = Vec::new();
        let stats = listen(&mut reader, &mut out, OutputFormat::Text, &AtomicBool::new(true))
            .expect("listen");
        assert!(out.is_empty());
        assert_eq!(stats, FrameStats::default());
    }
}
