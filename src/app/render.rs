//! Presentation of decoded records.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use cli_defs::OutputFormat;

use crate::packet::Record;

const SEPARATOR: &str = "------------------------------";

/// Write `record` to `out` in the requested format.
///
/// # Errors
/// Propagates write failures and JSON serialisation errors.
pub fn write_record<W: Write>(out: &mut W, record: &Record, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, record),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)
        }
    }?;
    out.flush()
}

fn write_text<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    writeln!(out, "Received Packet:")?;
    writeln!(out, "  Type: {}", record.packet_type)?;
    writeln!(out, "  RSSI: {}", record.rssi)?;
    writeln!(out, "  Length: {}", record.length)?;
    writeln!(out, "  Data: {}", hex::encode(&record.wifi_data))?;
    match DateTime::<Utc>::from_timestamp(i64::from(record.timestamp), 0) {
        Some(at) => writeln!(
            out,
            "  Timestamp: {} ({})",
            record.timestamp,
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?,
        None => writeln!(out, "  Timestamp: {}", record.timestamp)?,
    }
    writeln!(out, "{SEPARATOR}")
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn record() -> Record {
        Record {
            packet_type: 1,
            rssi: -5,
            length: 2,
            wifi_data: vec![0xAA, 0xBB],
            timestamp: 16,
        }
    }

    fn render(record: &Record, format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_record(&mut out, record, format).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[rstest]
    fn text_block_lists_every_field(record: Record) {
        let text = render(&record, OutputFormat::Text);
        assert_eq!(
            text,
            "Received Packet:\n  Type: 1\n  RSSI: -5\n  Length: 2\n  Data: aabb\n  \
             Timestamp: 16 (1970-01-01T00:00:16Z)\n------------------------------\n"
        );
    }

    #[rstest]
    fn json_is_one_line_per_record(record: Record) {
        let json = render(&record, OutputFormat::Json);
        assert_eq!(
            json,
            "{\"type\":1,\"rssi\":-5,\"length\":2,\"wifi_data\":\"aabb\",\"timestamp\":16}\n"
        );
    }
}
