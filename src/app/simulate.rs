//! Traffic simulator that plays the sender side of the link.
//!
//! Emits one randomly generated packet per interval: a random type, an RSSI
//! between -100 and 0 dBm, 1 to 10 bytes of random Wi-Fi data and the current
//! Unix time as timestamp.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use tracing::info;

use super::{config::AppConfig, shutdown_flag};
use crate::packet::{PacketWriter, Record};

/// Pacing for a simulator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Delay between packets.
    pub interval: Duration,
    /// Packets to send before returning; zero sends until shutdown.
    pub count: u64,
}

/// Generate a random record stamped with `timestamp`.
pub fn generate_record<R: Rng>(rng: &mut R, timestamp: u32) -> Record {
    let length: u16 = rng.gen_range(1..=10);
    let mut wifi_data = vec![0u8; usize::from(length)];
    rng.fill(wifi_data.as_mut_slice());
    Record {
        packet_type: rng.gen_range(0..=u8::MAX),
        rssi: rng.gen_range(-100..=0),
        length,
        wifi_data,
        timestamp,
    }
}

/// Current Unix time in seconds, saturating at `u32::MAX`.
#[must_use]
pub fn unix_now() -> u32 { u32::try_from(Utc::now().timestamp().max(0)).unwrap_or(u32::MAX) }

/// Open the configured port for writing and run the simulator.
///
/// # Errors
/// Returns an error if the port cannot be opened or a write fails.
pub fn run(config: &AppConfig) -> Result<()> {
    let shutdown = shutdown_flag()?;
    let schedule = Schedule {
        interval: config.interval(),
        count: config.count,
    };
    let mut rng = rand::thread_rng();
    let sent = if config.uses_stdio() {
        let mut writer = PacketWriter::new(io::stdout().lock());
        simulate(&mut writer, &mut rng, schedule, &shutdown, unix_now)?
    } else {
        let port = OpenOptions::new()
            .write(true)
            .open(&config.port)
            .with_context(|| format!("failed to open {} for writing", config.port))?;
        info!(port = %config.port, baud_rate = config.baud_rate, "sending simulated packets");
        let mut writer = PacketWriter::new(port);
        simulate(&mut writer, &mut rng, schedule, &shutdown, unix_now)?
    };
    info!(sent, "simulator stopped");
    Ok(())
}

/// Generate and write packets according to `schedule`.
///
/// Returns the number of packets sent.
///
/// # Errors
/// Propagates write failures from `writer`.
pub fn simulate<W, R, C>(
    writer: &mut PacketWriter<W>,
    rng: &mut R,
    schedule: Schedule,
    shutdown: &AtomicBool,
    mut clock: C,
) -> Result<u64>
where
    W: Write,
    R: Rng,
    C: FnMut() -> u32,
{
    let mut sent = 0u64;
    while !shutdown.load(Ordering::SeqCst) {
        let record = generate_record(rng, clock());
        let frame = writer
            .write_record(&record)
            .context("failed to write packet")?;
        sent += 1;
        info!(
            packet_type = record.packet_type,
            rssi = record.rssi,
            length = record.length,
            timestamp = record.timestamp,
            frame = %hex::encode(&frame),
            "sent packet"
        );
        if schedule.count != 0 && sent >= schedule.count {
            break;
        }
        thread::sleep(schedule.interval);
    }
    Ok(sent)
}
