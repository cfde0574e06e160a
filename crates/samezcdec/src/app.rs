//! Decoding loop
//!
//! Reads the input in blocks, feeds each block to the decoder,
//! and prints every event. Headers and end-of-message markers
//! go to standard output, one per line:
//!
//! ```txt
//! ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-
//! NNNN
//! ```
//!
//! Diagnostics, if enabled, go to standard error.

use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{info, warn};
use samezc::{DecoderEvent, EventKind, SameDecoder, ValidatedMessage};

/// Samples per block
const BLOCK_SAMPLES: usize = 4096;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Input sampling rate (Hz)
    pub rate: u32,

    /// Print nothing
    pub quiet: bool,
}

/// Run the application
///
/// Runs the decoder with a fully-initialized `decoder` and an
/// `input` iterator which returns each `i16` sample from some
/// input source until it is exhausted. The decoder is flushed
/// at the end of the input. Output lines are written to `out`.
///
/// Returns the number of samples read.
pub fn run<I, W>(
    config: &Config,
    decoder: &mut SameDecoder,
    mut input: I,
    out: &mut W,
) -> Result<u64, anyhow::Error>
where
    I: Iterator<Item = i16>,
    W: Write,
{
    let mut block: Vec<f32> = Vec::with_capacity(BLOCK_SAMPLES);
    let mut total = 0u64;
    loop {
        block.clear();
        block.extend(
            input
                .by_ref()
                .take(BLOCK_SAMPLES)
                .map(|sa| sa as f32 / 32768.0f32),
        );
        if block.is_empty() {
            break;
        }

        total += block.len() as u64;
        decoder
            .push_samples(&block, config.rate)
            .context("unable to decode input")?;
        report(config, decoder, out)?;
    }

    info!("end of input after {} samples; flushing", total);
    decoder.flush();
    report(config, decoder, out)?;
    Ok(total)
}

// Print every pending event
fn report<W: Write>(
    config: &Config,
    decoder: &mut SameDecoder,
    out: &mut W,
) -> Result<(), anyhow::Error> {
    for evt in decoder.events() {
        if let EventKind::Message(msg) = evt.what() {
            info!("{}", describe(msg, &Utc::now()));
        }

        if config.quiet {
            continue;
        }

        match output_line(&evt) {
            Some(line) => {
                writeln!(out, "{}", line).context("unable to write output")?;
                out.flush().context("unable to write output")?;
            }
            None => eprintln!("{}", evt),
        }
    }
    Ok(())
}

// Standard output line for `evt`, or `None` for diagnostics
fn output_line(evt: &DecoderEvent) -> Option<String> {
    match evt.what() {
        EventKind::Message(msg) => Some(msg.to_string()),
        EventKind::EndOfMessage => Some("NNNN".to_owned()),
        _ => None,
    }
}

// One-line summary of a message, for the log
fn describe(msg: &ValidatedMessage, now: &DateTime<Utc>) -> String {
    let locations = msg.location_str_iter().count();
    let issued = match msg.issue_datetime(now) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(err) => {
            warn!("{}: \"{}\"", err, msg);
            msg.issue_time_str().to_owned()
        }
    };
    let (hours, minutes) = msg.valid_duration_fields();

    format!(
        "{} {} ({}) from {}: {} location(s), issued {}, valid {}h{:02}m{}",
        msg.originator(),
        msg.event_str(),
        msg.significance(),
        msg.callsign(),
        locations,
        issued,
        hours,
        minutes,
        if msg.is_expired_at(now) {
            ", EXPIRED"
        } else {
            ""
        }
    )
}
