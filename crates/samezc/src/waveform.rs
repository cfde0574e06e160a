//! Waveform parameters for SAME

/// Mark frequency (Hz)
///
/// The mark tone encodes a one bit.
pub const FSK_MARK_HZ: f32 = 2083.3;

/// Space frequency (Hz)
///
/// The space tone encodes a zero bit.
pub const FSK_SPACE_HZ: f32 = 1562.5;

/// Tone decision threshold (Hz)
///
/// Estimated frequencies above this value are mark; below it,
/// space.
pub const FSK_MIDPOINT_HZ: f32 = (FSK_MARK_HZ + FSK_SPACE_HZ) / 2.0;

/// Baud rate (Hz)
pub const BAUD_HZ: f32 = 520.83;

/// Tone detector window rate (Hz)
///
/// The tone detector makes one decision per window. There are
/// four windows for every SAME bit.
pub const WINDOW_RATE_HZ: f32 = 2080.0;

/// Preamble byte
///
/// The preamble byte is repeated sixteen times before every
/// SAME message. It contains many bit transitions to ensure
/// that bit and byte synchronization is acquired quickly
pub const PREAMBLE: u8 = 0xab;

/// Number of preamble bytes in every burst
pub const PREAMBLE_LENGTH: usize = 16;

/// SAME preamble sync sequence
///
/// The preamble byte is repeated sixteen times before every
/// SAME message. Here, we will use four occurrences of it
/// for synchronization.
pub const PREAMBLE_SYNC_WORD: u32 = u32::from_be_bytes([PREAMBLE, PREAMBLE, PREAMBLE, PREAMBLE]);

/// Maximum length of a SAME burst, in bytes
///
/// Includes the preamble
pub const MAX_BURST_LENGTH: usize = 268;

/// Maximum length of SAME header text, in bytes
///
/// This is everything after the preamble, including the
/// leading `ZCZC`.
pub const MAX_HEADER_LENGTH: usize = MAX_BURST_LENGTH - PREAMBLE_LENGTH;

/// Maximum time between bursts, in symbols
///
/// Bursts are separated by one second of silence, and the
/// transmitter may be off by five percent.
pub const MAX_INTERBURST_SYMBOLS: u64 = (1.05 * BAUD_HZ) as u64;

/// Lowest sampling rate we accept (Hz)
///
/// This is a little under four samples per cycle of the
/// mark tone.
pub const MIN_INPUT_RATE: u32 = 8000;

/// SAME baud rate at the given sampling frequency, in fractional samples
pub fn samples_per_symbol(fs: u32) -> f64 {
    fs as f64 / BAUD_HZ as f64
}

/// Tone detector window length at the given sampling frequency, in fractional samples
pub fn samples_per_window(fs: u32) -> f64 {
    fs as f64 / WINDOW_RATE_HZ as f64
}

/// Convert a duration in SAME symbols to input samples
pub fn symbols_to_samples(symbols: u64, fs: u32) -> u64 {
    f64::ceil(symbols as f64 * samples_per_symbol(fs)) as u64
}

/// Very simple continuous-phase AFSK modulator
///
/// This method is designed for use in tests. Accepts bytes,
/// which are sent least significant bit first at exactly
/// [`BAUD_HZ`]. Symbol boundaries fall on fractional sample
/// times, just like a real transmitter. `baud_error` scales
/// the baud rate: `1.005` is a transmitter that runs half a
/// percent fast.
#[cfg(test)]
pub fn modulate_afsk(bytes: &[u8], fs: u32, amplitude: f32, baud_error: f64) -> Vec<f32> {
    const TWOPI: f64 = 2.0f64 * std::f64::consts::PI;

    let bits = bytes_to_bits(bytes);
    let sps = samples_per_symbol(fs) / baud_error;
    let mark_rad_per_sa = TWOPI * FSK_MARK_HZ as f64 / fs as f64;
    let space_rad_per_sa = TWOPI * FSK_SPACE_HZ as f64 / fs as f64;

    let len = f64::ceil(bits.len() as f64 * sps) as usize;
    let mut out = Vec::with_capacity(len);
    let mut phase = 0.0f64;
    for itr in 0..len {
        let bit = bits[usize::min((itr as f64 / sps) as usize, bits.len() - 1)];
        out.push(amplitude * phase.cos() as f32);
        if bit {
            phase += mark_rad_per_sa;
        } else {
            phase += space_rad_per_sa;
        }
        if phase > TWOPI {
            // wrapped
            phase -= TWOPI;
        }
    }

    out
}

/// Convert bytes to bits
///
/// The bits are output in SAME order (least significant bit
/// first).
#[cfg(test)]
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut v = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        let mut word = *byte;
        for _i in 0..8 {
            v.push(word & 0x01 == 1);
            word = word >> 1;
        }
    }

    v
}

/// Prepend the SAME preamble to `text`
#[cfg(test)]
pub fn make_burst(text: &str) -> Vec<u8> {
    let mut out = vec![PREAMBLE; PREAMBLE_LENGTH];
    out.extend_from_slice(text.as_bytes());
    out
}
