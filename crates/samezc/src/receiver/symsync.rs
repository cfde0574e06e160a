//! Bit clock
//!
//! The `BitClock` turns the stream of per-window
//! [tone decisions](super::tone::ToneSample) into exactly one
//! bit decision per SAME bit period. There are about four tone
//! windows in every bit.
//!
//! The clock keeps a fractional-sample bit boundary. Every
//! window's samples are credited to the bit periods they
//! overlap as mark, space, or unknown. When a bit period ends,
//! the tone with the most samples wins.
//!
//! ```txt
//! windows  | M | M | M | S | S | S | S | M | ...
//! periods  |   1  |     0     |     0     | ...
//!          ^ onset
//! ```
//!
//! The phase of the clock is set by the first window which
//! contains signal after silence. While signal persists, every
//! mark/space transition nudges the next bit boundary toward
//! the transition. This lets the clock follow a transmitter
//! whose baud rate is slightly off.

use arrayvec::ArrayVec;

use super::tone::{Tone, ToneSample};
use crate::waveform;

/// A single bit decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bit {
    /// Bit value, or `None` if no decision was possible
    pub value: Option<bool>,

    /// Lifetime sample index where the bit period begins
    pub timestamp: u64,
}

/// Bits emitted for one tone window
///
/// A window is always shorter than a bit, so it can close at
/// most one bit period plus one truncated period at a phase
/// reset.
pub type Bits = ArrayVec<Bit, 4>;

/// Bit clock
#[derive(Clone, Debug)]
pub struct BitClock {
    samples_per_bit: f64,
    tracking_gain: f64,

    // true until we have aligned to the stream
    fresh: bool,

    // reset the phase at the next signal onset
    awaiting_onset: bool,

    // current bit period, in fractional lifetime samples
    period_start: f64,
    period_end: f64,

    // samples of each tone in the current period
    weights: Weights,

    // tone of the previous window
    last_tone: Tone,
}

impl BitClock {
    /// New bit clock
    ///
    /// Creates a bit clock for input sampled at `input_rate`.
    /// Each mark/space transition moves the bit boundary by
    /// `tracking_gain` times the timing error. Use a small
    /// number, like `0.25`. A value of zero disables tracking.
    pub fn new(input_rate: u32, tracking_gain: f32) -> Self {
        let samples_per_bit = waveform::samples_per_symbol(input_rate);
        Self {
            samples_per_bit,
            tracking_gain: tracking_gain as f64,
            fresh: true,
            awaiting_onset: true,
            period_start: 0.0,
            period_end: samples_per_bit,
            weights: Weights::default(),
            last_tone: Tone::Unknown,
        }
    }

    /// Change the input sampling rate
    ///
    /// Resets the clock.
    pub fn set_input_rate(&mut self, input_rate: u32) {
        self.samples_per_bit = waveform::samples_per_symbol(input_rate);
        self.reset();
    }

    /// Reset to zero initial conditions
    ///
    /// The clock will re-align to the next window it receives
    /// and await the next signal onset.
    pub fn reset(&mut self) {
        self.fresh = true;
        self.awaiting_onset = true;
        self.period_start = 0.0;
        self.period_end = self.samples_per_bit;
        self.weights = Weights::default();
        self.last_tone = Tone::Unknown;
    }

    /// Bit period (fractional samples)
    pub fn samples_per_bit(&self) -> f64 {
        self.samples_per_bit
    }

    /// Process one tone window
    ///
    /// Returns every bit period which ended during the window.
    pub fn input(&mut self, win: &ToneSample) -> Bits {
        let start = win.start as f64;
        let end = win.end() as f64;
        let mut out = Bits::new();

        if self.fresh {
            self.fresh = false;
            self.period_start = start;
            self.period_end = start + self.samples_per_bit;
        }

        if !self.awaiting_onset
            && win.tone.is_known()
            && self.last_tone.is_known()
            && win.tone != self.last_tone
        {
            self.track(start);
        }
        self.last_tone = win.tone;

        match (self.awaiting_onset, win.onset) {
            (true, Some(onset)) => {
                // signal begins: the new bit period starts here
                let onset = start + onset as f64;
                self.accumulate(start, onset, Tone::Unknown, &mut out);
                if self.weights.total() > 0.0 {
                    out.push(self.take_bit());
                }
                self.period_start = onset;
                self.period_end = onset + self.samples_per_bit;
                self.weights = Weights::default();
                self.awaiting_onset = false;
                self.accumulate(onset, end, win.tone, &mut out);
            }
            (_, onset) => {
                if onset.is_none() {
                    self.awaiting_onset = true;
                }
                self.accumulate(start, end, win.tone, &mut out);
            }
        }

        out
    }

    // Nudge the next bit boundary toward a transition at `at`
    //
    // The timing error is measured from the nearest expected
    // boundary, which is either the start of this period or
    // the start of the next one.
    fn track(&mut self, at: f64) {
        let mut err = at - self.period_start;
        if err >= self.samples_per_bit / 2.0 {
            err -= self.samples_per_bit;
        }
        self.period_end += self.tracking_gain * err;
    }

    // Credit samples `[from, to)` to `tone`, closing any bit
    // periods which end in that span
    fn accumulate(&mut self, mut from: f64, to: f64, tone: Tone, out: &mut Bits) {
        while to >= self.period_end {
            self.weights.add(tone, self.period_end - from);
            out.push(self.take_bit());
            from = f64::max(from, self.period_end);
            self.period_start = self.period_end;
            self.period_end += self.samples_per_bit;
        }
        self.weights.add(tone, to - from);
    }

    // Decide the current bit period and clear its weights
    fn take_bit(&mut self) -> Bit {
        let out = Bit {
            value: self.weights.decide(),
            timestamp: f64::max(self.period_start, 0.0) as u64,
        };
        self.weights = Weights::default();
        out
    }
}

// Samples of each tone in one bit period
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Weights {
    mark: f64,
    space: f64,
    unknown: f64,
}

impl Weights {
    fn add(&mut self, tone: Tone, samples: f64) {
        let samples = f64::max(samples, 0.0);
        match tone {
            Tone::Mark => self.mark += samples,
            Tone::Space => self.space += samples,
            Tone::Unknown => self.unknown += samples,
        }
    }

    fn total(&self) -> f64 {
        self.mark + self.space + self.unknown
    }

    // Majority vote
    //
    // No decision if unknown covers half of the period or if
    // mark and space are tied.
    fn decide(&self) -> Option<bool> {
        if self.unknown >= self.mark + self.space || self.mark == self.space {
            None
        } else {
            Some(self.mark > self.space)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    use crate::receiver::tone::ToneDetector;
    use crate::waveform::{bytes_to_bits, modulate_afsk};

    // Run audio through a tone detector and bit clock
    fn clock_bits(audio: &[f32], fs: u32) -> Vec<Bit> {
        let mut det = ToneDetector::new(fs, 0.01, 0);
        let mut clock = BitClock::new(fs, 0.25);
        let mut out = vec![];
        for sa in audio {
            if let Some(win) = det.input(*sa) {
                out.extend(clock.input(&win));
            }
        }
        out
    }

    fn window(tone: Tone, start: u64, len: u32, onset: Option<u32>) -> ToneSample {
        ToneSample {
            tone,
            start,
            len,
            crossings: 2,
            onset,
        }
    }

    #[test]
    fn test_weights() {
        let mut w = Weights::default();
        assert_eq!(None, w.decide());
        w.add(Tone::Mark, 3.0);
        w.add(Tone::Space, 1.0);
        assert_eq!(Some(true), w.decide());
        w.add(Tone::Space, 2.0);
        assert_eq!(None, w.decide());
        w.add(Tone::Space, 0.5);
        assert_eq!(Some(false), w.decide());
        w.add(Tone::Unknown, 6.5);
        assert_eq!(None, w.decide());
        w.add(Tone::Mark, -1.0);
        assert_approx_eq!(w.total(), 13.0f64);
    }

    #[test]
    fn test_onset_sets_phase() {
        let mut clock = BitClock::new(22050, 0.25);
        let spb = clock.samples_per_bit();

        // silence until the onset at sample 15
        let out = clock.input(&window(Tone::Unknown, 0, 10, None));
        assert!(out.is_empty());
        let out = clock.input(&window(Tone::Mark, 10, 10, Some(5)));
        assert_eq!(1, out.len());
        assert_eq!(None, out[0].value);
        assert_eq!(0, out[0].timestamp);
        assert_approx_eq!(15.0f64, clock.period_start);
        assert_approx_eq!(15.0f64 + spb, clock.period_end);

        // four more windows of mark: one bit
        let mut bits = Bits::new();
        for i in 0..4 {
            bits.extend(clock.input(&window(Tone::Mark, 20 + 10 * i, 10, Some(0))));
        }
        assert_eq!(1, bits.len());
        assert_eq!(Some(true), bits[0].value);
        assert_eq!(15, bits[0].timestamp);
    }

    #[test]
    fn test_silence_emits_unknown() {
        let mut clock = BitClock::new(22050, 0.25);
        let mut bits = vec![];
        for i in 0..100 {
            bits.extend(clock.input(&window(Tone::Unknown, 1000 + 10 * i, 10, None)));
        }

        // one unknown bit per period, even in silence
        assert_eq!(23, bits.len());
        assert!(bits.iter().all(|b| b.value.is_none()));
        assert_eq!(1000, bits[0].timestamp);
        for pair in bits.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn test_tracking() {
        // a transition early in the period pulls the boundary earlier
        let mut clock = BitClock::new(22050, 0.5);
        let spb = clock.samples_per_bit();
        clock.input(&window(Tone::Mark, 0, 10, Some(0)));
        clock.input(&window(Tone::Space, 10, 10, Some(0)));
        assert_approx_eq!(spb + 5.0f64, clock.period_end);

        // no tracking without a transition
        clock.input(&window(Tone::Space, 20, 10, Some(0)));
        assert_approx_eq!(spb + 5.0f64, clock.period_end);

        // a transition late in the period pushes it later
        let mut clock = BitClock::new(22050, 0.5);
        clock.input(&window(Tone::Mark, 0, 10, Some(0)));
        clock.input(&window(Tone::Mark, 10, 10, Some(0)));
        clock.input(&window(Tone::Mark, 20, 10, Some(0)));
        clock.input(&window(Tone::Space, 30, 5, Some(0)));
        assert_approx_eq!(spb + 0.5 * (30.0 - spb), clock.period_end);
    }

    #[test]
    fn test_clock_recovers_bits() {
        const DATA: &[u8] = &[0xab, 0xab, 0xab, 0xab, 0x5a, 0x43, 0x5a, 0x43, 0x00, 0xff];

        let expect = bytes_to_bits(DATA);
        for &fs in &[8000u32, 11025, 22050, 44100, 48000] {
            for &baud_error in &[0.995f64, 1.0, 1.005] {
                let mut audio = vec![0.0f32; 300];
                audio.extend(modulate_afsk(DATA, fs, 0.5, baud_error));
                audio.extend(std::iter::repeat(0.0f32).take(fs as usize / 10));

                let bits: Vec<Option<bool>> =
                    clock_bits(&audio, fs).iter().map(|b| b.value).collect();

                let recovered: Vec<bool> = bits.iter().filter_map(|b| *b).collect();
                assert_eq!(
                    expect, recovered,
                    "fs = {}, baud error = {}",
                    fs, baud_error
                );
            }
        }
    }
}
