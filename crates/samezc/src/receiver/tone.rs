//! Zero-crossing tone detector
//!
//! The `ToneDetector` divides the input into short, contiguous
//! windows of `input_rate / 2080` samples. Each window receives
//! one decision: the mark tone, the space tone, or neither.
//!
//! Within a window, the detector measures the time between
//! successive zero crossings. Each crossing is linearly
//! interpolated between the two samples which straddle it, so
//! the measurement is much finer than one sample. The mean
//! interval between crossings is one half-period of the tone.
//!
//! ```txt
//!   x[n]
//!    |  .             .
//!    | .  .         .
//! ---|------x-----x-------------> n
//!    |        .  .
//!    |         .
//!           |<--->|
//!         half-period
//! ```
//!
//! Window boundaries are computed from a fixed origin and
//! rounded, so fractional window lengths never accumulate
//! drift.

use crate::waveform;

/// Tone decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Mark tone (binary one)
    Mark,

    /// Space tone (binary zero)
    Space,

    /// No usable tone
    ///
    /// The window was too quiet, or its frequency was
    /// implausible for SAME.
    Unknown,
}

impl Tone {
    /// True if the tone is mark or space
    pub fn is_known(&self) -> bool {
        *self != Tone::Unknown
    }
}

/// Tone decision for one detector window
#[derive(Clone, Debug, PartialEq)]
pub struct ToneSample {
    /// Which tone was detected
    pub tone: Tone,

    /// Lifetime sample index of the window's first sample
    pub start: u64,

    /// Window length, in samples
    pub len: u32,

    /// Number of zero crossings in the window
    pub crossings: u32,

    /// Offset of the first sample at or above the noise floor
    ///
    /// `None` if the whole window is below the noise floor.
    pub onset: Option<u32>,
}

impl ToneSample {
    /// Lifetime sample index one past the window's last sample
    pub fn end(&self) -> u64 {
        self.start + self.len as u64
    }
}

/// Zero-crossing tone detector
#[derive(Clone, Debug)]
pub struct ToneDetector {
    input_rate: u32,
    samples_per_window: f64,
    noise_floor: f32,

    // longest plausible half-period, in samples
    max_half_period: f64,

    // window boundaries are origin + round(k * samples_per_window)
    origin: u64,
    window_index: u64,
    window_start: u64,
    window_end: u64,

    // lifetime index of the next input sample
    clock: u64,

    // last sample which was not exactly zero
    last_nonzero: Option<(u64, f32)>,

    // interpolated time of the last zero crossing
    last_crossing: Option<f64>,

    // per-window statistics
    peak: f32,
    onset: Option<u32>,
    crossings: u32,
    interval_sum: f64,
    interval_count: u32,
}

impl ToneDetector {
    /// New tone detector
    ///
    /// Detects tones in input sampled at `input_rate`. Windows
    /// whose peak magnitude is below `noise_floor` are silent.
    /// The first window begins at lifetime sample `now`.
    pub fn new(input_rate: u32, noise_floor: f32, now: u64) -> Self {
        let mut out = Self {
            input_rate,
            samples_per_window: waveform::samples_per_window(input_rate),
            noise_floor,
            max_half_period: input_rate as f64 / waveform::FSK_SPACE_HZ as f64,
            origin: now,
            window_index: 0,
            window_start: now,
            window_end: now,
            clock: now,
            last_nonzero: None,
            last_crossing: None,
            peak: 0.0,
            onset: None,
            crossings: 0,
            interval_sum: 0.0,
            interval_count: 0,
        };
        out.reset(now);
        out
    }

    /// Change the input sampling rate
    ///
    /// All in-flight window state is discarded. The next window
    /// begins at lifetime sample `now`.
    pub fn set_input_rate(&mut self, input_rate: u32, now: u64) {
        self.input_rate = input_rate;
        self.samples_per_window = waveform::samples_per_window(input_rate);
        self.max_half_period = input_rate as f64 / waveform::FSK_SPACE_HZ as f64;
        self.reset(now);
    }

    /// Reset to zero initial conditions
    ///
    /// The next window begins at lifetime sample `now`.
    pub fn reset(&mut self, now: u64) {
        self.origin = now;
        self.window_index = 0;
        self.window_start = now;
        self.window_end = self.boundary(1);
        self.clock = now;
        self.last_nonzero = None;
        self.last_crossing = None;
        self.clear_window();
    }

    /// Input sampling rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Window length (fractional samples)
    pub fn samples_per_window(&self) -> f64 {
        self.samples_per_window
    }

    /// Process one input sample
    ///
    /// Returns a decision when `sa` completes a window.
    pub fn input(&mut self, sa: f32) -> Option<ToneSample> {
        let n = self.clock;
        let mag = sa.abs();
        if mag > self.peak {
            self.peak = mag;
        }
        if self.onset.is_none() && mag >= self.noise_floor {
            self.onset = Some((n - self.window_start) as u32);
        }

        // exact zeros carry no sign; skip them
        if sa != 0.0 {
            if let Some((last_n, last_sa)) = self.last_nonzero {
                if (last_sa > 0.0) != (sa > 0.0) {
                    let frac = last_sa as f64 / (last_sa as f64 - sa as f64);
                    let crossing = last_n as f64 + frac * (n - last_n) as f64;
                    self.crossed_at(crossing);
                }
            }
            self.last_nonzero = Some((n, sa));
        }

        self.clock += 1;
        if self.clock >= self.window_end {
            Some(self.decide())
        } else {
            None
        }
    }

    // Record a zero crossing at fractional sample time `crossing`
    fn crossed_at(&mut self, crossing: f64) {
        self.crossings += 1;
        if let Some(last) = self.last_crossing {
            let half_period = crossing - last;
            if half_period <= self.max_half_period {
                self.interval_sum += half_period;
                self.interval_count += 1;
            }
        }
        self.last_crossing = Some(crossing);
    }

    // Emit the decision for the current window and begin the next
    fn decide(&mut self) -> ToneSample {
        let tone = if self.peak < self.noise_floor {
            // silence breaks the chain of crossings
            self.last_crossing = None;
            Tone::Unknown
        } else if self.interval_count == 0 {
            Tone::Unknown
        } else {
            let half_period = self.interval_sum / self.interval_count as f64;
            classify((self.input_rate as f64 / (2.0 * half_period)) as f32)
        };

        let out = ToneSample {
            tone,
            start: self.window_start,
            len: (self.window_end - self.window_start) as u32,
            crossings: self.crossings,
            onset: self.onset,
        };

        self.window_index += 1;
        self.window_start = self.window_end;
        self.window_end = self.boundary(self.window_index + 1);
        self.clear_window();
        out
    }

    // Lifetime sample index of the k-th window boundary
    fn boundary(&self, k: u64) -> u64 {
        self.origin + f64::round(k as f64 * self.samples_per_window) as u64
    }

    fn clear_window(&mut self) {
        self.peak = 0.0;
        self.onset = None;
        self.crossings = 0;
        self.interval_sum = 0.0;
        self.interval_count = 0;
    }
}

// Classify an estimated frequency
//
// Frequencies far outside the SAME band are not tones.
fn classify(freq: f32) -> Tone {
    if freq < 0.5 * waveform::FSK_SPACE_HZ || freq > 1.5 * waveform::FSK_MARK_HZ {
        Tone::Unknown
    } else if freq > waveform::FSK_MIDPOINT_HZ {
        Tone::Mark
    } else {
        Tone::Space
    }
}
