use thiserror::Error;

use crate::receiver::SameDecoder;
use crate::waveform;

/// Builds a SAME decoder
///
/// The builder comes with a sensible set of default options.
/// All you really need to provide is the input sampling rate.
/// The [`SameDecoder`] works well at 22050 Hz, but any rate of
/// at least 8000 Hz is acceptable.
///
/// ```
/// use samezc::DecoderBuilder;
///
/// let decoder = DecoderBuilder::new(48000)
///     .with_noise_floor(0.02)
///     .with_diagnostics(true)
///     .build()
///     .expect("bad configuration");
/// assert_eq!(48000, decoder.input_rate());
/// ```
///
/// The API specified by the builder is part of this crate's
/// API. The actual default values are *not*, however, and
/// are subject to revision in any minor release. If you
/// care very strongly about a setting, be sure to configure
/// it here.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DecoderBuilder {
    input_rate: u32,
    noise_floor: f32,
    min_preamble_bytes: u32,
    tracking_gain: f32,
    capture_timeout_symbols: u64,
    burst_window_symbols: u64,
    diagnostics: bool,
}

impl DecoderBuilder {
    /// Minimum number of preamble bytes which may be required
    pub const MIN_PREAMBLE_BYTES: u32 = 4;

    /// New decoder with "sensible" defaults
    ///
    /// The only mandatory parameter is the input sampling
    /// rate, in Hz. To avoid computationally-intensive
    /// resampling in your sound server, you should use one
    /// of the native output rates of your sound card or an
    /// easy division thereof. 22050 Hz is a popular choice.
    pub fn new(input_rate: u32) -> Self {
        Self {
            input_rate,
            noise_floor: 0.01,
            min_preamble_bytes: 8,
            tracking_gain: 0.25,
            capture_timeout_symbols: 8 * (waveform::MAX_HEADER_LENGTH as u64 + 1),
            burst_window_symbols: crate::receiver::DEFAULT_BURST_WINDOW_SYMBOLS,
            diagnostics: false,
        }
    }

    /// Build a decoder
    ///
    /// Checks the configuration. Once built, the decoder is
    /// immediately ready to process samples.
    pub fn build(&self) -> Result<SameDecoder, ConfigurationError> {
        self.validate()?;
        Ok(SameDecoder::from(self))
    }

    /// Input sampling rate (Hz)
    ///
    /// Must be at least 8000 Hz.
    pub fn with_input_rate(&mut self, input_rate: u32) -> &mut Self {
        self.input_rate = input_rate;
        self
    }

    /// Noise floor (fraction of full scale)
    ///
    /// Detector windows whose peak magnitude is below `floor`
    /// are treated as silence. Input samples are expected to
    /// lie in `[-1.0, 1.0]`. The floor must be strictly between
    /// 0.0 and 1.0.
    pub fn with_noise_floor(&mut self, floor: f32) -> &mut Self {
        self.noise_floor = floor;
        self
    }

    /// Minimum preamble length (bytes)
    ///
    /// A header or trailer is only captured if at least this
    /// many `0xAB` preamble bytes precede it. Transmitters send
    /// sixteen. Lower values catch bursts whose beginning was
    /// lost, at the cost of more false starts. Must be in the
    /// range `4 ..= 16`.
    pub fn with_min_preamble_bytes(&mut self, bytes: u32) -> &mut Self {
        self.min_preamble_bytes = bytes;
        self
    }

    /// Bit clock tracking gain
    ///
    /// Each mark/space transition moves the next bit boundary
    /// by `gain` times its timing error. Zero disables tracking.
    /// Must be in the range `[0.0, 0.5]`.
    pub fn with_tracking_gain(&mut self, gain: f32) -> &mut Self {
        self.tracking_gain = gain;
        self
    }

    /// Capture timeout (SAME bit periods)
    ///
    /// A header or trailer capture which runs longer than this
    /// is discarded. The default is the length of a
    /// maximum-length header. Must be non-zero.
    pub fn with_capture_timeout_symbols(&mut self, symbols: u64) -> &mut Self {
        self.capture_timeout_symbols = symbols;
        self
    }

    /// Burst window (SAME bit periods)
    ///
    /// Header captures which begin within this many bit periods
    /// of the first capture are compared with each other. The
    /// default admits three maximum-length bursts and the
    /// silence between them. Must be non-zero.
    pub fn with_burst_window_symbols(&mut self, symbols: u64) -> &mut Self {
        self.burst_window_symbols = symbols;
        self
    }

    /// Report diagnostic events
    ///
    /// If set, the decoder also reports failed captures and
    /// rejected bursts. See
    /// [`EventKind`](crate::EventKind).
    pub fn with_diagnostics(&mut self, enable: bool) -> &mut Self {
        self.diagnostics = enable;
        self
    }

    /// Input sampling rate (Hz)
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Noise floor (fraction of full scale)
    pub fn noise_floor(&self) -> f32 {
        self.noise_floor
    }

    /// Minimum preamble length (bytes)
    pub fn min_preamble_bytes(&self) -> u32 {
        self.min_preamble_bytes
    }

    /// Bit clock tracking gain
    pub fn tracking_gain(&self) -> f32 {
        self.tracking_gain
    }

    /// Capture timeout (SAME bit periods)
    pub fn capture_timeout_symbols(&self) -> u64 {
        self.capture_timeout_symbols
    }

    /// Burst window (SAME bit periods)
    pub fn burst_window_symbols(&self) -> u64 {
        self.burst_window_symbols
    }

    /// True if diagnostic events are reported
    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    // Check every setting
    fn validate(&self) -> Result<(), ConfigurationError> {
        check_input_rate(self.input_rate)?;

        if !(self.noise_floor > 0.0 && self.noise_floor < 1.0) {
            return Err(ConfigurationError::NoiseFloor(self.noise_floor));
        }

        if !(Self::MIN_PREAMBLE_BYTES..=waveform::PREAMBLE_LENGTH as u32)
            .contains(&self.min_preamble_bytes)
        {
            return Err(ConfigurationError::MinPreambleBytes(
                self.min_preamble_bytes,
            ));
        }

        if !(0.0..=0.5).contains(&self.tracking_gain) {
            return Err(ConfigurationError::TrackingGain(self.tracking_gain));
        }

        if self.capture_timeout_symbols == 0 {
            return Err(ConfigurationError::ZeroDuration("capture timeout"));
        }

        if self.burst_window_symbols == 0 {
            return Err(ConfigurationError::ZeroDuration("burst window"));
        }

        Ok(())
    }
}

impl std::default::Default for DecoderBuilder {
    fn default() -> Self {
        Self::new(22050)
    }
}

/// Invalid decoder configuration
///
/// Returned when a decoder is built, or when its sampling
/// rate is changed, before any samples are processed.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// Sampling rate is zero or too low to represent the mark tone
    #[error(
        "input rate {0} Hz is too low: must be at least {min} Hz",
        min = waveform::MIN_INPUT_RATE
    )]
    InputRate(u32),

    /// Noise floor is not strictly between zero and full scale
    #[error("noise floor {0} must be between 0.0 and 1.0")]
    NoiseFloor(f32),

    /// Minimum preamble length is out of range
    #[error(
        "minimum preamble length {0} must be between {min} and {max} bytes",
        min = DecoderBuilder::MIN_PREAMBLE_BYTES,
        max = waveform::PREAMBLE_LENGTH
    )]
    MinPreambleBytes(u32),

    /// Tracking gain is out of range
    #[error("tracking gain {0} must be between 0.0 and 0.5")]
    TrackingGain(f32),

    /// A duration setting is zero
    #[error("{0} must be at least one bit period")]
    ZeroDuration(&'static str),
}

/// Check that `input_rate` is usable
pub(crate) fn check_input_rate(input_rate: u32) -> Result<(), ConfigurationError> {
    if input_rate < waveform::MIN_INPUT_RATE {
        Err(ConfigurationError::InputRate(input_rate))
    } else {
        Ok(())
    }
}
