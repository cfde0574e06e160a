use std::fmt::Display;

use clap::{error::ErrorKind, value_parser, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts raw PCM samples in signed 16-bit (i16) format, at the given sampling --rate, and decodes any SAME headers that are present. Decoded headers are printed in their ASCII representation.

See --help for more details.

ALWAYS TEST YOUR DECODING SETUP!
"#;

const USAGE_LONG: &str = r#"
This program accepts raw PCM samples in signed 16-bit (i16) format, at the given sampling --rate, and decodes any SAME headers that are present. Decoded headers are printed in their ASCII representation. The end of each voice message is printed as NNNN.

You can pipe in an audio file with sox

    sox input.wav -t raw -r 22.5k -e signed -b 16 -c 1 - \
        | samezcdec -r 22050

A header is printed only when two of its three transmissions agree exactly. Use --diagnostics to print transmissions which were discarded, and why, to standard error.

ALWAYS TEST YOUR DECODING SETUP!
"#;

const ADVANCED: &str = "Advanced Decoder Options";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even SAME headers
    #[arg(short, long)]
    pub quiet: bool,

    /// Sampling rate (Hz)
    ///
    /// Set to the sampling rate of your audio source. If sampling from
    /// a sound card, use the card's native rate: usually 44100 or 48000.
    /// Must be at least 8000 Hz.
    #[arg(short, long, default_value_t = 22050)]
    #[arg(value_parser = value_parser!(u32).range(8000..))]
    pub rate: u32,

    /// Input file (or "-" for stdin)
    ///
    /// The input must be one-channel (mono), signed 16-bit
    /// native-endian at --rate.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Print discarded transmissions to stderr
    #[arg(long)]
    pub diagnostics: bool,

    /// Silence threshold (fraction of full scale)
    #[arg(long, default_value_t = 0.01)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub noise_floor: f32,

    /// Preamble bytes required before a header (4 ≤ N ≤ 16)
    #[arg(long, default_value_t = 8)]
    #[arg(value_parser = value_parser!(u32).range(4..=16))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub min_preamble: u32,

    /// Bit clock tracking gain (0.0 ≤ G ≤ 0.5)
    #[arg(long, default_value_t = 0.25)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub tracking_gain: f32,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse() {
        let args = Args::try_parse_from(["samezcdec"]).expect("bad args");
        assert_eq!(22050, args.rate);
        assert!(args.input_is_stdin());
        assert!(!args.diagnostics);

        let args = Args::try_parse_from([
            "samezcdec",
            "-vv",
            "-r",
            "48000",
            "--file",
            "in.bin",
            "--min-preamble",
            "12",
        ])
        .expect("bad args");
        assert_eq!(2, args.verbose);
        assert_eq!(48000, args.rate);
        assert_eq!(12, args.min_preamble);
        assert!(!args.input_is_stdin());

        assert!(Args::try_parse_from(["samezcdec", "-r", "4000"]).is_err());
        assert!(Args::try_parse_from(["samezcdec", "--min-preamble", "2"]).is_err());
    }
}
