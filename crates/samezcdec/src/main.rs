use std::io;

use anyhow::{anyhow, Context};
use byteorder::{NativeEndian, ReadBytesExt};
use clap::Parser;
use log::{info, LevelFilter};

use samezc::DecoderBuilder;

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match samezcdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn samezcdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the decoder
    let mut decoder = DecoderBuilder::new(args.rate)
        .with_noise_floor(args.noise_floor)
        .with_min_preamble_bytes(args.min_preamble)
        .with_tracking_gain(args.tracking_gain)
        .with_diagnostics(args.diagnostics)
        .build()
        .context("invalid decoder options")?;

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let mut inbuf = file_setup(&args, stdin_handle)?;

    // processing: read i16 from the input source
    let config = app::Config {
        rate: args.rate,
        quiet: args.quiet,
    };
    let stdout = io::stdout();
    app::run(
        &config,
        &mut decoder,
        std::iter::from_fn(|| inbuf.read_i16::<NativeEndian>().ok()),
        &mut stdout.lock(),
    )?;

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = verbosity_filter(args.verbose);

        pretty_env_logger::formatted_builder()
            .filter_module("samezc", log_filter)
            .filter_module("samezcdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

// Log level for `-v` repeated `verbose` times
fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("SAME decoder reading standard input");
        if !is_terminal(&std::io::stdin()) {
            Ok(Box::new(io::BufReader::new(stdin)))
        } else {
            Err(anyhow!(
                "cowardly refusing to read audio samples from a terminal.

Pipe a source of raw uncompressed audio from sox, parec, rtl_fm,
or similar into this program."
            ))
        }
    } else {
        info!("SAME decoder reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
