//! jfif CLI - decodes a baseline JFIF/JPEG file into a 24-bit BMP.
//!
//! The process exit code is the error category of the failure (1 file,
//! 2 user input, 3 format, 4 memory, 5 unsupported).

use clap::Parser;
use jfif_rs::{DecodeOptions, ErrorCode, IdctVariant, JfifDecoder, JfifError};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Baseline JFIF/JPEG to BMP decoder
#[derive(Parser)]
#[command(name = "jfif")]
#[command(version)]
#[command(about = "Decode a baseline JFIF/JPEG image into a 24-bit BMP", long_about = None)]
#[command(after_help = "EXAMPLES:
    jfif -i photo.jpg -o photo.bmp
    jfif -i photo.jpg -o photo.bmp -D 0x20
    jfif --reference-idct -i photo.jpg -o photo.bmp

DEBUG BITS:
    0x01 scan    0x02 frame    0x04 DQT      0x08 DHT      0x10 MCU
    0x20 marker  0x40 amp      0x80 quant    0x100 IDCT
    0x800000 huffman           0x1000000 main")]
struct Cli {
    /// Input JPEG file
    #[arg(short, long, default_value = "test.jpg")]
    input: PathBuf,

    /// Output BMP file
    #[arg(short, long, default_value = "test.bmp")]
    output: PathBuf,

    /// Debug trace bitmask, decimal or 0x prefixed hex
    #[arg(short = 'D', long = "debug", value_parser = parse_debug_flags, default_value = "0")]
    debug_flags: u32,

    /// Use the cosine-matrix IDCT and floating point colour conversion
    #[arg(long)]
    reference_idct: bool,

    /// Accept scan headers whose spectral selection fields are not baseline
    #[arg(long)]
    ignore_sos_tail_errors: bool,
}

fn parse_debug_flags(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid debug mask '{value}': {e}"))
}

fn init_tracing(debug_flags: u32) {
    let default_level = if debug_flags != 0 {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// `--reference-idct` forces the reference path; otherwise the build default applies.
fn idct_choice(reference_idct: bool) -> IdctVariant {
    if reference_idct {
        IdctVariant::Reference
    } else {
        IdctVariant::default()
    }
}

fn run(cli: &Cli) -> Result<(), JfifError> {
    if cli.input == cli.output {
        return Err(JfifError::UserInput(format!(
            "input and output are the same file: {}",
            cli.input.display()
        )));
    }

    let input = fs::read(&cli.input).map_err(|e| {
        JfifError::File(format!("cannot read {}: {e}", cli.input.display()))
    })?;

    let options = DecodeOptions {
        idct: idct_choice(cli.reference_idct),
        ignore_sos_tail_errors: cli.ignore_sos_tail_errors,
        debug_flags: cli.debug_flags,
    };

    let bitmap = JfifDecoder::new(&input, options).decode()?;
    println!(
        "Decoded {}x{} image ({} bytes)",
        bitmap.width(),
        bitmap.height(),
        bitmap.as_bytes().len()
    );

    fs::write(&cli.output, bitmap.as_bytes()).map_err(|e| {
        JfifError::File(format!("cannot write {}: {e}", cli.output.display()))
    })?;
    println!("Saved to {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug_flags);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code: ErrorCode = e.code();
            eprintln!("Error: {e}");
            ExitCode::from(code.exit_code())
        }
    }
}
