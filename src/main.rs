use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use esp32_fs_deploy::config::{ByteFormat, InspectConfig, StageConfig, UploadConfig};
use esp32_fs_deploy::ota::{self, OtaError, OtaMode};
use esp32_fs_deploy::{inspector, logging, stager};

#[derive(Parser)]
#[command(name = "fs-deploy")]
#[command(about = "ESP32 web app deployment tools: stage, inspect and OTA upload")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a SPIFFS (or firmware) image to a device over OTA
    Upload(UploadArgs),
    /// Copy static web files into the SPIFFS data directory
    Stage(StageArgs),
    /// Gzip a page into a byte list, or gunzip a pasted byte list
    Inspect(InspectArgs),
}

#[derive(Args)]
struct UploadArgs {
    /// Device address; prompted for when omitted
    #[arg(value_name = "ADDRESS")]
    address: Option<String>,

    /// Image to upload (defaults to the PlatformIO build output for --mode)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Partition to update
    #[arg(short, long, value_enum, default_value_t = OtaMode::Filesystem)]
    mode: OtaMode,

    /// Give up on the device after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Don't draw the upload progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct StageArgs {
    /// Directory holding the web app sources
    #[arg(short, long, default_value = esp32_fs_deploy::config::STATIC_SOURCE_DIR)]
    source: PathBuf,

    /// Directory PlatformIO builds the SPIFFS image from
    #[arg(short, long, default_value = esp32_fs_deploy::config::STATIC_TARGET_DIR)]
    target: PathBuf,

    /// File name suffix to skip; repeat to replace the default .h/.cpp/.sh list
    #[arg(short = 'x', long = "exclude", value_name = "SUFFIX")]
    exclude: Vec<String>,
}

#[derive(Args)]
struct InspectArgs {
    /// Text to gzip
    #[arg(long, group = "input")]
    text: Option<String>,

    /// Comma separated gzip bytes to decode (implies --decompress)
    #[arg(long, group = "input")]
    bytes: Option<String>,

    /// Read the text or byte list from a file
    #[arg(long, group = "input")]
    file: Option<PathBuf>,

    /// Treat the input as a byte list and gunzip it
    #[arg(short, long)]
    decompress: bool,

    /// Output layout for compressed bytes
    #[arg(long, value_enum, default_value_t = ByteFormat::List)]
    format: ByteFormat,

    /// Array name for --format c-array
    #[arg(long, default_value = "WEB_APP_GZ")]
    name: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(logging::level_from_flags(cli.verbose, cli.quiet)) {
        eprintln!("{} Failed to initialize logger: {}", "⚠".yellow(), e);
    }

    let result = match cli.command {
        Commands::Upload(args) => upload(args),
        Commands::Stage(args) => stage(args),
        Commands::Inspect(args) => inspect(args),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".red().bold(), err);
        if let Some(OtaError::ImageMissing { mode, .. }) = err.downcast_ref::<OtaError>() {
            eprintln!(
                "   Please build the {} image first with: {}",
                mode.label(),
                mode.build_command()
            );
        }
        std::process::exit(1);
    }
}

fn upload(args: UploadArgs) -> Result<()> {
    let mut config = UploadConfig::for_mode(args.mode);
    config.address = args.address;
    config.timeout = args.timeout.map(Duration::from_secs);
    config.show_progress = !args.no_progress;
    if let Some(image) = args.image {
        config.image = image;
    }

    let stdin = io::stdin();
    let report = ota::run(&config, &mut stdin.lock(), &mut io::stdout())?;

    println!("{} Upload OK: {}", "✅".green(), report.response.trim());
    println!("   Device: {}", report.address);
    println!("   MD5: {}", report.checksum);
    let done = format!("{} OTA update completed successfully!", config.mode.label());
    println!("\n✨ {}", done.green());
    println!("The device will restart automatically.");
    Ok(())
}

fn stage(args: StageArgs) -> Result<()> {
    let mut config = StageConfig {
        source: args.source,
        target: args.target,
        ..StageConfig::default()
    };
    if !args.exclude.is_empty() {
        config.excluded_suffixes = args.exclude;
    }

    let report = stager::stage(&config)?;

    println!(
        "{} {} copied, {} skipped",
        "Done!".green(),
        report.copied.len(),
        report.skipped.len()
    );
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let decompress = args.decompress || args.bytes.is_some();
    let raw = if let Some(text) = args.text {
        text
    } else if let Some(bytes) = args.bytes {
        bytes
    } else if let Some(path) = args.file {
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?
    } else {
        if io::stdin().is_terminal() {
            eprintln!("{}", "Paste input, then press Ctrl-D".dimmed());
        }
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow!("Failed to read stdin: {}", e))?;
        buf
    };

    println!();
    if decompress {
        let bytes = inspector::parse_byte_list(&raw)?;
        println!("{}", inspector::decompress(&bytes)?);
    } else {
        let config = InspectConfig {
            format: args.format,
            array_name: args.name,
        };
        let compressed = inspector::compress(&raw)?;
        println!("Byte count: {} (gzip bytes)", compressed.len());
        println!("{}", inspector::format_bytes(&compressed, &config));
    }
    Ok(())
}
